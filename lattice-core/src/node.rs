//! Lattice nodes: one musical event descriptor per (phase, pitch) pair.
//!
//! A node's identity (`id`, `pitch`, `delay_ms`) is fixed when it is first
//! registered. Only `phase` changes afterwards, and only through the graph's
//! traversal operation (see [`Graph::advance_to`](crate::graph::Graph::advance_to)).

use core::fmt;

/// Index of a node inside its originating [`Graph`](crate::graph::Graph).
/// Ids are meaningless across graphs.
pub type NodeId = usize;

/// Whether a node currently stands for a note-on or a note-off.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Note released. Every seeded node starts here.
    #[default]
    Off,
    /// Note sounding.
    On,
}

impl Phase {
    #[inline]
    pub fn is_on(self) -> bool {
        matches!(self, Phase::On)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Off => "off",
            Phase::On => "on",
        })
    }
}

/// A (phase, pitch, delay) event descriptor with a stable id.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    id: NodeId,
    phase: Phase,
    pitch: u8,   // MIDI note number
    delay_ms: u32, // wait associated with this node, first registration wins
}

impl Node {
    #[inline]
    pub(crate) fn new(id: NodeId, phase: Phase, pitch: u8, delay_ms: u32) -> Self {
        Self { id, phase, pitch, delay_ms }
    }

    #[inline] pub fn id(&self) -> NodeId { self.id }
    #[inline] pub fn phase(&self) -> Phase { self.phase }
    #[inline] pub fn pitch(&self) -> u8 { self.pitch }
    #[inline] pub fn delay_ms(&self) -> u32 { self.delay_ms }

    /// Inter-event delay in seconds.
    #[inline]
    pub fn delay_secs(&self) -> f64 {
        f64::from(self.delay_ms) / 1000.0
    }

    /// Two nodes are equivalent iff phase and pitch match. The delay is
    /// deliberately ignored, so the first registered delay sticks.
    #[inline]
    pub fn equivalent_to(&self, other: &Node) -> bool {
        self.phase == other.phase && self.pitch == other.pitch
    }

    #[inline]
    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalence_ignores_delay_and_id() {
        let a = Node::new(0, Phase::Off, 60, 300);
        let b = Node::new(7, Phase::Off, 60, 999);
        assert!(a.equivalent_to(&b));
        assert!(b.equivalent_to(&a));
    }

    #[test]
    fn equivalence_needs_phase_and_pitch() {
        let a = Node::new(0, Phase::Off, 60, 300);
        assert!(!a.equivalent_to(&Node::new(1, Phase::On, 60, 300)));
        assert!(!a.equivalent_to(&Node::new(1, Phase::Off, 61, 300)));
    }

    #[test]
    fn phase_has_two_states() {
        assert!(Phase::On.is_on());
        assert!(!Phase::Off.is_on());
        assert_eq!(Phase::default(), Phase::Off);
    }

    #[test]
    fn delay_converts_to_seconds() {
        let n = Node::new(0, Phase::Off, 64, 450);
        assert!((n.delay_secs() - 0.45).abs() < 1e-12);
    }
}
