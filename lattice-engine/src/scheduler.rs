//! Markov-walk stepping over a seeded [`Graph`].
//!
//! Each [`Scheduler::step`] moves the walk one edge (uniform choice over the
//! active node's destination list, so duplicate destinations weigh more),
//! emits one note event for the node it lands on, and reports how long to
//! wait before the next step. The scheduler owns its graph; replacing the
//! preset means replacing the scheduler, so ids and the active pointer are
//! always discarded together.

use crate::events::Event;
use lattice_core::{Graph, LatticeError, NodeId, Phase, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{trace, warn};

/// Hard floor on the wait between steps; a zero interval would starve the
/// external timer.
pub const MIN_WAIT_SECS: f64 = 0.01;

/// Starting value of the longest-delay high-water mark (100 ms quantization).
pub const INITIAL_LONGEST_SECS: f64 = 0.1;

/// Note velocity when none is configured.
pub const DEFAULT_VELOCITY: f32 = 0.2;

/// Result of one walk step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Step {
    /// Node the walk sits on after this step.
    pub node: NodeId,
    pub pitch: u8,
    pub phase: Phase,
    pub velocity: f32,
    /// Seconds until the next step, never below [`MIN_WAIT_SECS`].
    pub wait_secs: f64,
    /// Note event for `node` (`NoteOn` when `phase` is on, else `NoteOff`).
    pub event: Event,
    /// `node` has no outgoing edges; the walk cannot continue.
    pub terminated: bool,
}

impl Step {
    /// The terminal signal for the sink, if this step hit a dead end.
    #[inline]
    pub fn termination(&self) -> Option<Event> {
        self.terminated.then_some(Event::WalkTerminated { at_node: self.node })
    }
}

#[derive(Clone, Debug)]
pub struct Scheduler {
    graph: Graph,
    velocity: f32,
    longest_secs: f64,
}

impl Scheduler {
    pub fn new(graph: Graph) -> Self {
        Self { graph, velocity: DEFAULT_VELOCITY, longest_secs: INITIAL_LONGEST_SECS }
    }

    /// Velocity attached to note-on events, clamped to [0, 1].
    #[inline]
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.set_velocity(velocity);
        self
    }

    #[inline]
    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = if velocity.is_finite() { velocity.clamp(0.0, 1.0) } else { DEFAULT_VELOCITY };
    }

    #[inline] pub fn velocity(&self) -> f32 { self.velocity }
    #[inline] pub fn graph(&self) -> &Graph { &self.graph }
    #[inline] pub fn into_graph(self) -> Graph { self.graph }

    /// Largest node delay emitted so far, in seconds. Only bounds an external
    /// timeline; traversal ignores it.
    #[inline] pub fn longest_delay_secs(&self) -> f64 { self.longest_secs }

    /// Restart the walk from `id`; the node being left goes `Off`.
    pub fn restart_at(&mut self, id: NodeId) -> Result<()> {
        self.graph.restart_at(id)
    }

    /// Advance the walk one step at `cycle_start` (seconds).
    ///
    /// Fails with [`LatticeError::EmptyGraph`] when the graph has no nodes.
    /// A dead end is not an error: the step still carries the note event for
    /// the terminal node, with `terminated` set.
    pub fn step<R: Rng + ?Sized>(&mut self, cycle_start: f64, rng: &mut R) -> Result<Step> {
        let current = self.graph.active().ok_or(LatticeError::EmptyGraph)?;

        let next = self.graph.edges_of(current)?.choose(rng).copied();
        if let Some(next) = next {
            self.graph.advance_to(next)?;
        }

        let node = self.graph.active().ok_or(LatticeError::EmptyGraph)?;
        let terminated = self.graph.is_terminal(node)?;
        let n = self.graph.node(node)?;
        let (pitch, phase) = (n.pitch(), n.phase());
        let delay = n.delay_secs();

        let event = if phase.is_on() {
            Event::NoteOn { pitch, velocity: self.velocity, timestamp: cycle_start, duration: delay }
        } else {
            Event::NoteOff { pitch, timestamp: cycle_start }
        };

        self.longest_secs = self.longest_secs.max(delay);
        let wait_secs = delay.max(MIN_WAIT_SECS);

        trace!(from = current, to = node, pitch, %phase, wait_secs, "step");
        if terminated {
            warn!(at_node = node, "walk reached a node with no outgoing edges");
        }

        Ok(Step { node, pitch, phase, velocity: self.velocity, wait_secs, event, terminated })
    }
}
