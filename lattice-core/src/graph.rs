//! The lattice: deduplicating node registry plus a directed adjacency list.
//!
//! Structure
//! - `nodes` is append-only and indexed by [`NodeId`].
//! - `edges[i]` is the ordered list of destinations reachable from node `i`;
//!   exactly one list per node, created together with the node.
//! - `active` is the single "current node" pointer. Registration moves it to
//!   each registered node; playback moves it via [`Graph::advance_to`].
//!
//! Construction-time wiring ([`Graph::register_node`]) and playback-time phase
//! flips ([`Graph::advance_to`]) are separate operations on the same struct.
//! Once seeded, the structure never changes; only phases and `active` do.

use crate::error::{LatticeError, Result};
use crate::node::{Node, NodeId, Phase};
use crate::pitch::pitch_span;
use tracing::debug;

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Vec<NodeId>>,
    active: Option<NodeId>,
    edge_count: usize, // directed edges added, duplicates included
}

impl Graph {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeding pass: register `pitches[i]` with `delays_ms[i]`, in order, all
    /// starting `Off`.
    ///
    /// An empty pitch list yields an empty graph (which the scheduler refuses
    /// to step).
    pub fn seeded(pitches: &[u8], delays_ms: &[u32]) -> Result<Self> {
        if pitches.len() != delays_ms.len() {
            return Err(LatticeError::SeedMismatch { pitches: pitches.len(), delays: delays_ms.len() });
        }
        let mut g = Self::new();
        for (&pitch, &delay) in pitches.iter().zip(delays_ms) {
            g.register_node(Phase::Off, pitch, delay);
        }
        Ok(g)
    }

    /// Register a (phase, pitch, delay) event and return its id.
    ///
    /// - An equivalent node (same phase and pitch) is reused; its original
    ///   delay is kept and the candidate's delay is discarded.
    /// - Unless this is the first registration, reciprocal edges are added
    ///   between the resolved node and every node with a lower id. This also
    ///   happens on a dedup hit, so repeated registrations stack duplicate
    ///   destinations, which weights the random choice towards them.
    /// - The active pointer always moves to the resolved node.
    pub fn register_node(&mut self, phase: Phase, pitch: u8, delay_ms: u32) -> NodeId {
        let candidate = Node::new(self.nodes.len(), phase, pitch, delay_ms);
        let id = match self.find_equivalent(&candidate) {
            Some(existing) => {
                debug!(id = existing, pitch, %phase, "reusing equivalent node");
                existing
            }
            None => {
                let id = candidate.id();
                self.nodes.push(candidate);
                self.edges.push(Vec::new());
                debug!(id, pitch, %phase, delay_ms, "registered node");
                id
            }
        };

        if self.active.is_some() {
            for lower in (0..id).rev() {
                self.add_edge(lower, id);
                self.add_edge(id, lower);
            }
        }
        self.active = Some(id);
        id
    }

    /// First node (in id order) equivalent to `candidate`.
    fn find_equivalent(&self, candidate: &Node) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.equivalent_to(candidate))
    }

    #[inline]
    fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges[from].push(to);
        self.edge_count += 1;
    }

    /// Outgoing destinations of `id`, in insertion order, duplicates kept.
    pub fn edges_of(&self, id: NodeId) -> Result<&[NodeId]> {
        self.edges.get(id).map(Vec::as_slice).ok_or(self.out_of_range(id))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(self.out_of_range(id))
    }

    #[inline] pub fn nodes(&self) -> &[Node] { &self.nodes }
    #[inline] pub fn edges(&self) -> &[Vec<NodeId>] { &self.edges }
    #[inline] pub fn len(&self) -> usize { self.nodes.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
    #[inline] pub fn edge_count(&self) -> usize { self.edge_count }
    #[inline] pub fn active(&self) -> Option<NodeId> { self.active }

    /// The node the walk currently sits on.
    pub fn active_node(&self) -> Option<&Node> {
        self.active.and_then(|id| self.nodes.get(id))
    }

    /// `true` when `id` exists and has no outgoing edges.
    pub fn is_terminal(&self, id: NodeId) -> Result<bool> {
        Ok(self.edges_of(id)?.is_empty())
    }

    /// Lowest and highest pitch in the lattice.
    pub fn pitch_range(&self) -> Option<(u8, u8)> {
        pitch_span(self.nodes.iter().map(Node::pitch))
    }

    /// Traverse to `next`: the node being left goes `Off`, `next` goes `On`,
    /// and the active pointer moves.
    pub fn advance_to(&mut self, next: NodeId) -> Result<()> {
        if next >= self.nodes.len() {
            return Err(self.out_of_range(next));
        }
        if let Some(prev) = self.active {
            self.nodes[prev].set_phase(Phase::Off);
        }
        self.nodes[next].set_phase(Phase::On);
        self.active = Some(next);
        Ok(())
    }

    /// Move the active pointer to `id`, e.g. to restart a walk from a node
    /// that still has outgoing edges. The node being left goes `Off`; `id`
    /// keeps its phase until the next traversal flips it.
    pub fn restart_at(&mut self, id: NodeId) -> Result<()> {
        if id >= self.nodes.len() {
            return Err(self.out_of_range(id));
        }
        if let Some(prev) = self.active {
            self.nodes[prev].set_phase(Phase::Off);
        }
        self.active = Some(id);
        Ok(())
    }

    #[inline]
    fn out_of_range(&self, id: NodeId) -> LatticeError {
        LatticeError::OutOfRange { id, len: self.nodes.len() }
    }
}
