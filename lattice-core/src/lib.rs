//! Lattice Core — the node/edge structure behind Markov-walk music generation.
//!
//! Features
//! - `serde` : serialize `Graph`, `Node` and `Phase` for read-only export
//!
//! Modules
//! - [`node`]  : `Node` descriptor, `Phase` (on/off), equivalence predicate
//! - [`graph`] : deduplicating registration, reciprocal wiring, traversal flips
//! - [`error`] : `LatticeError` taxonomy
//! - [`pitch`] : MIDI note helpers (frequency, labels, span)
//!
//! Design
//! - No randomness and no I/O here; the engine crate injects both
//! - Ids are indices into the owning graph and are never shared across graphs

pub mod error;
pub mod graph;
pub mod node;
pub mod pitch;

pub use error::{LatticeError, Result};
pub use graph::Graph;
pub use node::{Node, NodeId, Phase};

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::error::{LatticeError, Result};
    pub use crate::graph::Graph;
    pub use crate::node::{Node, NodeId, Phase};
    pub use crate::pitch::{midi_to_freq, note_name, pitch_span};
}

#[cfg(test)]
mod smoke {

    #[test]
    fn prelude_exists() {
        use crate::prelude::*;
        let mut g = Graph::new();
        let id = g.register_node(Phase::Off, 60, 300);
        assert_eq!(note_name(g.node(id).unwrap().pitch()), "C4");
        let _ = midi_to_freq(60);
    }
}
