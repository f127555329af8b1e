//! Error taxonomy shared by the lattice crates.
//!
//! A walk reaching a node without outgoing edges is *not* an error; it is
//! reported through the step result and the sink's event stream.

use crate::node::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    /// Stepping or starting playback on a lattice with zero nodes.
    #[error("lattice has no nodes; select a non-empty preset first")]
    EmptyGraph,

    /// Node lookup with an id the graph never handed out.
    #[error("node id {id} out of range (graph has {len} nodes)")]
    OutOfRange { id: NodeId, len: usize },

    /// Seeding with pitch and delay lists of different length.
    #[error("seed mismatch: {pitches} pitches but {delays} delays")]
    SeedMismatch { pitches: usize, delays: usize },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("preset file: {0}")]
    PresetFile(String),
}

pub type Result<T, E = LatticeError> = core::result::Result<T, E>;
