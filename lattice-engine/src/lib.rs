//! Lattice Engine — presets, seeding, Markov-walk stepping, playback driver.
//!
//! Crate layout:
//! - [`presets`]   : built-in and file-loaded pitch presets, random seed delays
//! - [`scheduler`] : `Scheduler::step`, the one-edge walk with its wait floor
//! - [`events`]    : outbound `Event` records and the `Sink` trait
//! - [`player`]    : `Player`, the clocked play/pause/stop driver
//!
//! Randomness is always injected (`rand::Rng`), so a seeded generator gives a
//! reproducible lattice and walk. Everything runs on the caller's thread.

pub mod events;
pub mod player;
pub mod presets;
pub mod scheduler;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use events::{Event, EventLog, Sink};
pub use lattice_core::{pitch, Graph, LatticeError, Node, NodeId, Phase};
pub use player::{Player, PlayerConfig, Tick};
pub use presets::{Preset, PresetBook};
pub use scheduler::{Scheduler, Step, MIN_WAIT_SECS};
