//! Presets: named, fixed pitch lists that seed a lattice.
//!
//! Three shapes are built in (vertex count = number of pitches). Hosts can
//! add or shadow presets with a RON file holding a list of
//! `(name: "...", pitches: [..])` entries. Seeding draws one random delay
//! per vertex; the graph itself never validates musical meaning.

use lattice_core::{Graph, LatticeError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const TETRAHEDRON: &[u8] = &[60, 64, 67, 69];
pub const PYRAMID: &[u8] = &[60, 64, 65, 67, 69];
pub const CUBOID: &[u8] = &[60, 62, 64, 65, 67, 69, 71, 72];

const BUILTIN: [(&str, &[u8]); 3] = [
    ("TETRAHEDRON", TETRAHEDRON),
    ("PYRAMID", PYRAMID),
    ("CUBOID", CUBOID),
];

/// Default bounds for seed delays, milliseconds, `[min, max)`.
pub const DELAY_MIN_MS: u32 = 300;
pub const DELAY_MAX_MS: u32 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub pitches: Vec<u8>,
}

impl Preset {
    pub fn new(name: impl Into<String>, pitches: Vec<u8>) -> Self {
        Self { name: name.into(), pitches }
    }

    /// Built-in preset by name, case-insensitive.
    pub fn builtin(name: &str) -> Option<Self> {
        BUILTIN
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, p)| Self::new(*n, p.to_vec()))
    }

    pub fn builtins() -> Vec<Self> {
        BUILTIN.iter().map(|(n, p)| Self::new(*n, p.to_vec())).collect()
    }

    #[inline]
    pub fn vertices(&self) -> usize {
        self.pitches.len()
    }

    /// Seed a fresh graph, one random delay in `[min_ms, max_ms)` per pitch.
    pub fn seed_graph<R: Rng + ?Sized>(&self, rng: &mut R, min_ms: u32, max_ms: u32) -> Result<Graph> {
        let delays = random_delays(self.pitches.len(), rng, min_ms, max_ms);
        let graph = Graph::seeded(&self.pitches, &delays)?;
        info!(preset = %self.name, nodes = graph.len(), edges = graph.edge_count(), "seeded lattice");
        Ok(graph)
    }
}

/// `n` delays drawn uniformly from `[min_ms, max_ms)`; a degenerate range
/// yields `min_ms` for every entry.
pub fn random_delays<R: Rng + ?Sized>(n: usize, rng: &mut R, min_ms: u32, max_ms: u32) -> Vec<u32> {
    if max_ms <= min_ms {
        return vec![min_ms; n];
    }
    (0..n).map(|_| rng.gen_range(min_ms..max_ms)).collect()
}

/// The closed set of presets a host can select from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresetBook {
    presets: Vec<Preset>,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self { presets: Preset::builtins() }
    }
}

impl PresetBook {
    /// Built-ins plus the presets in a RON string; a file preset shadows a
    /// built-in of the same name.
    pub fn with_ron(ron_src: &str) -> Result<Self> {
        let extra: Vec<Preset> =
            ron::from_str(ron_src).map_err(|e| LatticeError::PresetFile(e.to_string()))?;
        let mut book = Self::default();
        for p in extra {
            book.insert(p);
        }
        Ok(book)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| LatticeError::PresetFile(format!("{}: {e}", path.display())))?;
        Self::with_ron(&src)
    }

    pub fn insert(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name.eq_ignore_ascii_case(&preset.name)) {
            Some(slot) => *slot = preset,
            None => self.presets.push(preset),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| LatticeError::UnknownPreset(name.to_string()))
    }

    /// Preset by position (selection order).
    pub fn nth(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    #[inline] pub fn len(&self) -> usize { self.presets.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.presets.is_empty() }
}
