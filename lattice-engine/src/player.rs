//! Playback driver around a [`Scheduler`].
//!
//! The player owns the random source, the current lattice, and a logical
//! clock in seconds. An external timer calls [`Player::tick`] and waits the
//! returned interval before calling again; the player itself never sleeps,
//! spawns, or locks.
//!
//! Selecting a preset replaces the scheduler (graph + active pointer) and the
//! clock in one assignment, so nothing from the old lattice survives.

use crate::events::{Event, Sink};
use crate::presets::{Preset, DELAY_MAX_MS, DELAY_MIN_MS};
use crate::scheduler::{Scheduler, DEFAULT_VELOCITY};
use lattice_core::{Graph, LatticeError, NodeId, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Note-on velocity in [0, 1].
    pub velocity: f32,
    /// Seed delays are drawn from `[delay_min_ms, delay_max_ms)`.
    pub delay_min_ms: u32,
    pub delay_max_ms: u32,
    /// Node to start walking from; `None` keeps the last seeded node.
    pub start_node: Option<NodeId>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            velocity: DEFAULT_VELOCITY,
            delay_min_ms: DELAY_MIN_MS,
            delay_max_ms: DELAY_MAX_MS,
            start_node: None,
        }
    }
}

/// What the external timer should do after a tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Tick {
    /// Not playing; nothing was emitted.
    Paused,
    /// Call `tick` again after `wait_secs`.
    Continue { wait_secs: f64 },
    /// Dead end reached; notes were released and playback stopped.
    Terminated { at_node: NodeId },
}

pub struct Player<R: Rng = StdRng> {
    config: PlayerConfig,
    rng: R,
    scheduler: Option<Scheduler>,
    preset: Option<String>,
    clock: f64,
    playing: bool,
}

impl Player<StdRng> {
    /// Deterministic player: same seed, same delays, same walk.
    pub fn seeded(config: PlayerConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: PlayerConfig) -> Self {
        Self::new(config, StdRng::from_entropy())
    }
}

impl<R: Rng> Player<R> {
    pub fn new(config: PlayerConfig, rng: R) -> Self {
        Self { config, rng, scheduler: None, preset: None, clock: 0.0, playing: false }
    }

    #[inline] pub fn config(&self) -> &PlayerConfig { &self.config }
    #[inline] pub fn is_playing(&self) -> bool { self.playing }
    #[inline] pub fn clock(&self) -> f64 { self.clock }
    #[inline] pub fn preset_name(&self) -> Option<&str> { self.preset.as_deref() }
    #[inline] pub fn scheduler(&self) -> Option<&Scheduler> { self.scheduler.as_ref() }

    /// Read-only view of the current lattice for renderers.
    #[inline]
    pub fn graph(&self) -> Option<&Graph> {
        self.scheduler.as_ref().map(Scheduler::graph)
    }

    /// Discard the current lattice and seed a fresh one from `preset`.
    /// Playback stops; call [`Player::play`] again to resume.
    pub fn select_preset(&mut self, preset: &Preset) -> Result<&Graph> {
        let graph = preset.seed_graph(&mut self.rng, self.config.delay_min_ms, self.config.delay_max_ms)?;
        let mut scheduler = Scheduler::new(graph).with_velocity(self.config.velocity);
        if let Some(start) = self.config.start_node {
            if !scheduler.graph().is_empty() {
                scheduler.restart_at(start)?;
            }
        }

        info!(preset = %preset.name, nodes = scheduler.graph().len(), "preset selected");
        self.playing = false;
        self.clock = 0.0;
        self.preset = Some(preset.name.clone());
        Ok(self.scheduler.insert(scheduler).graph())
    }

    /// Start (or resume) ticking. Refuses an absent or empty lattice.
    pub fn play(&mut self) -> Result<()> {
        match &self.scheduler {
            Some(s) if !s.graph().is_empty() => {
                self.playing = true;
                info!(clock = self.clock, "playing");
                Ok(())
            }
            _ => Err(LatticeError::EmptyGraph),
        }
    }

    /// Stop ticking and release all sounding notes; the clock keeps its value.
    pub fn pause<S: Sink + ?Sized>(&mut self, sink: &mut S) {
        if self.playing {
            self.playing = false;
            sink.release_all(self.clock);
            info!(clock = self.clock, "paused");
        }
    }

    /// Pause and rewind the clock.
    pub fn stop<S: Sink + ?Sized>(&mut self, sink: &mut S) {
        self.pause(sink);
        self.clock = 0.0;
    }

    /// Play when paused, pause when playing. Returns the new playing state.
    pub fn toggle<S: Sink + ?Sized>(&mut self, sink: &mut S) -> Result<bool> {
        if self.playing {
            self.pause(sink);
        } else {
            self.play()?;
        }
        Ok(self.playing)
    }

    /// One step of the walk at the current clock, forwarded to `sink`.
    pub fn tick<S: Sink + ?Sized>(&mut self, sink: &mut S) -> Result<Tick> {
        if !self.playing {
            return Ok(Tick::Paused);
        }
        let scheduler = self.scheduler.as_mut().ok_or(LatticeError::EmptyGraph)?;
        let step = match scheduler.step(self.clock, &mut self.rng) {
            Ok(step) => step,
            Err(e) => {
                self.playing = false;
                return Err(e);
            }
        };

        sink.emit(&step.event);
        self.clock += step.wait_secs;

        if let Some(signal) = step.termination() {
            sink.emit(&signal);
            sink.release_all(self.clock);
            self.playing = false;
            return Ok(Tick::Terminated { at_node: step.node });
        }
        Ok(Tick::Continue { wait_secs: step.wait_secs })
    }

    /// Tick up to `max_steps` times on the logical clock without waiting.
    /// Returns the number of steps taken; stops early on a dead end.
    pub fn run_offline<S: Sink + ?Sized>(&mut self, max_steps: usize, sink: &mut S) -> Result<usize> {
        let mut taken = 0;
        while taken < max_steps {
            match self.tick(sink)? {
                Tick::Paused => break,
                Tick::Continue { .. } => taken += 1,
                Tick::Terminated { .. } => {
                    taken += 1;
                    break;
                }
            }
        }
        Ok(taken)
    }

    /// Events a sink would see for a walk emitted on this player, as a
    /// convenience for hosts that just want a list.
    pub fn collect(&mut self, max_steps: usize) -> Result<Vec<Event>> {
        let mut log = crate::events::EventLog::new();
        self.run_offline(max_steps, &mut log)?;
        Ok(log.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::presets::TETRAHEDRON;

    fn tetra() -> Preset {
        Preset::new("TETRAHEDRON", TETRAHEDRON.to_vec())
    }

    #[test]
    fn refuses_to_play_without_nodes() {
        let mut p = Player::seeded(PlayerConfig::default(), 1);
        assert_eq!(p.play(), Err(LatticeError::EmptyGraph));
        p.select_preset(&Preset::new("EMPTY", vec![])).unwrap();
        assert_eq!(p.play(), Err(LatticeError::EmptyGraph));
        assert!(!p.is_playing());
    }

    #[test]
    fn tick_while_paused_emits_nothing() {
        let mut p = Player::seeded(PlayerConfig::default(), 1);
        p.select_preset(&tetra()).unwrap();
        let mut log = EventLog::new();
        assert_eq!(p.tick(&mut log).unwrap(), Tick::Paused);
        assert!(log.is_empty());
    }

    #[test]
    fn clock_advances_by_wait() {
        let mut p = Player::seeded(PlayerConfig::default(), 3);
        p.select_preset(&tetra()).unwrap();
        p.play().unwrap();
        let mut log = EventLog::new();
        let mut expected = 0.0;
        for _ in 0..10 {
            let ts = p.clock();
            match p.tick(&mut log).unwrap() {
                Tick::Continue { wait_secs } => expected += wait_secs,
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(log.events.last().unwrap().timestamp(), Some(ts));
        }
        assert!((p.clock() - expected).abs() < 1e-9);
    }

    #[test]
    fn pause_and_stop_release_notes() {
        let mut p = Player::seeded(PlayerConfig::default(), 4);
        p.select_preset(&tetra()).unwrap();
        let mut log = EventLog::new();
        assert!(p.toggle(&mut log).unwrap());
        p.run_offline(3, &mut log).unwrap();
        let at = p.clock();
        assert!(!p.toggle(&mut log).unwrap());
        assert_eq!(log.releases, vec![at]);

        p.play().unwrap();
        p.stop(&mut log);
        assert_eq!(log.releases.len(), 2);
        assert_eq!(p.clock(), 0.0);
        // pausing twice releases once
        p.pause(&mut log);
        assert_eq!(log.releases.len(), 2);
    }

    #[test]
    fn single_node_preset_terminates_on_first_tick() {
        let mut p = Player::seeded(PlayerConfig::default(), 5);
        p.select_preset(&Preset::new("SOLO", vec![60])).unwrap();
        p.play().unwrap();
        let mut log = EventLog::new();
        assert_eq!(p.tick(&mut log).unwrap(), Tick::Terminated { at_node: 0 });
        assert!(!p.is_playing());
        assert_eq!(log.terminated_at(), Some(0));
        assert_eq!(log.releases.len(), 1);
        assert_eq!(p.run_offline(10, &mut log).unwrap(), 0);
    }

    #[test]
    fn new_preset_discards_old_lattice() {
        let mut p = Player::seeded(PlayerConfig::default(), 6);
        p.select_preset(&tetra()).unwrap();
        p.play().unwrap();
        p.run_offline(5, &mut EventLog::new()).unwrap();

        let g = p.select_preset(&Preset::builtin("CUBOID").unwrap()).unwrap();
        assert_eq!(g.len(), 8);
        assert_eq!(g.active(), Some(7));
        assert!(g.nodes().iter().all(|n| !n.phase().is_on()));
        assert!(!p.is_playing());
        assert_eq!(p.clock(), 0.0);
        assert_eq!(p.preset_name(), Some("CUBOID"));
    }

    #[test]
    fn start_node_is_applied_and_checked() {
        let cfg = PlayerConfig { start_node: Some(0), ..PlayerConfig::default() };
        let mut p = Player::seeded(cfg, 7);
        assert_eq!(p.select_preset(&tetra()).unwrap().active(), Some(0));

        let cfg = PlayerConfig { start_node: Some(9), ..PlayerConfig::default() };
        let mut p = Player::seeded(cfg, 7);
        assert!(matches!(p.select_preset(&tetra()), Err(LatticeError::OutOfRange { id: 9, .. })));
        assert!(p.graph().is_none());
    }

    #[test]
    fn seeded_players_agree() {
        let run = || {
            let mut p = Player::seeded(PlayerConfig::default(), 99);
            p.select_preset(&tetra()).unwrap();
            p.play().unwrap();
            p.collect(50).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn config_reads_partial_ron() {
        let cfg: PlayerConfig = ron::from_str("(velocity: 0.5)").unwrap();
        assert_eq!(cfg.velocity, 0.5);
        assert_eq!(cfg.delay_min_ms, DELAY_MIN_MS);
        assert_eq!(cfg.start_node, None);
    }
}
