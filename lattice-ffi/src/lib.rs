//! C ABI wrapper for the lattice player.
//!
//! Exposes a small set of functions to create/destroy a player, step the
//! walk, switch presets and read the lattice shape for display.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `LatticeEngine` (heap-allocated; you own/delete it).
//! - Status codes match `include/lattice.h`.
//!
//! Threading
//! - The object is NOT thread-safe; call all functions from the same host thread.

use lattice_engine::{Event, Player, PlayerConfig, PresetBook, Sink, Tick, MIN_WAIT_SECS};

pub const LATTICE_OK: i32 = 0;
pub const LATTICE_TERMINATED: i32 = 1;
pub const LATTICE_PAUSED: i32 = 2;
pub const LATTICE_EMPTY_GRAPH: i32 = -1;
pub const LATTICE_NULL_ARG: i32 = -2;
pub const LATTICE_UNKNOWN_PRESET: i32 = -3;

/// One step as seen from C.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LatticeStep {
    pub node: u32,
    pub pitch: u8,
    pub note_on: u8,
    pub velocity: f32,
    pub timestamp: f64,
    pub duration: f64,
    pub wait_secs: f64,
}

/// Keeps the last note event of a tick; the host owns note release.
#[derive(Default)]
struct Capture {
    last: Option<Event>,
}

impl Sink for Capture {
    fn emit(&mut self, event: &Event) {
        if event.pitch().is_some() {
            self.last = Some(*event);
        }
    }

    fn release_all(&mut self, _timestamp: f64) {}
}

/// Opaque player wrapper we hand to C.
pub struct LatticeEngine {
    player: Player,
    book: PresetBook,
}

impl LatticeEngine {
    fn new(preset_index: u32, seed: u64) -> Option<Self> {
        let mut e = Self { player: Player::seeded(PlayerConfig::default(), seed), book: PresetBook::default() };
        match e.select(preset_index) {
            LATTICE_OK => Some(e),
            _ => None,
        }
    }

    fn select(&mut self, preset_index: u32) -> i32 {
        let Some(preset) = self.book.nth(preset_index as usize) else {
            return LATTICE_UNKNOWN_PRESET;
        };
        if self.player.select_preset(preset).is_err() {
            return LATTICE_EMPTY_GRAPH;
        }
        match self.player.play() {
            Ok(()) => LATTICE_OK,
            Err(_) => LATTICE_EMPTY_GRAPH,
        }
    }

    fn step(&mut self, out: &mut LatticeStep) -> i32 {
        let mut cap = Capture::default();
        let (status, wait_secs) = match self.player.tick(&mut cap) {
            Ok(Tick::Paused) => return LATTICE_PAUSED,
            Ok(Tick::Continue { wait_secs }) => (LATTICE_OK, wait_secs),
            Ok(Tick::Terminated { .. }) => (LATTICE_TERMINATED, 0.0),
            Err(_) => return LATTICE_EMPTY_GRAPH,
        };

        let node = self.player.graph().and_then(|g| g.active()).unwrap_or(0);
        *out = LatticeStep { node: node as u32, ..LatticeStep::default() };
        match cap.last {
            Some(Event::NoteOn { pitch, velocity, timestamp, duration }) => {
                out.pitch = pitch;
                out.note_on = 1;
                out.velocity = velocity;
                out.timestamp = timestamp;
                out.duration = duration;
            }
            Some(Event::NoteOff { pitch, timestamp }) => {
                out.pitch = pitch;
                out.timestamp = timestamp;
            }
            _ => {}
        }
        out.wait_secs = if status == LATTICE_TERMINATED {
            self.player.graph().and_then(|g| g.active_node()).map_or(MIN_WAIT_SECS, |n| n.delay_secs().max(MIN_WAIT_SECS))
        } else {
            wait_secs
        };
        status
    }
}

// --- Creation / destruction -------------------------------------------------------

/// Create a player seeded with `seed`, lattice built from built-in preset
/// `preset_index`, already playing. Returns null on an unknown preset.
#[no_mangle]
pub extern "C" fn lattice_create(preset_index: u32, seed: u64) -> *mut LatticeEngine {
    match LatticeEngine::new(preset_index, seed) {
        Some(e) => Box::into_raw(Box::new(e)),
        None => std::ptr::null_mut(),
    }
}

/// Destroy a player previously returned by `lattice_create`.
#[no_mangle]
pub extern "C" fn lattice_destroy(engine: *mut LatticeEngine) {
    if !engine.is_null() {
        unsafe { drop(Box::from_raw(engine)); }
    }
}

// --- Playback ---------------------------------------------------------------------

/// Discard the current lattice and seed a new one; playback restarts at clock 0.
#[no_mangle]
pub extern "C" fn lattice_select_preset(engine: *mut LatticeEngine, preset_index: u32) -> i32 {
    if engine.is_null() { return LATTICE_NULL_ARG; }
    let e = unsafe { &mut *engine };
    e.select(preset_index)
}

/// Pause (`false`) or resume (`true`). Resuming after a dead end re-plays the
/// same lattice from its terminal node, which terminates again immediately.
#[no_mangle]
pub extern "C" fn lattice_set_playing(engine: *mut LatticeEngine, playing: bool) -> i32 {
    if engine.is_null() { return LATTICE_NULL_ARG; }
    let e = unsafe { &mut *engine };
    if playing {
        match e.player.play() {
            Ok(()) => LATTICE_OK,
            Err(_) => LATTICE_EMPTY_GRAPH,
        }
    } else {
        e.player.pause(&mut Capture::default());
        LATTICE_OK
    }
}

/// Advance the walk one step and write the note event to `out`.
///
/// Returns `LATTICE_OK`, `LATTICE_TERMINATED` (dead end; release all notes and
/// select a preset), `LATTICE_PAUSED`, or a negative error code.
#[no_mangle]
pub extern "C" fn lattice_step(engine: *mut LatticeEngine, out: *mut LatticeStep) -> i32 {
    if engine.is_null() || out.is_null() { return LATTICE_NULL_ARG; }
    let e = unsafe { &mut *engine };
    let out = unsafe { &mut *out };
    e.step(out)
}

// --- Structure (read-only) --------------------------------------------------------

#[no_mangle]
pub extern "C" fn lattice_node_count(engine: *const LatticeEngine) -> u32 {
    if engine.is_null() { return 0; }
    let e = unsafe { &*engine };
    e.player.graph().map_or(0, |g| g.len() as u32)
}

/// Active node id, or -1 when there is none.
#[no_mangle]
pub extern "C" fn lattice_active_node(engine: *const LatticeEngine) -> i32 {
    if engine.is_null() { return -1; }
    let e = unsafe { &*engine };
    e.player.graph().and_then(|g| g.active()).map_or(-1, |id| id as i32)
}

/// Number of outgoing edges (duplicates counted), or -1 for an invalid node.
#[no_mangle]
pub extern "C" fn lattice_out_degree(engine: *const LatticeEngine, node: u32) -> i32 {
    if engine.is_null() { return -1; }
    let e = unsafe { &*engine };
    e.player
        .graph()
        .and_then(|g| g.edges_of(node as usize).ok())
        .map_or(-1, |edges| edges.len() as i32)
}
