//! Outbound event records and the [`Sink`] that consumes them.
//!
//! The engine never renders sound. It hands logical events to a sink (a synth
//! driver, a MIDI recorder, a logger) and tells it when to release everything.

use lattice_core::NodeId;

/// One logical musical event, timestamps in seconds on the player's clock.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Event {
    NoteOn { pitch: u8, velocity: f32, timestamp: f64, duration: f64 },
    NoteOff { pitch: u8, timestamp: f64 },
    /// The walk reached a node without outgoing edges.
    WalkTerminated { at_node: NodeId },
}

impl Event {
    #[inline]
    pub fn pitch(&self) -> Option<u8> {
        match *self {
            Event::NoteOn { pitch, .. } | Event::NoteOff { pitch, .. } => Some(pitch),
            Event::WalkTerminated { .. } => None,
        }
    }

    #[inline]
    pub fn timestamp(&self) -> Option<f64> {
        match *self {
            Event::NoteOn { timestamp, .. } | Event::NoteOff { timestamp, .. } => Some(timestamp),
            Event::WalkTerminated { .. } => None,
        }
    }

    #[inline]
    pub fn is_note_on(&self) -> bool {
        matches!(self, Event::NoteOn { .. })
    }
}

/// Consumer of the event stream.
pub trait Sink {
    fn emit(&mut self, event: &Event);

    /// Release every sounding note (pause, stop, dead end).
    fn release_all(&mut self, timestamp: f64);
}

/// Sink that just records what it was given.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
    pub releases: Vec<f64>,
}

impl EventLog {
    #[inline] pub fn new() -> Self { Self::default() }
    #[inline] pub fn len(&self) -> usize { self.events.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.events.is_empty() }

    /// Pitches of all note events, in emission order.
    pub fn pitches(&self) -> impl Iterator<Item = u8> + '_ {
        self.events.iter().filter_map(Event::pitch)
    }

    pub fn terminated_at(&self) -> Option<NodeId> {
        self.events.iter().find_map(|e| match *e {
            Event::WalkTerminated { at_node } => Some(at_node),
            _ => None,
        })
    }
}

impl Sink for EventLog {
    fn emit(&mut self, event: &Event) {
        self.events.push(*event);
    }

    fn release_all(&mut self, timestamp: f64) {
        self.releases.push(timestamp);
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, event: &Event) {
        (**self).emit(event);
    }

    fn release_all(&mut self, timestamp: f64) {
        (**self).release_all(timestamp);
    }
}
