//! MIDI file recorder sink.
//!
//! Note-ons carry their own duration, so a note ends at `timestamp + duration`
//! unless a note-off, a retrigger of the same pitch, or a release-all cuts it
//! short. Output is a single-track SMF at a fixed 120 BPM, so one second of
//! player clock is 960 ticks.

use lattice_engine::{Event, Sink};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use std::path::Path;

const TICKS_PER_QUARTER: u16 = 480;
const MICROS_PER_QUARTER: u32 = 500_000; // 120 BPM
const TICKS_PER_SEC: f64 = TICKS_PER_QUARTER as f64 * 1_000_000.0 / MICROS_PER_QUARTER as f64;

#[derive(Clone, Debug, PartialEq)]
struct RecordedNote {
    pitch: u8,
    velocity: u8,
    start: f64,
    end: f64,
}

#[derive(Clone, Debug, Default)]
pub struct MidiRecorder {
    notes: Vec<RecordedNote>,
}

impl MidiRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Cut every note of `pitch` (or every note, when `None`) still sounding at `t`.
    fn cut(&mut self, pitch: Option<u8>, t: f64) {
        for n in self.notes.iter_mut().filter(|n| pitch.map_or(true, |p| p == n.pitch)) {
            if n.start <= t && n.end > t {
                n.end = t;
            }
        }
    }

    pub fn to_smf(&self) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
        ));

        // (tick, is_on, pitch, velocity); offs sort before ons on the same tick
        let mut marks: Vec<(u32, bool, u8, u8)> = Vec::with_capacity(self.notes.len() * 2);
        for n in &self.notes {
            marks.push((to_ticks(n.start), true, n.pitch, n.velocity));
            marks.push((to_ticks(n.end), false, n.pitch, 0));
        }
        marks.sort_by_key(|&(tick, on, pitch, _)| (tick, on, pitch));

        let mut track = vec![TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(MICROS_PER_QUARTER))),
        }];
        let mut last = 0u32;
        for (tick, on, pitch, vel) in marks {
            let key = u7::new(pitch.min(127));
            let message = if on {
                MidiMessage::NoteOn { key, vel: u7::new(vel) }
            } else {
                MidiMessage::NoteOff { key, vel: u7::new(0) }
            };
            track.push(TrackEvent {
                delta: u28::new(tick - last),
                kind: TrackEventKind::Midi { channel: u4::new(0), message },
            });
            last = tick;
        }
        track.push(TrackEvent { delta: u28::new(0), kind: TrackEventKind::Meta(MetaMessage::EndOfTrack) });
        smf.tracks.push(track);
        smf
    }

    pub fn write(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let mut buf = Vec::new();
        self.to_smf().write(&mut buf)?;
        std::fs::write(path, &buf)?;
        Ok(())
    }
}

impl Sink for MidiRecorder {
    fn emit(&mut self, event: &Event) {
        match *event {
            Event::NoteOn { pitch, velocity, timestamp, duration } => {
                self.cut(Some(pitch), timestamp);
                self.notes.push(RecordedNote {
                    pitch,
                    velocity: to_velocity(velocity),
                    start: timestamp,
                    end: timestamp + duration,
                });
            }
            Event::NoteOff { pitch, timestamp } => self.cut(Some(pitch), timestamp),
            Event::WalkTerminated { .. } => {}
        }
    }

    fn release_all(&mut self, timestamp: f64) {
        self.cut(None, timestamp);
    }
}

#[inline]
fn to_ticks(secs: f64) -> u32 {
    (secs.max(0.0) * TICKS_PER_SEC).round() as u32
}

#[inline]
fn to_velocity(v: f32) -> u8 {
    // at least 1: velocity 0 would read as a note-off
    ((v.clamp(0.0, 1.0) * 127.0).round() as u8).max(1)
}
