//! Pitch helpers for MIDI note numbers.
//!
//! Conventions:
//! - Note 69 is A4 at 440 Hz, 12-TET.
//! - Note 60 is C4 (scientific pitch notation), so note 0 is C-1.

const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// MIDI note number to frequency in Hz.
#[inline]
pub fn midi_to_freq(pitch: u8) -> f32 {
    440.0 * ((f32::from(pitch) - 69.0) / 12.0).exp2()
}

/// Human-readable label (`60 -> "C4"`, `61 -> "C#4"`), used for node labels.
pub fn note_name(pitch: u8) -> String {
    let octave = i32::from(pitch / 12) - 1;
    format!("{}{}", NAMES[usize::from(pitch % 12)], octave)
}

/// Lowest and highest pitch of a sequence, or `None` when empty.
pub fn pitch_span(pitches: impl IntoIterator<Item = u8>) -> Option<(u8, u8)> {
    pitches.into_iter().fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    })
}
