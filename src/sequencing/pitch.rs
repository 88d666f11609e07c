//! MIDI note numbers and equal-tempered frequencies (A4 = note 69 = 440 Hz).

pub const A4_NOTE: f32 = 69.0;
pub const A4_HZ: f32 = 440.0;

/// Frequency of a (possibly fractional) MIDI note.
#[inline]
pub fn midi_to_freq(note: f32) -> f32 {
    A4_HZ * 2.0_f32.powf((note - A4_NOTE) / 12.0)
}

/// Nearest fractional MIDI note for a frequency, or `None` for non-positive input.
pub fn freq_to_midi(freq: f32) -> Option<f32> {
    if freq <= 0.0 || !freq.is_finite() {
        return None;
    }
    Some(A4_NOTE + 12.0 * (freq / A4_HZ).log2())
}
