use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase-Accumulator Oscillator
============================

Every periodic waveform here is a function of a single phase value that
walks around the unit circle:

    phase[n+1] = (phase[n] + 2π · f / sr) mod 2π

The increment is recomputed every sample from whatever frequency arrives, so
a modulating signal on the frequency input bends the pitch sample by sample
(FM) without any extra machinery.

The phase is kept in f64. At 44.1 kHz an f32 accumulator drifts audibly
within a few minutes; f64 keeps a 440 Hz period landing back on its start
within 1e-9 after hours.

Waveforms (phase p in [0, 2π), t = p / 2π in [0, 1)):

    sine      sin(p)
    pulse     +1 while t < width, else -1
    square    pulse with width 0.5
    saw       2t - 1            (rising ramp)
    triangle  1 - 4|t - 0.5|    (peaks at t = 0.5)
    noise     uniform [-1, 1], phase ignored
*/

/// Waveform selector. The order matches the `waveform` option list exposed by
/// the Oscillator node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Pulse,
    Square,
    Saw,
    Triangle,
    Noise,
}

impl Waveform {
    pub const NAMES: &'static [&'static str] = &["sine", "pulse", "square", "saw", "triangle", "noise"];

    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Pulse,
            2 => Self::Square,
            3 => Self::Saw,
            4 => Self::Triangle,
            5 => Self::Noise,
            _ => Self::Sine,
        }
    }
}

pub struct Oscillator {
    phase: f64,
    rng: fastrand::Rng,
}

impl Oscillator {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: 0.0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Produce one sample at the current phase, then advance the phase.
    ///
    /// `pulse_width` only affects [`Waveform::Pulse`].
    pub fn next_sample(
        &mut self,
        waveform: Waveform,
        frequency: f32,
        sample_rate: f32,
        pulse_width: f32,
    ) -> f32 {
        let t = (self.phase / TAU) as f32;

        let value = match waveform {
            Waveform::Sine => self.phase.sin() as f32,
            Waveform::Pulse => pulse(t, pulse_width.clamp(0.01, 0.99)),
            Waveform::Square => pulse(t, 0.5),
            Waveform::Saw => 2.0 * t - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (t - 0.5).abs(),
            Waveform::Noise => self.rng.f32() * 2.0 - 1.0,
        };

        self.advance(frequency, sample_rate);
        value
    }

    /// Advance the phase by one sample at `frequency`.
    #[inline]
    pub fn advance(&mut self, frequency: f32, sample_rate: f32) {
        if sample_rate <= 0.0 || !frequency.is_finite() {
            return;
        }
        let increment = TAU * frequency as f64 / sample_rate as f64;
        self.phase = (self.phase + increment).rem_euclid(TAU);
    }

    /// Current phase in radians, always within [0, 2π).
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[inline]
fn pulse(t: f32, width: f32) -> f32 {
    if t < width {
        1.0
    } else {
        -1.0
    }
}
