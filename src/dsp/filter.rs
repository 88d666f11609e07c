use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| mode      | passes       | rejects      | output            |
| --------- | ------------ | ------------ | ----------------- |
| low-pass  | below cutoff | above cutoff | y[n]              |
| high-pass | above cutoff | below cutoff | x[n] - y[n]       |

One integrator, 6 dB/octave:

    a    = exp(-2π · fc / sr)
    y[n] = (1 - a) · x[n] + a · y[n-1]

The high-pass is the complement of the low-pass, so both modes share state
and switching mode mid-note does not click.
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    LowPass,
    HighPass,
}

impl FilterMode {
    pub const NAMES: &'static [&'static str] = &["lowpass", "highpass"];

    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Self::HighPass,
            _ => Self::LowPass,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OnePole {
    state: f32,
}

impl OnePole {
    pub fn new() -> Self {
        Self { state: 0.0 }
    }

    /// Feedback coefficient for a cutoff, clamped to the audible band and below Nyquist.
    #[inline]
    pub fn coefficient(cutoff_hz: f32, sample_rate: f32) -> f32 {
        let nyquist = (sample_rate * 0.5).max(MIN_CUTOFF_HZ);
        let cutoff = if cutoff_hz.is_finite() { cutoff_hz } else { MAX_CUTOFF_HZ };
        let cutoff = cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ).min(nyquist);
        (-TAU * cutoff / sample_rate.max(1.0)).exp()
    }

    #[inline]
    pub fn process(&mut self, sample: f32, coefficient: f32, mode: FilterMode) -> f32 {
        self.state = (1.0 - coefficient) * sample + coefficient * self.state;
        match mode {
            FilterMode::LowPass => self.state,
            FilterMode::HighPass => sample - self.state,
        }
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
