//! Schroeder reverb.
//!
//! A room is a cloud of delayed, filtered reflections. The Schroeder network
//! approximates that cloud with four parallel feedback combs feeding two
//! series allpass diffusers.
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) ──→ [Allpass 1] ──→ [Allpass 2] ──→ Wet
//!         └──→ [Comb 4] ──┘
//! ```
//!
//! ## Comb Filters
//!
//! ```text
//! y[n] = x[n] + feedback * lowpass(y[n - delay])
//! ```
//!
//! The lowpass inside the loop is the damping: every trip around the comb
//! loses a little more top end, so the tail darkens as it decays. Comb lengths
//! are mutually prime so their echoes do not pile up on the same samples.
//!
//! ## Allpass Filters
//!
//! ```text
//! w[n] = x[n] + g * w[n - delay]
//! y[n] = w[n - delay] - g * w[n]
//! ```
//!
//! Flat magnitude, smeared phase: they thicken the echo density without
//! colouring the tone.
//!
//! Buffers are sized once from the sample rate at construction, so
//! `process` never allocates.

const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];

fn delay_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate / 1000.0) as usize).max(1)
}

/// Feedback comb with a one-pole lowpass in the loop.
pub struct CombFilter {
    line: Vec<f32>,
    head: usize,
    decay: f32,
    damp: f32,
    damped: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            line: vec![0.0; delay_samples.max(1)],
            head: 0,
            decay: 0.5,
            damp: 0.5,
            damped: 0.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.decay = feedback.clamp(0.0, 0.99);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let echo = self.line[self.head];
        self.damped += (echo - self.damped) * (1.0 - self.damp);
        self.line[self.head] = input + self.damped * self.decay;
        self.head = (self.head + 1) % self.line.len();
        echo
    }

    pub fn reset(&mut self) {
        self.line.fill(0.0);
        self.damped = 0.0;
        self.head = 0;
    }
}

/// Schroeder allpass in direct form II: one line holds `x + g·w[n - D]`.
pub struct AllpassFilter {
    line: Vec<f32>,
    head: usize,
    gain: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            line: vec![0.0; delay_samples.max(1)],
            head: 0,
            gain: 0.5,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.gain = feedback.clamp(0.0, 0.9);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line[self.head];
        let stored = input + self.gain * delayed;
        self.line[self.head] = stored;
        self.head = (self.head + 1) % self.line.len();
        delayed - self.gain * stored
    }

    pub fn reset(&mut self) {
        self.line.fill(0.0);
        self.head = 0;
    }
}

/// Schroeder reverb with 4 comb filters and 2 allpass filters.
pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
}

impl SchroederReverb {
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        Self {
            combs: COMB_DELAYS_MS.map(|ms| CombFilter::new(delay_samples(ms, sample_rate))),
            allpasses: ALLPASS_DELAYS_MS.map(|ms| AllpassFilter::new(delay_samples(ms, sample_rate))),
        }
    }

    /// Room size in [0, 1] maps to comb feedback 0.7..0.98.
    pub fn set_room_size(&mut self, size: f32) {
        let feedback = 0.7 + size.clamp(0.0, 1.0) * 0.28;
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
    }

    pub fn set_damping(&mut self, damp: f32) {
        for comb in &mut self.combs {
            comb.set_damp(damp);
        }
    }

    /// Process one sample and return the fully wet signal.
    pub fn process(&mut self, input: f32) -> f32 {
        let input = if input.is_finite() { input } else { 0.0 };

        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25;

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }
        output
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}
