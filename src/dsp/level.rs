//! Output-stage level tools: DC removal and a loudness follower.

const ATTACK_SECONDS: f32 = 0.005;
const RELEASE_SECONDS: f32 = 0.2;

/// Smoothing coefficient for a one-pole follower with time constant `seconds`.
#[inline]
pub fn time_constant_coef(seconds: f32, sample_rate: f32) -> f32 {
    let samples = seconds * sample_rate;
    if !samples.is_finite() || samples <= 0.0 {
        return 1.0;
    }
    1.0 - (-1.0 / samples).exp()
}

/// Removes the slowly-moving average from a signal.
///
/// The DC estimate moves towards the input by `0.5 / sample_rate` of the
/// difference every sample, so it follows offsets but not audio-rate motion.
#[derive(Debug, Clone, Copy)]
pub struct DcBlocker {
    estimate: f32,
    rate: f32,
}

impl DcBlocker {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            estimate: 0.0,
            rate: 0.5 / sample_rate.max(1.0),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.estimate += (input - self.estimate) * self.rate;
        input - self.estimate
    }

    pub fn estimate(&self) -> f32 {
        self.estimate
    }

    pub fn reset(&mut self) {
        self.estimate = 0.0;
    }
}

/// Peak follower with a fast attack (5 ms) and slow release (200 ms).
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack: f32,
    release: f32,
}

impl EnvelopeFollower {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            envelope: 0.0,
            attack: time_constant_coef(ATTACK_SECONDS, sample_rate),
            release: time_constant_coef(RELEASE_SECONDS, sample_rate),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level = input.abs();
        let coef = if level > self.envelope { self.attack } else { self.release };
        self.envelope += (level - self.envelope) * coef;
        self.envelope
    }

    /// Scale `input` down when the followed level exceeds unity.
    #[inline]
    pub fn normalize(&mut self, input: f32) -> f32 {
        let envelope = self.process(input);
        input / envelope.max(1.0)
    }

    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}
