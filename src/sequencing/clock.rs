/// Tempo-driven step counter advanced once per sample.
///
/// Progress within the current step is counted in samples, so a step length
/// with an exact binary representation (6000, 5512.5, ...) advances on exactly
/// the same sample every time regardless of how long the clock has run.
#[derive(Debug, Clone, Default)]
pub struct StepClock {
    elapsed: f64,
    step: u64,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one sample. Returns `true` when a new step starts.
    ///
    /// A non-positive step length holds the clock still.
    pub fn tick(&mut self, step_samples: f64) -> bool {
        if !(step_samples.is_finite() && step_samples > 0.0) {
            return false;
        }
        self.elapsed += 1.0;
        if self.elapsed >= step_samples {
            self.elapsed -= step_samples;
            // A tempo jump can leave more than one step behind; skip ahead
            if self.elapsed >= step_samples {
                self.elapsed %= step_samples;
            }
            self.step += 1;
            true
        } else {
            false
        }
    }

    /// Index of the current step since the last restart.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Fraction of the current step already played, in [0, 1).
    pub fn progress(&self, step_samples: f64) -> f64 {
        if step_samples > 0.0 {
            (self.elapsed / step_samples).min(1.0)
        } else {
            0.0
        }
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.step = 0;
    }
}
