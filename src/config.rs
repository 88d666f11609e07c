#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Engine-wide settings copied into every graph at creation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Global tempo used by nodes whose own bpm parameter is 0.
    pub bpm: f32,
    /// Seed for noise sources and random arpeggios. Node ids are mixed in so
    /// two nodes never share a stream.
    pub seed: u64,
    /// Capacity of the render thread's output ring buffer, in samples.
    pub ring_capacity: usize,
    /// Samples rendered per lock acquisition on the render thread.
    pub block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            bpm: 120.0,
            seed: 0x5eed,
            ring_capacity: 8192,
            block_size: 64,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate.max(1.0);
        self
    }

    pub fn with_bpm(mut self, bpm: f32) -> Self {
        self.bpm = bpm.clamp(1.0, 999.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_ring_capacity(mut self, capacity: usize) -> Self {
        self.ring_capacity = capacity.max(self.block_size);
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_clamp_nonsense() {
        let config = EngineConfig::default()
            .with_sample_rate(-5.0)
            .with_bpm(0.0)
            .with_block_size(0);

        assert_eq!(config.sample_rate, 1.0);
        assert_eq!(config.bpm, 1.0);
        assert_eq!(config.block_size, 1);
    }
}
