//! Low-level DSP primitives used by the graph nodes.
//!
//! These kernels know nothing about ports, links or voices. Each one is a
//! per-sample state machine that a node drives once per tick (once per voice
//! for the polyphonic ones). Buffers are allocated at construction, never in
//! `process`.

/// Feed-forward compressor with lookahead and adaptive release.
pub mod compressor;
/// Exponential attack/decay/sustain/release envelope.
pub mod envelope;
/// One-pole low/high pass.
pub mod filter;
/// DC blocker and loudness follower for the output stage.
pub mod level;
/// Phase-accumulator oscillator and noise.
pub mod oscillator;
/// Schroeder comb/allpass reverb.
pub mod reverb;
/// Fractional delay line with cubic interpolation and feedback.
pub mod waveguide;

pub use compressor::{Compressor, CompressorSettings};
pub use envelope::{Adsr, EnvelopeStage};
pub use filter::{FilterMode, OnePole};
pub use level::{DcBlocker, EnvelopeFollower};
pub use oscillator::{Oscillator, Waveform};
pub use reverb::SchroederReverb;
pub use waveguide::WaveGuide;
