//! Node types built on the DSP kernels.
//!
//! Every module exposes a `SPEC` (ports and parameters) and a `factory`.
//! Inputs that share a name with a parameter follow "or" semantics: wired
//! wins, otherwise the parameter value is used on every voice.

pub mod adsr;
pub mod arpeggiator;
pub mod compressor;
pub mod delay;
pub mod filter;
pub mod keys;
pub mod math;
pub mod mix;
pub mod oscillator;
pub mod output;
pub mod remap;
pub mod reverb;
pub mod sampler;
pub mod sequencer;
pub mod storage;
pub mod value;

use crate::{graph::NodeRegistry, Voices, VOICES};

/// Register every built-in node type.
pub fn register_builtins(registry: &mut NodeRegistry) {
    registry.register(&value::SPEC, value::factory);
    registry.register(&mix::SPEC, mix::factory);
    registry.register(&math::SPEC, math::factory);
    registry.register(&remap::SPEC, remap::factory);
    registry.register(&oscillator::SPEC, oscillator::factory);
    registry.register(&adsr::SPEC, adsr::factory);
    registry.register(&filter::SPEC, filter::factory);
    registry.register(&delay::DELAY_SPEC, delay::delay_factory);
    registry.register(&delay::CHORUS_SPEC, delay::chorus_factory);
    registry.register(&reverb::SPEC, reverb::factory);
    registry.register(&compressor::SPEC, compressor::factory);
    registry.register(&sampler::SPEC, sampler::factory);
    registry.register(&sequencer::SPEC, sequencer::factory);
    registry.register(&arpeggiator::SPEC, arpeggiator::factory);
    registry.register(&keys::SPEC, keys::factory);
    registry.register(&storage::READER_SPEC, storage::reader_factory);
    registry.register(&storage::WRITER_SPEC, storage::writer_factory);
    registry.register(&output::SPEC, output::factory);
}

/// Gate threshold shared by every gate-driven node.
pub const GATE_THRESHOLD: f32 = 0.5;

/// Rising-edge detector holding the previous tick's gate per voice.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct GateEdges {
    previous: [bool; VOICES],
}

impl GateEdges {
    /// Returns, per voice, whether the gate rose on this tick.
    pub(crate) fn update(&mut self, gates: &Voices) -> [bool; VOICES] {
        let mut rising = [false; VOICES];
        for (voice, &gate) in gates.iter().enumerate() {
            let high = gate > GATE_THRESHOLD;
            rising[voice] = high && !self.previous[voice];
            self.previous[voice] = high;
        }
        rising
    }

    /// Single-voice variant; returns (rising, high).
    pub(crate) fn update_mono(&mut self, gate: f32) -> (bool, bool) {
        let high = gate > GATE_THRESHOLD;
        let rising = high && !self.previous[0];
        self.previous[0] = high;
        (rising, high)
    }

    pub(crate) fn reset(&mut self) {
        self.previous = [false; VOICES];
    }
}
