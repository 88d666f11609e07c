use crate::{
    dsp::{Oscillator, Waveform},
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    VOICES,
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Oscillator",
    category: Category::Source,
    inputs: &["frequency", "amplitude"],
    outputs: &["out", "mix"],
    params: &[
        ParamSpec::options("waveform", 0, Waveform::NAMES),
        ParamSpec::range("frequency", 440.0, 0.0, 20_000.0),
        ParamSpec::range("amplitude", 1.0, 0.0, 1.0),
        ParamSpec::range("pulse_width", 0.5, 0.01, 0.99),
    ],
};

/// One phase accumulator per voice.
///
/// With the frequency input wired, every voice whose frequency is above zero
/// sounds; unwired, only voice 0 plays the frequency knob. `mix` averages the
/// sounding voices.
pub struct OscillatorNode {
    voices: [Oscillator; VOICES],
}

pub fn factory(ctx: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(OscillatorNode {
        voices: core::array::from_fn(|voice| Oscillator::new(ctx.seed.wrapping_add(voice as u64))),
    })
}

impl UnitGenerator for OscillatorNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let waveform = Waveform::from_index(io.params.index("waveform"));
        let pulse_width = io.param("pulse_width");
        let polyphonic = io.is_connected("frequency");
        let frequency = io.resolve("frequency");
        let amplitude = io.resolve("amplitude");

        let mut out = [0.0; VOICES];
        let mut sum = 0.0;
        let mut active = 0;
        for voice in 0..VOICES {
            let sounding = if polyphonic {
                frequency[voice] > 0.0
            } else {
                voice == 0
            };
            if !sounding {
                continue;
            }
            let sample = self.voices[voice].next_sample(waveform, frequency[voice], ctx.sample_rate, pulse_width);
            out[voice] = sample * amplitude[voice];
            sum += out[voice];
            active += 1;
        }

        io.set_output(0, out);
        io.set_output_mono(1, if active > 0 { sum / active as f32 } else { 0.0 });
    }

    fn reset(&mut self) {
        self.voices.iter_mut().for_each(Oscillator::reset);
    }
}
