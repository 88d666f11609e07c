use crate::{
    dsp::{Compressor, CompressorSettings},
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSet, ParamSpec, SolveCtx, UnitGenerator},
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Compressor",
    category: Category::Effect,
    inputs: &["in"],
    outputs: &["out", "reduction"],
    params: &[
        ParamSpec::range("in", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("threshold", -24.0, -100.0, 0.0),
        ParamSpec::range("knee", 30.0, 0.0, 40.0),
        ParamSpec::range("ratio", 12.0, 1.0, 20.0),
        ParamSpec::range("attack", 3.0, 0.0, 1_000.0),
        ParamSpec::range("release", 250.0, 0.0, 1_000.0),
        ParamSpec::range("pre_delay", 6.0, 0.0, 20.0),
        ParamSpec::range("makeup", 0.0, -24.0, 24.0),
        ParamSpec::range("mix", 1.0, 0.0, 1.0),
    ],
};

/// Times are exposed in milliseconds.
fn settings_from(params: &ParamSet) -> CompressorSettings {
    CompressorSettings {
        threshold_db: params.value("threshold"),
        knee_db: params.value("knee"),
        ratio: params.value("ratio"),
        attack: params.value("attack") * 0.001,
        release: params.value("release") * 0.001,
        pre_delay: params.value("pre_delay") * 0.001,
        makeup_db: params.value("makeup"),
        blend: params.value("mix"),
        ..CompressorSettings::default()
    }
}

pub struct CompressorNode {
    compressor: Compressor,
}

pub fn factory(ctx: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(CompressorNode {
        compressor: Compressor::new(ctx.sample_rate, settings_from(ctx.params)),
    })
}

impl UnitGenerator for CompressorNode {
    fn solve(&mut self, mut io: NodeIo<'_>, _: &mut SolveCtx<'_>) {
        let settings = settings_from(io.params).sanitized();
        if settings != *self.compressor.settings() {
            self.compressor.set_settings(settings);
        }

        let out = self.compressor.process(io.resolve_mono("in"));
        io.set_output_mono(0, out);
        io.set_output_mono(1, self.compressor.reduction_db());
    }

    fn reset(&mut self) {
        self.compressor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::harness::Harness;

    fn sine(n: usize, amplitude: f32) -> f32 {
        amplitude * (n as f32 * std::f32::consts::TAU * 220.0 / 44_100.0).sin()
    }

    fn peak_after(h: &mut Harness, amplitude: f32, settle: usize) -> f32 {
        let mut peak = 0.0f32;
        for n in 0..settle + 4_410 {
            h.feed_mono("in", sine(n, amplitude));
            let y = h.next("out");
            if n >= settle {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn loud_input_is_reduced() {
        let mut h = Harness::new(&SPEC, factory, &[], 44_100.0);
        let peak = peak_after(&mut h, 1.0, 22_050);
        assert!(peak < 1.0, "peak {peak}");
        assert!(h.out("reduction")[0] < 0.0);
    }

    #[test]
    fn dry_mix_is_only_delayed() {
        let mut h = Harness::new(&SPEC, factory, &[("mix", 0.0), ("pre_delay", 0.0)], 44_100.0);
        let peak = peak_after(&mut h, 0.5, 4_410);
        assert!((peak - 0.5).abs() < 0.01, "peak {peak}");
    }
}
