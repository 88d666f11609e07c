use crate::{
    dsp::{filter::MAX_CUTOFF_HZ, filter::MIN_CUTOFF_HZ, FilterMode, OnePole},
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    VOICES,
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Filter",
    category: Category::Effect,
    inputs: &["in", "cutoff"],
    outputs: &["out"],
    params: &[
        ParamSpec::options("mode", 0, FilterMode::NAMES),
        ParamSpec::range("cutoff", 1_000.0, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ),
        ParamSpec::range("in", 0.0, -1.0e6, 1.0e6),
    ],
};

pub struct FilterNode {
    poles: [OnePole; VOICES],
    // (cutoff, sample rate, coefficient) per voice
    coefficients: [(f32, f32, f32); VOICES],
}

pub fn factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(FilterNode {
        poles: [OnePole::new(); VOICES],
        coefficients: [(f32::NAN, 0.0, 0.0); VOICES],
    })
}

impl FilterNode {
    fn coefficient(&mut self, voice: usize, cutoff: f32, sample_rate: f32) -> f32 {
        let cached = &mut self.coefficients[voice];
        if cached.0 != cutoff || cached.1 != sample_rate {
            *cached = (cutoff, sample_rate, OnePole::coefficient(cutoff, sample_rate));
        }
        cached.2
    }
}

impl UnitGenerator for FilterNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let mode = FilterMode::from_index(io.params.index("mode"));
        let input = io.resolve("in");
        let cutoff = io.resolve("cutoff");

        let mut out = [0.0; VOICES];
        for voice in 0..VOICES {
            let coef = self.coefficient(voice, cutoff[voice], ctx.sample_rate);
            out[voice] = self.poles[voice].process(input[voice], coef, mode);
        }
        io.set_output(0, out);
    }

    fn reset(&mut self) {
        self.poles.iter_mut().for_each(OnePole::reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::harness::Harness;

    #[test]
    fn lowpass_settles_on_dc() {
        let mut h = Harness::new(&SPEC, factory, &[("cutoff", 500.0)], 48_000.0);
        h.feed_mono("in", 0.5);
        for _ in 0..2_000 {
            h.step();
        }
        assert!((h.next("out") - 0.5).abs() < 1e-4);
    }

    #[test]
    fn highpass_removes_dc() {
        let mut h = Harness::new(&SPEC, factory, &[("mode", 1.0), ("cutoff", 500.0)], 48_000.0);
        h.feed_mono("in", 0.5);
        let first = h.next("out");
        for _ in 0..2_000 {
            h.step();
        }
        assert!(first > 0.4);
        assert!(h.next("out").abs() < 1e-4);
    }

    #[test]
    fn wired_cutoff_is_clamped() {
        let mut h = Harness::new(&SPEC, factory, &[], 48_000.0);
        h.feed_mono("in", 1.0);
        h.feed_mono("cutoff", -50.0);
        let y = h.next("out");
        assert!(y.is_finite() && y > 0.0 && y < 0.01);
    }
}
