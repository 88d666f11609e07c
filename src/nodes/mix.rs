use crate::{
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    VOICES,
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Mix",
    category: Category::Math,
    inputs: &["a", "b", "factor"],
    outputs: &["out"],
    params: &[
        ParamSpec::range("a", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("b", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("factor", 0.5, 0.0, 1.0),
    ],
};

/// Linear crossfade per voice: `a·(1 - factor) + b·factor`.
pub struct MixNode;

pub fn factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(MixNode)
}

impl UnitGenerator for MixNode {
    fn solve(&mut self, mut io: NodeIo<'_>, _: &mut SolveCtx<'_>) {
        let a = io.resolve("a");
        let b = io.resolve("b");
        let factor = io.resolve("factor");

        let mut out = [0.0; VOICES];
        for voice in 0..VOICES {
            let f = factor[voice].clamp(0.0, 1.0);
            out[voice] = a[voice] * (1.0 - f) + b[voice] * f;
        }
        io.set_output(0, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::harness::Harness;

    #[test]
    fn halfway_is_the_average() {
        let mut h = Harness::new(&SPEC, factory, &[], 44_100.0);
        h.feed_mono("a", 0.2);
        h.feed_mono("b", 0.8);
        assert!((h.next("out") - 0.5).abs() < 1e-6);
    }

    #[test]
    fn factor_extremes_select_one_side() {
        let mut h = Harness::new(&SPEC, factory, &[("a", 1.0), ("b", -1.0), ("factor", 0.0)], 44_100.0);
        assert_eq!(h.next("out"), 1.0);
        h.set("factor", 1.0);
        assert_eq!(h.next("out"), -1.0);

        // A wired factor outside [0, 1] is clamped
        h.feed_mono("factor", 7.0);
        assert_eq!(h.next("out"), -1.0);
    }

    #[test]
    fn voices_mix_independently() {
        let mut h = Harness::new(&SPEC, factory, &[("factor", 0.5)], 44_100.0);
        let mut a = [0.0; VOICES];
        a[3] = 2.0;
        h.feed("a", a);
        h.step();
        let out = h.out("out");
        assert_eq!(out[3], 1.0);
        assert_eq!(out[0], 0.0);
    }
}
