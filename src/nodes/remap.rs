use crate::{
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    VOICES,
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Remap",
    category: Category::Math,
    inputs: &["in"],
    outputs: &["out"],
    params: &[
        ParamSpec::range("in", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("in_min", -1.0, -1.0e6, 1.0e6),
        ParamSpec::range("in_max", 1.0, -1.0e6, 1.0e6),
        ParamSpec::range("out_min", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("out_max", 1.0, -1.0e6, 1.0e6),
        ParamSpec::toggle("clamp", false),
    ],
};

/// Map `[in_min, in_max]` linearly onto `[out_min, out_max]`.
///
/// A zero-width input range maps everything to `out_min`.
#[inline]
pub fn remap(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32, clamp: bool) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    let mut t = (x - in_min) / span;
    if clamp {
        t = t.clamp(0.0, 1.0);
    }
    out_min + t * (out_max - out_min)
}

pub struct RemapNode;

pub fn factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(RemapNode)
}

impl UnitGenerator for RemapNode {
    fn solve(&mut self, mut io: NodeIo<'_>, _: &mut SolveCtx<'_>) {
        let input = io.resolve("in");
        let in_min = io.param("in_min");
        let in_max = io.param("in_max");
        let out_min = io.param("out_min");
        let out_max = io.param("out_max");
        let clamp = io.params.flag("clamp");

        let mut out = [0.0; VOICES];
        for voice in 0..VOICES {
            out[voice] = remap(input[voice], in_min, in_max, out_min, out_max, clamp);
        }
        io.set_output(0, out);
    }
}
