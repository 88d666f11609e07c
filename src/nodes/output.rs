use crate::{
    dsp::{DcBlocker, EnvelopeFollower},
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Output",
    category: Category::Output,
    inputs: &["in"],
    outputs: &["out"],
    params: &[
        ParamSpec::range("in", 0.0, -1.0, 1.0),
        ParamSpec::range("gain", 1.0, 0.0, 2.0),
        ParamSpec::toggle("dc_block", true),
        ParamSpec::toggle("normalize", true),
    ],
};

/// Final stage before the device: DC removal and loudness normalisation on
/// voice 0, then gain and a hard clip to [-1, 1]. Either stage can be
/// switched off for a raw signal.
///
/// Non-finite input is passed on untouched so the graph can substitute its
/// last valid sample; the filters never see it.
pub struct OutputNode {
    dc: DcBlocker,
    follower: EnvelopeFollower,
}

pub fn factory(ctx: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(OutputNode {
        dc: DcBlocker::new(ctx.sample_rate),
        follower: EnvelopeFollower::new(ctx.sample_rate),
    })
}

impl UnitGenerator for OutputNode {
    fn solve(&mut self, mut io: NodeIo<'_>, _: &mut SolveCtx<'_>) {
        let mut x = io.resolve_mono("in");
        if !x.is_finite() {
            io.set_output_mono(0, x);
            return;
        }

        if io.params.flag("dc_block") {
            x = self.dc.process(x);
        }
        if io.params.flag("normalize") {
            x = self.follower.normalize(x);
        }
        io.set_output_mono(0, (x * io.param("gain")).clamp(-1.0, 1.0));
    }

    fn reset(&mut self) {
        self.dc.reset();
        self.follower.reset();
    }
}
