use crate::{
    dsp::SchroederReverb,
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Reverb",
    category: Category::Effect,
    inputs: &["in"],
    outputs: &["out"],
    params: &[
        ParamSpec::range("in", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("room", 0.5, 0.0, 1.0),
        ParamSpec::range("damping", 0.5, 0.0, 1.0),
        ParamSpec::range("mix", 0.3, 0.0, 1.0),
    ],
};

/// Mono Schroeder reverb on voice 0 with a dry/wet blend.
pub struct ReverbNode {
    reverb: SchroederReverb,
    room: f32,
    damping: f32,
}

pub fn factory(ctx: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    let room = ctx.params.value("room");
    let damping = ctx.params.value("damping");
    let mut reverb = SchroederReverb::new(ctx.sample_rate);
    reverb.set_room_size(room);
    reverb.set_damping(damping);
    Box::new(ReverbNode { reverb, room, damping })
}

impl UnitGenerator for ReverbNode {
    fn solve(&mut self, mut io: NodeIo<'_>, _: &mut SolveCtx<'_>) {
        let room = io.param("room");
        if room != self.room {
            self.reverb.set_room_size(room);
            self.room = room;
        }
        let damping = io.param("damping");
        if damping != self.damping {
            self.reverb.set_damping(damping);
            self.damping = damping;
        }

        let dry = io.resolve_mono("in");
        let wet = self.reverb.process(dry);
        let mix = io.param("mix");
        io.set_output_mono(0, dry * (1.0 - mix) + wet * mix);
    }

    fn reset(&mut self) {
        self.reverb.reset();
    }
}
