use crate::{
    dsp::Adsr,
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSet, ParamSpec, SolveCtx, UnitGenerator},
    nodes::GATE_THRESHOLD,
    VOICES,
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "ADSR",
    category: Category::Envelope,
    inputs: &["gate", "in"],
    outputs: &["out", "mix"],
    params: &[
        ParamSpec::range("gate", 0.0, 0.0, 1.0),
        ParamSpec::range("attack", 10.0, 0.0, 10_000.0),
        ParamSpec::range("decay", 100.0, 0.0, 10_000.0),
        ParamSpec::range("sustain", 0.7, 0.0, 1.0),
        ParamSpec::range("release", 200.0, 0.0, 10_000.0),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Shape {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,
    sample_rate: f32,
}

impl Shape {
    fn read(params: &ParamSet, sample_rate: f32) -> Self {
        Self {
            attack: params.value("attack"),
            decay: params.value("decay"),
            sustain: params.value("sustain"),
            release: params.value("release"),
            sample_rate,
        }
    }

    fn samples(&self, ms: f32) -> f32 {
        ms * 0.001 * self.sample_rate
    }

    fn apply(&self, env: &mut Adsr) {
        env.set_attack(self.samples(self.attack));
        env.set_decay(self.samples(self.decay));
        env.set_sustain(self.sustain);
        env.set_release(self.samples(self.release));
    }
}

/// Per-voice envelopes. A gate crossing 0.5 upward starts the attack, crossing
/// back down starts the release. With `in` wired the envelope scales it.
pub struct AdsrNode {
    envelopes: [Adsr; VOICES],
    held: [bool; VOICES],
    shape: Shape,
}

pub fn factory(ctx: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    let shape = Shape::read(ctx.params, ctx.sample_rate);
    let envelopes = core::array::from_fn(|_| {
        Adsr::new(
            shape.samples(shape.attack),
            shape.samples(shape.decay),
            shape.sustain,
            shape.samples(shape.release),
        )
    });
    Box::new(AdsrNode {
        envelopes,
        held: [false; VOICES],
        shape,
    })
}

impl UnitGenerator for AdsrNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let shape = Shape::read(io.params, ctx.sample_rate);
        if shape != self.shape {
            self.envelopes.iter_mut().for_each(|env| shape.apply(env));
            self.shape = shape;
        }

        let gate = io.resolve("gate");
        let scale = io.is_connected("in").then(|| io.resolve("in"));

        let mut out = [0.0; VOICES];
        let mut sum = 0.0;
        let mut active = 0;
        for voice in 0..VOICES {
            let high = gate[voice] > GATE_THRESHOLD;
            if high != self.held[voice] {
                self.envelopes[voice].gate(high);
                self.held[voice] = high;
            }

            let level = self.envelopes[voice].next_sample();
            out[voice] = match scale {
                Some(input) => input[voice] * level,
                None => level,
            };
            if self.envelopes[voice].is_active() {
                sum += out[voice];
                active += 1;
            }
        }

        io.set_output(0, out);
        io.set_output_mono(1, sum / active.max(1) as f32);
    }

    fn reset(&mut self) {
        self.envelopes.iter_mut().for_each(Adsr::reset);
        self.held = [false; VOICES];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::harness::Harness;

    #[test]
    fn instant_attack_and_release() {
        let mut h = Harness::new(&SPEC, factory, &[("attack", 0.0), ("release", 0.0)], 48_000.0);
        assert_eq!(h.next("out"), 0.0);
        h.feed_mono("gate", 1.0);
        assert_eq!(h.next("out"), 1.0);
        h.feed_mono("gate", 0.0);
        assert_eq!(h.next("out"), 0.0);
    }

    #[test]
    fn held_gate_settles_on_sustain() {
        let mut h = Harness::new(
            &SPEC,
            factory,
            &[("attack", 1.0), ("decay", 5.0), ("sustain", 0.4)],
            48_000.0,
        );
        h.set("gate", 1.0);
        for _ in 0..4_800 {
            h.step();
        }
        assert!((h.next("out") - 0.4).abs() < 1e-6);

        // Sustain edits are followed while held
        h.set("sustain", 0.6);
        assert!((h.next("out") - 0.6).abs() < 1e-6);
    }

    #[test]
    fn wired_input_is_scaled() {
        let mut h = Harness::new(&SPEC, factory, &[("attack", 0.0), ("decay", 0.0), ("sustain", 0.5)], 48_000.0);
        h.feed_mono("in", 0.8);
        h.feed_mono("gate", 1.0);
        h.step();
        h.step();
        assert!((h.out("out")[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn voices_gate_independently() {
        let mut h = Harness::new(&SPEC, factory, &[("attack", 0.0)], 48_000.0);
        let mut gates = [0.0; VOICES];
        gates[4] = 1.0;
        h.feed("gate", gates);
        h.step();
        let out = h.out("out");
        assert_eq!(out[4], 1.0);
        assert_eq!(out[0], 0.0);
        // Only voice 4 is active, so the mix is its level alone
        assert_eq!(h.out("mix")[0], 1.0);
    }
}
