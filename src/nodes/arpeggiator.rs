use crate::{
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    nodes::GateEdges,
    sequencing::{arp_index, midi_to_freq, ArpDirection, Chord, Duration, StepClock},
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Arpeggiator",
    category: Category::Sequencing,
    inputs: &["note", "gate"],
    outputs: &["frequency", "gate", "index"],
    params: &[
        ParamSpec::integer("note", 60, 0, 127),
        ParamSpec::range("gate", 1.0, 0.0, 1.0),
        ParamSpec::options("chord", 0, Chord::NAMES),
        ParamSpec::integer("octaves", 1, 1, 4),
        ParamSpec::options("direction", 0, ArpDirection::NAMES),
        ParamSpec::range("bpm", 0.0, 0.0, 999.0),
        ParamSpec::options("division", 3, Duration::DIVISION_NAMES),
        ParamSpec::range("gate_length", 0.5, 0.01, 1.0),
    ],
};

/// Walks a chord built on `note` while the gate is held, one chord tone per
/// division. A rising gate restarts the pattern from its first tone.
/// Output is monophonic on voice 0.
pub struct ArpeggiatorNode {
    clock: StepClock,
    edges: GateEdges,
    rng: fastrand::Rng,
    seed: u64,
    position: u64,
    step_started: bool,
    index: usize,
    frequency: f32,
}

pub fn factory(ctx: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(ArpeggiatorNode {
        clock: StepClock::new(),
        edges: GateEdges::default(),
        rng: fastrand::Rng::with_seed(ctx.seed),
        seed: ctx.seed,
        position: 0,
        step_started: true,
        index: 0,
        frequency: 0.0,
    })
}

impl UnitGenerator for ArpeggiatorNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let (rising, held) = self.edges.update_mono(io.resolve_mono("gate"));
        if rising {
            self.clock.restart();
            self.position = 0;
            self.step_started = true;
        }

        if !held {
            io.set_output(0, [0.0; crate::VOICES]);
            io.set_output_mono(1, 0.0);
            io.set_output_mono(2, self.index as f32);
            return;
        }

        let bpm = match io.param("bpm") {
            bpm if bpm > 0.0 => bpm,
            _ => ctx.bpm,
        };
        let step_samples = Duration::division(io.params.index("division")).to_samples(bpm, ctx.sample_rate);

        if self.step_started {
            self.step_started = false;
            let chord = Chord::from_index(io.params.index("chord"));
            let direction = ArpDirection::from_index(io.params.index("direction"));
            let len = chord.span_len(io.params.index("octaves"));
            self.index = arp_index(self.position, len, direction, &mut self.rng);
            let root = io.resolve_mono("note").round();
            self.frequency = midi_to_freq(root + chord.offset(self.index) as f32);
        }

        let gate = self.clock.progress(step_samples) < io.param("gate_length") as f64;

        let mut frequency = [0.0; crate::VOICES];
        frequency[0] = self.frequency;
        io.set_output(0, frequency);
        let mut gates = [0.0; crate::VOICES];
        gates[0] = if gate { 1.0 } else { 0.0 };
        io.set_output(1, gates);
        io.set_output_mono(2, self.index as f32);

        if self.clock.tick(step_samples) {
            self.position += 1;
            self.step_started = true;
        }
    }

    fn reset(&mut self) {
        self.clock.restart();
        self.edges.reset();
        self.rng = fastrand::Rng::with_seed(self.seed);
        self.position = 0;
        self.step_started = true;
        self.index = 0;
        self.frequency = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::harness::Harness;

    // 1/16 at 120 bpm and 8 kHz: 1000 samples per tone
    const STEP: usize = 1_000;

    fn tones(h: &mut Harness, count: usize) -> Vec<f32> {
        let mut out = Vec::new();
        for _ in 0..count {
            out.push(h.next("index"));
            for _ in 1..STEP {
                h.step();
            }
        }
        out
    }

    #[test]
    fn walks_the_chord_up() {
        let mut h = Harness::new(&SPEC, factory, &[("bpm", 120.0)], 8_000.0);
        assert_eq!(tones(&mut h, 4), vec![0.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn updown_over_two_octaves() {
        let mut h = Harness::new(
            &SPEC,
            factory,
            &[("bpm", 120.0), ("direction", 2.0), ("octaves", 2.0)],
            8_000.0,
        );
        assert_eq!(
            tones(&mut h, 12),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn pitch_is_root_plus_interval() {
        let mut h = Harness::new(&SPEC, factory, &[("bpm", 120.0), ("chord", 1.0), ("note", 57.0)], 8_000.0);
        tones(&mut h, 1);
        // Second tone of A minor is C
        h.step();
        assert!((h.out("frequency")[0] - midi_to_freq(60.0)).abs() < 1e-3);
        assert_eq!(h.out("gate")[0], 1.0);
    }

    #[test]
    fn rising_gate_restarts() {
        let mut h = Harness::new(&SPEC, factory, &[("bpm", 120.0)], 8_000.0);
        h.feed_mono("gate", 1.0);
        tones(&mut h, 2);
        h.feed_mono("gate", 0.0);
        assert_eq!(h.next("gate"), 0.0);
        h.feed_mono("gate", 1.0);
        assert_eq!(tones(&mut h, 2), vec![0.0, 1.0]);
    }
}
