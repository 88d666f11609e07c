use crate::{
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    sequencing::{midi_to_freq, Duration, StepClock},
    VOICES,
};

/*
Step sequencer
==============

Up to eight note slots played one per sixteenth note (60 / bpm / 4 s). Each
step start hands its note to the next voice round-robin across `voices`
voices, so with polyphony above 1 the previous note can ring out through its
release while the next one starts.

    gate[v]       1 while v is the step's voice and progress < gate_length
    frequency[v]  pitch of the last note given to v (kept through the release)
    index         current slot, on every voice

A note of 0 is a rest: no gate, the voice keeps its previous pitch. A bpm
of 0 (parameter and input) follows the graph tempo.
*/

const NOTES: [&str; 8] = ["note0", "note1", "note2", "note3", "note4", "note5", "note6", "note7"];

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Sequencer",
    category: Category::Sequencing,
    inputs: &["bpm"],
    outputs: &["frequency", "gate", "index"],
    params: &[
        ParamSpec::integer("steps", 8, 1, 8),
        ParamSpec::range("bpm", 0.0, 0.0, 999.0),
        ParamSpec::range("gate_length", 0.5, 0.01, 1.0),
        ParamSpec::integer("voices", 1, 1, VOICES as i32),
        ParamSpec::integer("note0", 60, 0, 127),
        ParamSpec::integer("note1", 62, 0, 127),
        ParamSpec::integer("note2", 64, 0, 127),
        ParamSpec::integer("note3", 65, 0, 127),
        ParamSpec::integer("note4", 67, 0, 127),
        ParamSpec::integer("note5", 69, 0, 127),
        ParamSpec::integer("note6", 71, 0, 127),
        ParamSpec::integer("note7", 72, 0, 127),
    ],
};

pub struct SequencerNode {
    clock: StepClock,
    step_started: bool,
    next_voice: usize,
    voice: usize,
    note: u8,
    frequency: [f32; VOICES],
}

pub fn factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(SequencerNode::new())
}

impl SequencerNode {
    fn new() -> Self {
        Self {
            clock: StepClock::new(),
            step_started: true,
            next_voice: 0,
            voice: 0,
            note: 0,
            frequency: [0.0; VOICES],
        }
    }
}

impl UnitGenerator for SequencerNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let bpm = match io.resolve_mono("bpm") {
            bpm if bpm > 0.0 && bpm.is_finite() => bpm,
            _ => ctx.bpm,
        };
        let step_samples = Duration::SIXTEENTH.to_samples(bpm, ctx.sample_rate);
        let steps = io.params.index("steps").clamp(1, NOTES.len());
        let polyphony = io.params.index("voices").clamp(1, VOICES);
        let slot = (self.clock.step() % steps as u64) as usize;

        if self.step_started {
            self.step_started = false;
            self.note = io.params.index(NOTES[slot]) as u8;
            self.voice = self.next_voice % polyphony;
            self.next_voice = (self.voice + 1) % polyphony;
            if self.note > 0 {
                self.frequency[self.voice] = midi_to_freq(self.note as f32);
            }
        }

        let mut gate = [0.0; VOICES];
        if self.note > 0 && self.clock.progress(step_samples) < io.param("gate_length") as f64 {
            gate[self.voice] = 1.0;
        }

        io.set_output(0, self.frequency);
        io.set_output(1, gate);
        io.set_output_mono(2, slot as f32);

        if self.clock.tick(step_samples) {
            self.step_started = true;
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
