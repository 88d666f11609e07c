use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, SolveCtx, UnitGenerator},
    sequencing::midi_to_freq,
    VOICES,
};

/// Pending note events a Keys node can buffer between ticks.
pub const NOTE_QUEUE_CAPACITY: usize = 64;

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Keys",
    category: Category::Sequencing,
    inputs: &[],
    outputs: &["frequency", "gate", "velocity", "note"],
    params: &[],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    On { note: u8, velocity: u8 },
    Off { note: u8 },
    AllOff,
}

/// Sending half of a Keys node's note queue. Usable from any thread without
/// taking the graph lock.
pub struct NoteSender {
    producer: Producer<NoteEvent>,
}

impl NoteSender {
    /// Returns `false` when the queue is full and the event was dropped.
    pub fn send(&mut self, event: NoteEvent) -> bool {
        self.producer.push(event).is_ok()
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) -> bool {
        self.send(NoteEvent::On {
            note: note.min(127),
            velocity: velocity.min(127),
        })
    }

    pub fn note_off(&mut self, note: u8) -> bool {
        self.send(NoteEvent::Off { note: note.min(127) })
    }

    pub fn all_notes_off(&mut self) -> bool {
        self.send(NoteEvent::AllOff)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct KeyVoice {
    note: u8,
    velocity: f32,
    held: bool,
    // Gate drops for one tick when a held voice is reassigned
    retrigger: bool,
    started: u64,
}

pub struct KeysNode {
    events: Consumer<NoteEvent>,
    sender: Option<NoteSender>,
    voices: [KeyVoice; VOICES],
    cursor: usize,
    counter: u64,
}

pub fn factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    let (producer, events) = RingBuffer::new(NOTE_QUEUE_CAPACITY);
    Box::new(KeysNode {
        events,
        sender: Some(NoteSender { producer }),
        voices: [KeyVoice::default(); VOICES],
        cursor: 0,
        counter: 0,
    })
}

impl KeysNode {
    /// Next free voice at or after the cursor, otherwise the oldest held one.
    fn allocate(&self) -> usize {
        (0..VOICES)
            .map(|offset| (self.cursor + offset) % VOICES)
            .find(|&voice| !self.voices[voice].held)
            .unwrap_or_else(|| {
                (0..VOICES)
                    .min_by_key(|&voice| self.voices[voice].started)
                    .unwrap_or(0)
            })
    }

    fn apply(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::On { note, velocity } => {
                let voice = self
                    .voices
                    .iter()
                    .position(|v| v.held && v.note == note)
                    .unwrap_or_else(|| self.allocate());
                self.counter += 1;
                let retrigger = self.voices[voice].held;
                self.voices[voice] = KeyVoice {
                    note,
                    velocity: velocity as f32 / 127.0,
                    held: true,
                    retrigger,
                    started: self.counter,
                };
                self.cursor = (voice + 1) % VOICES;
            }
            NoteEvent::Off { note } => {
                for voice in self.voices.iter_mut().filter(|v| v.held && v.note == note) {
                    voice.held = false;
                }
            }
            NoteEvent::AllOff => {
                for voice in &mut self.voices {
                    voice.held = false;
                }
            }
        }
    }
}

impl UnitGenerator for KeysNode {
    fn solve(&mut self, mut io: NodeIo<'_>, _: &mut SolveCtx<'_>) {
        while let Ok(event) = self.events.pop() {
            self.apply(event);
        }

        let mut frequency = [0.0; VOICES];
        let mut gate = [0.0; VOICES];
        let mut velocity = [0.0; VOICES];
        let mut note = [0.0; VOICES];
        for (i, voice) in self.voices.iter_mut().enumerate() {
            if voice.started == 0 {
                continue;
            }
            frequency[i] = midi_to_freq(voice.note as f32);
            note[i] = voice.note as f32;
            velocity[i] = voice.velocity;
            if voice.held && !voice.retrigger {
                gate[i] = 1.0;
            }
            voice.retrigger = false;
        }

        io.set_output(0, frequency);
        io.set_output(1, gate);
        io.set_output(2, velocity);
        io.set_output(3, note);
    }

    fn reset(&mut self) {
        while self.events.pop().is_ok() {}
        self.voices = [KeyVoice::default(); VOICES];
        self.cursor = 0;
        self.counter = 0;
    }

    fn take_note_sender(&mut self) -> Option<NoteSender> {
        self.sender.take()
    }
}
