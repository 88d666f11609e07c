pub mod arpeggio;
pub mod chord;
pub mod clock;
pub mod duration;
pub mod pitch;

pub use arpeggio::{arp_index, ArpDirection};
pub use chord::Chord;
pub use clock::StepClock;
pub use duration::Duration;
pub use pitch::{freq_to_midi, midi_to_freq};
