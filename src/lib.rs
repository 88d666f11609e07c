pub mod config;
pub mod dsp; // Per-sample unit generator kernels
pub mod engine; // Render thread and ring-buffer output
pub mod error;
pub mod graph; // Node/port/link model and the solve loop
pub mod nodes; // Node types built on the dsp kernels
pub mod samples;
pub mod sequencing; // Musical timing, chords and arpeggios

pub use config::EngineConfig;
pub use engine::AudioEngine;
pub use error::{GraphError, SampleError};
pub use graph::{LinkId, Node, NodeGraph, NodeId, NodeRegistry, SharedGraph};
pub use nodes::keys::{NoteEvent, NoteSender};
pub use samples::{Sample, SampleId, SampleLibrary};

/// Number of parallel voices carried by every port.
pub const VOICES: usize = 8;

/// Number of global storage slots shared by Reader and Writer nodes.
pub const STORAGE_SLOTS: usize = 16;

/// One value per voice.
pub type Voices = [f32; VOICES];
