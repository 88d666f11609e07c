use crate::{Voices, VOICES};

/// A named connection point carrying one value per voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Port {
    pub name: &'static str,
    pub voices: Voices,
    pub connected: bool,
}

impl Port {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            voices: [0.0; VOICES],
            connected: false,
        }
    }

    /// Voice 0, the mono view of the port.
    #[inline]
    pub fn value(&self) -> f32 {
        self.voices[0]
    }

    #[inline]
    pub fn fill(&mut self, value: f32) {
        self.voices = [value; VOICES];
    }

    pub fn clear(&mut self) {
        self.voices = [0.0; VOICES];
    }
}

pub(crate) fn ports(names: &[&'static str]) -> Vec<Port> {
    names.iter().map(|&name| Port::new(name)).collect()
}
