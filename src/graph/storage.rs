use crate::{Voices, STORAGE_SLOTS, VOICES};

/// Graph-owned global slots shared by Reader and Writer nodes.
///
/// Out-of-range slots read as silence and ignore writes.
#[derive(Debug, Clone)]
pub struct Storage {
    slots: [Voices; STORAGE_SLOTS],
}

impl Storage {
    pub fn new() -> Self {
        Self {
            slots: [[0.0; VOICES]; STORAGE_SLOTS],
        }
    }

    #[inline]
    pub fn read(&self, slot: usize) -> Voices {
        self.slots.get(slot).copied().unwrap_or([0.0; VOICES])
    }

    /// Returns `false` when `slot` is out of range.
    #[inline]
    pub fn write(&mut self, slot: usize, voices: Voices) -> bool {
        match self.slots.get_mut(slot) {
            Some(target) => {
                *target = voices;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots = [[0.0; VOICES]; STORAGE_SLOTS];
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_checked() {
        let mut storage = Storage::new();
        assert!(storage.write(3, [0.5; VOICES]));
        assert_eq!(storage.read(3), [0.5; VOICES]);
        assert!(!storage.write(STORAGE_SLOTS, [1.0; VOICES]));
        assert_eq!(storage.read(STORAGE_SLOTS), [0.0; VOICES]);
    }
}
