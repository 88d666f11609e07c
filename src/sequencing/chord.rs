#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chord qualities as semitone offsets from the root.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chord {
    #[default]
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
    Major7,
    Minor7,
    Dominant7,
    Octave,
}

impl Chord {
    pub const NAMES: &'static [&'static str] = &[
        "major", "minor", "dim", "aug", "sus2", "sus4", "maj7", "min7", "dom7", "octave",
    ];

    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Minor,
            2 => Self::Diminished,
            3 => Self::Augmented,
            4 => Self::Sus2,
            5 => Self::Sus4,
            6 => Self::Major7,
            7 => Self::Minor7,
            8 => Self::Dominant7,
            9 => Self::Octave,
            _ => Self::Major,
        }
    }

    pub fn intervals(self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 4, 7],
            Self::Minor => &[0, 3, 7],
            Self::Diminished => &[0, 3, 6],
            Self::Augmented => &[0, 4, 8],
            Self::Sus2 => &[0, 2, 7],
            Self::Sus4 => &[0, 5, 7],
            Self::Major7 => &[0, 4, 7, 11],
            Self::Minor7 => &[0, 3, 7, 10],
            Self::Dominant7 => &[0, 4, 7, 10],
            Self::Octave => &[0],
        }
    }

    /// Number of notes when the chord is stacked over `octaves` octaves.
    pub fn span_len(self, octaves: usize) -> usize {
        self.intervals().len() * octaves.max(1)
    }

    /// Semitone offset of note `index` in the chord stacked over octaves.
    ///
    /// Index 0 is the root; indices past the last interval continue one
    /// octave higher.
    pub fn offset(self, index: usize) -> u32 {
        let intervals = self.intervals();
        let octave = (index / intervals.len()) as u32;
        intervals[index % intervals.len()] as u32 + 12 * octave
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_maps_to_a_chord() {
        for (index, _) in Chord::NAMES.iter().enumerate() {
            let chord = Chord::from_index(index);
            assert_eq!(chord.intervals()[0], 0, "{chord:?} must start on the root");
        }
        assert_eq!(Chord::from_index(Chord::NAMES.len() - 1), Chord::Octave);
    }

    #[test]
    fn offsets_stack_octaves() {
        let chord = Chord::Minor;
        let offsets: Vec<u32> = (0..chord.span_len(2)).map(|i| chord.offset(i)).collect();
        assert_eq!(offsets, vec![0, 3, 7, 12, 15, 19]);
    }
}
