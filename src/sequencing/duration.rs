#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Musical note value as an exact fraction of a whole note.
///
/// Kept rational so dotted and tuplet values compose without drift; it only
/// becomes floating point when converted to seconds at a tempo.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub numerator: u32,
    pub denominator: u32,
}

impl Duration {
    pub const QUARTER: Duration = Duration::new(1, 4);
    pub const EIGHTH: Duration = Duration::new(1, 8);
    pub const SIXTEENTH: Duration = Duration::new(1, 16);
    pub const THIRTY_SECOND: Duration = Duration::new(1, 32);

    /// Step divisions offered by tempo-synced nodes, in option-list order.
    pub const DIVISIONS: [Duration; 6] = [
        Duration::QUARTER,
        Duration::EIGHTH,
        Duration::EIGHTH.triplet(),
        Duration::SIXTEENTH,
        Duration::SIXTEENTH.triplet(),
        Duration::THIRTY_SECOND,
    ];
    pub const DIVISION_NAMES: &'static [&'static str] = &["1/4", "1/8", "1/8t", "1/16", "1/16t", "1/32"];

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Duration {
            numerator,
            denominator,
        }
    }

    /// Division at `index` in [`Duration::DIVISIONS`], falling back to a sixteenth.
    pub fn division(index: usize) -> Self {
        Self::DIVISIONS
            .get(index)
            .copied()
            .unwrap_or(Duration::SIXTEENTH)
    }

    /// Multiply by 3/2.
    pub const fn dotted(self) -> Self {
        Duration::new(self.numerator * 3, self.denominator * 2)
    }

    /// Three in the time of two.
    pub const fn triplet(self) -> Self {
        Duration::new(self.numerator * 2, self.denominator * 3).reduce()
    }

    pub const fn reduce(self) -> Self {
        let gcd = const_gcd(self.numerator, self.denominator);
        if gcd == 0 {
            return self;
        }
        Duration::new(self.numerator / gcd, self.denominator / gcd)
    }

    /// Length in quarter-note beats.
    pub fn beats(&self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        4.0 * self.numerator as f64 / self.denominator as f64
    }

    /// Length in seconds at `bpm` quarter notes per minute.
    pub fn to_seconds(&self, bpm: f32) -> f64 {
        if bpm <= 0.0 || !bpm.is_finite() {
            return 0.0;
        }
        self.beats() * 60.0 / bpm as f64
    }

    /// Length in (fractional) samples.
    pub fn to_samples(&self, bpm: f32, sample_rate: f32) -> f64 {
        self.to_seconds(bpm) * sample_rate as f64
    }
}

const fn const_gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteenth_at_120_is_an_eighth_of_a_second() {
        assert_eq!(Duration::SIXTEENTH.to_seconds(120.0), 0.125);
        assert_eq!(Duration::SIXTEENTH.to_samples(120.0, 44_100.0), 5_512.5);
    }

    #[test]
    fn triplets_reduce() {
        // (1/8) * (2/3) = 1/12
        assert_eq!(Duration::EIGHTH.triplet(), Duration::new(1, 12));
        assert_eq!(Duration::QUARTER.dotted().reduce(), Duration::new(3, 8));
    }

    #[test]
    fn quarter_is_one_beat() {
        assert_eq!(Duration::QUARTER.beats(), 1.0);
        assert_eq!(Duration::QUARTER.to_seconds(60.0), 1.0);
    }

    #[test]
    fn division_lookup_falls_back() {
        assert_eq!(Duration::division(0), Duration::QUARTER);
        assert_eq!(Duration::division(99), Duration::SIXTEENTH);
        assert_eq!(Duration::DIVISIONS.len(), Duration::DIVISION_NAMES.len());
    }

    #[test]
    fn degenerate_tempo_is_zero_length() {
        assert_eq!(Duration::QUARTER.to_seconds(0.0), 0.0);
        assert_eq!(Duration::QUARTER.to_seconds(f32::NAN), 0.0);
    }

    #[test]
    fn const_evaluation() {
        const DOTTED_EIGHTH_TRIPLET: Duration = Duration::EIGHTH.dotted().triplet();
        assert_eq!(DOTTED_EIGHTH_TRIPLET, Duration::EIGHTH);
    }
}
