/*
Arpeggio index lookup
=====================

An arpeggiator walks an integer position counter p = 0, 1, 2, ... and maps
it onto an index into the stacked chord (n notes). The direction policy
decides the mapping:

    up       p mod n                       0 1 2 3 0 1 2 3
    down     n - 1 - (p mod n)             3 2 1 0 3 2 1 0
    updown   triangle with period 2n - 2   0 1 2 3 2 1 0 1
    random   uniform in [0, n)

updown does not repeat the top and bottom notes, so its period is 2n - 2
rather than 2n. With a single note every policy returns 0.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArpDirection {
    #[default]
    Up,
    Down,
    UpDown,
    Random,
}

impl ArpDirection {
    pub const NAMES: &'static [&'static str] = &["up", "down", "updown", "random"];

    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Down,
            2 => Self::UpDown,
            3 => Self::Random,
            _ => Self::Up,
        }
    }
}

/// Map `position` onto an index in `[0, len)`.
///
/// `rng` is only consulted for [`ArpDirection::Random`].
pub fn arp_index(position: u64, len: usize, direction: ArpDirection, rng: &mut fastrand::Rng) -> usize {
    if len <= 1 {
        return 0;
    }
    let n = len as u64;
    let index = match direction {
        ArpDirection::Up => position % n,
        ArpDirection::Down => n - 1 - position % n,
        ArpDirection::UpDown => {
            let period = 2 * n - 2;
            let p = position % period;
            if p < n {
                p
            } else {
                period - p
            }
        }
        ArpDirection::Random => return rng.usize(..len),
    };
    index as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(direction: ArpDirection, len: usize, steps: u64) -> Vec<usize> {
        let mut rng = fastrand::Rng::with_seed(3);
        (0..steps).map(|p| arp_index(p, len, direction, &mut rng)).collect()
    }

    #[test]
    fn up_and_down() {
        assert_eq!(walk(ArpDirection::Up, 4, 8), vec![0, 1, 2, 3, 0, 1, 2, 3]);
        assert_eq!(walk(ArpDirection::Down, 4, 8), vec![3, 2, 1, 0, 3, 2, 1, 0]);
    }

    #[test]
    fn updown_skips_repeated_ends() {
        assert_eq!(
            walk(ArpDirection::UpDown, 4, 10),
            vec![0, 1, 2, 3, 2, 1, 0, 1, 2, 3]
        );
        assert_eq!(walk(ArpDirection::UpDown, 2, 4), vec![0, 1, 0, 1]);
    }

    #[test]
    fn random_stays_in_range() {
        assert!(walk(ArpDirection::Random, 5, 200).iter().all(|&i| i < 5));
    }

    #[test]
    fn single_note_is_always_zero() {
        for index in 0..ArpDirection::NAMES.len() {
            let direction = ArpDirection::from_index(index);
            assert!(walk(direction, 1, 10).iter().all(|&i| i == 0));
            assert!(walk(direction, 0, 3).iter().all(|&i| i == 0));
        }
    }
}
