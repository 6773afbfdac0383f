//! Dense ordering plans for per-category lists.
//!
//! A move of one item from `from` to `to` displaces exactly the items in the
//! half-open range between the two slots by one step towards `from`. The plan
//! is computed here and executed by the repository as one range update plus
//! one point update.

use std::ops::RangeInclusive;

/// Range shift implied by moving one item between two distinct slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionShift {
    from: u32,
    to: u32,
}

impl PositionShift {
    /// Builds the plan for a move. Returns `None` when `from == to`.
    pub fn between(from: u32, to: u32) -> Option<Self> {
        if from == to {
            None
        } else {
            Some(Self { from, to })
        }
    }

    pub fn from(&self) -> u32 {
        self.from
    }

    pub fn to(&self) -> u32 {
        self.to
    }

    /// Slots whose other occupants move by [`PositionShift::delta`].
    ///
    /// - Moving up (`to > from`): `(from, to]`.
    /// - Moving down (`to < from`): `[to, from)`.
    pub fn displaced_range(&self) -> RangeInclusive<u32> {
        if self.to > self.from {
            (self.from + 1)..=self.to
        } else {
            self.to..=(self.from - 1)
        }
    }

    /// Step applied to every displaced item.
    pub fn delta(&self) -> i64 {
        if self.to > self.from {
            -1
        } else {
            1
        }
    }

    /// Returns where an item currently at `position` ends up, for items other
    /// than the moved one.
    pub fn displaced_position(&self, position: u32) -> u32 {
        if !self.displaced_range().contains(&position) {
            return position;
        }
        if self.delta() < 0 {
            position - 1
        } else {
            position + 1
        }
    }
}

/// Returns whether `positions` is exactly `{0, 1, ..., len-1}`.
pub fn is_dense(positions: impl IntoIterator<Item = u32>) -> bool {
    let mut sorted: Vec<u32> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, position)| u32::try_from(index).map_or(false, |i| i == *position))
}

#[cfg(test)]
mod tests {
    use super::{is_dense, PositionShift};

    #[test]
    fn same_slot_has_no_plan() {
        assert_eq!(PositionShift::between(3, 3), None);
    }

    #[test]
    fn moving_up_pulls_following_items_back() {
        let shift = PositionShift::between(2, 5).unwrap();
        assert_eq!(shift.displaced_range(), 3..=5);
        assert_eq!(shift.delta(), -1);
        let moved: Vec<u32> = [0, 1, 3, 4, 5]
            .into_iter()
            .map(|p| shift.displaced_position(p))
            .collect();
        assert_eq!(moved, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn moving_down_pushes_preceding_items_forward() {
        let shift = PositionShift::between(4, 1).unwrap();
        assert_eq!(shift.displaced_range(), 1..=3);
        assert_eq!(shift.delta(), 1);
        let moved: Vec<u32> = [0, 1, 2, 3, 5]
            .into_iter()
            .map(|p| shift.displaced_position(p))
            .collect();
        assert_eq!(moved, vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn dense_check_detects_gaps_and_duplicates() {
        assert!(is_dense([2, 0, 1]));
        assert!(is_dense(Vec::<u32>::new()));
        assert!(!is_dense([0, 2]));
        assert!(!is_dense([0, 1, 1]));
    }
}
