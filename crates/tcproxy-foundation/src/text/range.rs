//! Text range used for selection and composition.
//!
//! Indices are UTF-16 code units, the unit the remote proxy and the platform
//! input framework agree on. See [`super::utf16`] for the conversions.

use std::ops::Sub;

/// A half-open interval `[start, start + length)` in a text buffer.
///
/// A zero-length range is a caret position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct TextRange {
    pub start: usize,
    pub length: usize,
}

impl TextRange {
    pub const EMPTY: TextRange = TextRange {
        start: 0,
        length: 0,
    };

    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Collapsed range (caret) at `position`.
    pub const fn cursor(position: usize) -> Self {
        Self {
            start: position,
            length: 0,
        }
    }

    /// Range between two offsets given in either order.
    pub fn from_bounds(a: usize, b: usize) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start,
            length: end - start,
        }
    }

    /// Saturates instead of overflowing for ranges built from raw fields.
    pub const fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Clamps both bounds into `[0, max]`.
    pub fn coerce_in(&self, max: usize) -> Self {
        Self::from_bounds(self.start.min(max), self.end().min(max))
    }

    /// This range as it reads after the text covered by `removed` is deleted.
    ///
    /// The part of `self` before `removed` keeps its position, the part after
    /// shifts left by `removed.length`, and the overlap disappears.
    pub fn subtract(self, removed: TextRange) -> TextRange {
        let (s1, e1) = (self.start, self.end());
        let (s2, e2) = (removed.start, removed.end());
        let start = if s1 < s2 {
            s1
        } else {
            s1.max(e2) - removed.length
        };
        let length = e1.min(s2).saturating_sub(s1) + e1.saturating_sub(s1.max(e2));
        TextRange { start, length }
    }
}

impl Sub for TextRange {
    type Output = TextRange;

    fn sub(self, removed: TextRange) -> TextRange {
        self.subtract(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bounds_normalises_order() {
        assert_eq!(TextRange::from_bounds(5, 2), TextRange::new(2, 3));
        assert_eq!(TextRange::from_bounds(2, 5), TextRange::new(2, 3));
        assert_eq!(TextRange::from_bounds(4, 4), TextRange::cursor(4));
    }

    #[test]
    fn coerce_in_clamps_both_edges() {
        assert_eq!(TextRange::new(3, 10).coerce_in(5), TextRange::new(3, 2));
        assert_eq!(TextRange::new(8, 2).coerce_in(5), TextRange::cursor(5));
    }

    #[test]
    fn end_saturates_for_huge_ranges() {
        let huge = TextRange::new(usize::MAX - 1, 10);
        assert_eq!(huge.end(), usize::MAX);
        assert_eq!(huge.coerce_in(3), TextRange::cursor(3));
    }

    #[test]
    fn subtract_before_shifts_left() {
        let a = TextRange::new(6, 2);
        assert_eq!(a - TextRange::new(1, 3), TextRange::new(3, 2));
    }

    #[test]
    fn subtract_after_leaves_unchanged() {
        let a = TextRange::new(1, 2);
        assert_eq!(a - TextRange::new(5, 4), a);
    }

    #[test]
    fn subtract_covering_collapses() {
        let a = TextRange::new(3, 2);
        assert_eq!(a - TextRange::new(2, 5), TextRange::cursor(2));
    }

    #[test]
    fn subtract_partial_overlaps() {
        // [2,6) minus [4,8) keeps [2,4)
        assert_eq!(TextRange::new(2, 4) - TextRange::new(4, 4), TextRange::new(2, 2));
        // [4,8) minus [2,6) keeps [6,8), shifted to [2,4)
        assert_eq!(TextRange::new(4, 4) - TextRange::new(2, 4), TextRange::new(2, 2));
        // [2,8) minus [4,6) keeps both flanks, joined
        assert_eq!(TextRange::new(2, 6) - TextRange::new(4, 2), TextRange::new(2, 4));
    }

    #[test]
    fn subtract_empty_is_identity() {
        for start in 0..6 {
            for length in 0..4 {
                let a = TextRange::new(start, length);
                for at in 0..10 {
                    assert_eq!(a - TextRange::cursor(at), a);
                }
            }
        }
    }

    #[test]
    fn subtract_never_grows() {
        for s1 in 0..6 {
            for l1 in 0..5 {
                for s2 in 0..6 {
                    for l2 in 0..5 {
                        let a = TextRange::new(s1, l1);
                        let b = TextRange::new(s2, l2);
                        assert!((a - b).length <= a.length, "{a:?} - {b:?}");
                    }
                }
            }
        }
    }
}
