//! Character spans and the comparison utilities the resolver and the
//! composition engine depend on.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A half-open character span `[start, end)` over the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span. Offsets are not validated here; `Document` does that.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in characters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for zero-width spans.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `other` lies entirely within `self` (equal spans subsume each other).
    #[must_use]
    pub const fn subsumes(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the two spans share at least one character.
    #[must_use]
    pub const fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True if `self` ends at or before `other` starts.
    #[must_use]
    pub const fn is_left_of(&self, other: &Span) -> bool {
        self.end <= other.start
    }

    /// Character gap between two spans; 0 when they overlap or touch.
    #[must_use]
    pub fn distance(&self, other: &Span) -> usize {
        if self.end <= other.start {
            other.start - self.end
        } else if other.end <= self.start {
            self.start - other.end
        } else {
            0
        }
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn union(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Smallest span covering every span in the iterator.
    pub fn covering<I: IntoIterator<Item = Span>>(spans: I) -> Option<Span> {
        spans.into_iter().reduce(|a, b| a.union(&b))
    }
}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Text order: earlier start first, then the longer span first.
impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.end.cmp(&self.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsumption() {
        let outer = Span::new(0, 20);
        let inner = Span::new(5, 10);
        assert!(outer.subsumes(&inner));
        assert!(!inner.subsumes(&outer));
        assert!(outer.subsumes(&outer));
    }

    #[test]
    fn test_overlap_and_order() {
        let a = Span::new(0, 4);
        let b = Span::new(4, 9);
        let c = Span::new(3, 6);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(a.is_left_of(&b));
        assert!(!b.is_left_of(&a));
        assert_eq!(a.distance(&b), 0);
        assert_eq!(a.distance(&Span::new(10, 12)), 6);
    }

    #[test]
    fn test_ordering_prefers_longer_at_same_start() {
        let mut spans = vec![Span::new(5, 6), Span::new(0, 3), Span::new(5, 10)];
        spans.sort();
        assert_eq!(spans, vec![Span::new(0, 3), Span::new(5, 10), Span::new(5, 6)]);
    }

    #[test]
    fn test_covering() {
        let spans = [Span::new(4, 8), Span::new(0, 2), Span::new(6, 12)];
        assert_eq!(Span::covering(spans), Some(Span::new(0, 12)));
        assert_eq!(Span::covering(Vec::<Span>::new()), None);
    }
}
