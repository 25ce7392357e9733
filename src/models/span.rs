//! Time spans.
//!
//! # Time Model
//! All instants are epoch milliseconds. Local-calendar interpretation only
//! happens in [`snap`](crate::snap).

use serde::{Deserialize, Serialize};

use super::Task;

/// A closed time interval `[start_ms, end_ms]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    /// Interval start (ms).
    pub start_ms: i64,
    /// Interval end (ms).
    pub end_ms: i64,
}

impl Span {
    /// Creates a new span.
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Duration of this span (ms). Negative for an inverted span.
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether a timestamp falls within this span.
    #[inline]
    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms <= self.end_ms
    }

    /// Whether two spans share at least one instant.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_ms <= other.end_ms && other.start_ms <= self.end_ms
    }

    /// The same span moved by `delta_ms`, duration preserved.
    #[inline]
    pub fn shifted(&self, delta_ms: i64) -> Self {
        Self::new(
            self.start_ms.saturating_add(delta_ms),
            self.end_ms.saturating_add(delta_ms),
        )
    }

    /// This span with `end_ms` pushed out to at least `start_ms + min_duration_ms`.
    ///
    /// The start never moves.
    pub fn with_min_duration(&self, min_duration_ms: i64) -> Self {
        Self::new(
            self.start_ms,
            self.end_ms.max(self.start_ms.saturating_add(min_duration_ms)),
        )
    }

    /// Smallest span covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.start_ms.min(other.start_ms),
            self.end_ms.max(other.end_ms),
        )
    }
}

/// Overall time range of a task list: earliest start to latest end.
///
/// Tasks missing either instant are skipped. Returns `None` when no task has
/// a complete span.
pub fn time_range(tasks: &[Task]) -> Option<Span> {
    tasks
        .iter()
        .filter_map(Task::span)
        .reduce(|acc, span| acc.union(&span))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basics() {
        let s = Span::new(1000, 5000);
        assert_eq!(s.duration_ms(), 4000);
        assert!(s.contains(1000));
        assert!(s.contains(5000));
        assert!(!s.contains(5001));
    }

    #[test]
    fn test_span_overlaps() {
        let a = Span::new(0, 100);
        assert!(a.overlaps(&Span::new(100, 200)));
        assert!(a.overlaps(&Span::new(50, 60)));
        assert!(!a.overlaps(&Span::new(101, 200)));
    }

    #[test]
    fn test_span_shift_and_union() {
        let a = Span::new(0, 100).shifted(-50);
        assert_eq!(a, Span::new(-50, 50));
        assert_eq!(a.union(&Span::new(20, 300)), Span::new(-50, 300));
    }

    #[test]
    fn test_min_duration_extends_end() {
        assert_eq!(Span::new(100, 150).with_min_duration(100), Span::new(100, 200));
        assert_eq!(Span::new(100, 50).with_min_duration(100), Span::new(100, 200));
        assert_eq!(Span::new(100, 500).with_min_duration(100), Span::new(100, 500));
    }

    #[test]
    fn test_arithmetic_saturates_at_extremes() {
        let far = Span::new(i64::MAX - 10, i64::MAX);
        assert_eq!(far.shifted(100), Span::new(i64::MAX, i64::MAX));
        assert_eq!(far.with_min_duration(100), far);
        assert_eq!(Span::new(i64::MIN, 0).shifted(-1).start_ms, i64::MIN);
        assert_eq!(Span::new(i64::MIN, i64::MAX).duration_ms(), i64::MAX);
    }

    #[test]
    fn test_time_range() {
        let tasks = vec![
            Task::new("A").with_span(300, 400),
            Task::new("B").with_span(100, 200),
            Task::group("G"),
        ];
        assert_eq!(time_range(&tasks), Some(Span::new(100, 400)));
        assert_eq!(time_range(&[Task::group("G")]), None);
        assert_eq!(time_range(&[]), None);
    }
}
