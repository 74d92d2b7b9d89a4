//! Event markers and the filtered event stream scanned by the segmenter.
//!
//! Filtering keeps only onset, offset and boundary events.  Dropping the
//! rest changes adjacency: the "previous" event of an offset is the
//! previous *kept* event, not the previous event in the recording.

/// Substring that marks a recording discontinuity.
pub const BOUNDARY: &str = "boundary";

/// One event marker: a label and its latency as a sample index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub label: String,
    pub latency: usize,
}

impl Event {
    pub fn new(label: impl Into<String>, latency: usize) -> Self {
        Self { label: label.into(), latency }
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.label.contains(BOUNDARY)
    }

    #[inline]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.label.contains(marker)
    }
}

/// Four consecutive events of the filtered stream, centred on `curr`.
///
/// `before` precedes `prev`, `after` follows `curr`.
#[derive(Debug, Clone, Copy)]
pub struct ScanWindow<'a> {
    pub before: &'a Event,
    pub prev: &'a Event,
    pub curr: &'a Event,
    pub after: &'a Event,
}

/// Ordered events restricted to onset, offset and boundary labels.
#[derive(Debug, Clone, Default)]
pub struct EventStream {
    events: Vec<Event>,
}

impl EventStream {
    /// Keep events whose label contains `onset`, `offset` or `"boundary"`,
    /// in their original order.
    pub fn from_events<'a, I>(events: I, onset: &str, offset: &str) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let events = events
            .into_iter()
            .filter(|e| e.has_marker(onset) || e.has_marker(offset) || e.is_boundary())
            .cloned()
            .collect();
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every window whose `curr` has two events before it and one after.
    ///
    /// For `n` events this yields `n - 3` windows (none when `n < 4`); the
    /// first two events and the last one are never `curr`.
    pub fn windows(&self) -> impl Iterator<Item = ScanWindow<'_>> + '_ {
        self.events.windows(4).map(|w| ScanWindow {
            before: &w[0],
            prev: &w[1],
            curr: &w[2],
            after: &w[3],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(labels: &[&str]) -> Vec<Event> {
        labels.iter().enumerate().map(|(i, l)| Event::new(*l, i * 100)).collect()
    }

    #[test]
    fn filter_drops_unrelated_events() {
        let raw = stream(&["S 1", "onset_a", "resp", "offset", "boundary", "junk"]);
        let s = EventStream::from_events(&raw, "onset", "offset");
        let labels: Vec<_> = s.events().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["onset_a", "offset", "boundary"]);
    }

    #[test]
    fn window_count_is_n_minus_three() {
        let raw = stream(&["onset", "offset", "onset", "offset", "onset", "offset"]);
        let s = EventStream::from_events(&raw, "onset", "offset");
        assert_eq!(s.windows().count(), 3);
        let first = s.windows().next().unwrap();
        assert_eq!(first.before.latency, 0);
        assert_eq!(first.curr.latency, 200);
        assert_eq!(first.after.latency, 300);
    }

    #[test]
    fn short_stream_has_no_windows() {
        let raw = stream(&["onset", "offset", "boundary"]);
        let s = EventStream::from_events(&raw, "onset", "offset");
        assert_eq!(s.windows().count(), 0);
    }

    #[test]
    fn boundary_is_substring_match() {
        assert!(Event::new("boundary_12", 0).is_boundary());
        assert!(!Event::new("Boundary", 0).is_boundary());
    }
}
