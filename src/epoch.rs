//! Event-delimited epoching.
//!
//! Walks the filtered event stream (see [`EventStream`]) in windows of four
//! events `(before, prev, curr, after)`.  A window is a trial when `prev`
//! carries the onset marker and `curr` the offset marker.  Trials whose
//! onset follows a boundary, or whose offset precedes one, by no more than
//! `min_boundary_distance` samples are rejected.  Accepted trials are cut
//! from the continuous [C, T] recording with `buffer` samples of context on
//! each side.
//!
//! The scan advances one event at a time regardless of the verdict, so
//! epochs come out in latency order and nested markers are not merged.
use ndarray::{s, Array2};

use crate::config::SegmentConfig;
use crate::error::{Result, StimError};
use crate::events::{Event, EventStream, ScanWindow};

/// One trial cut from the recording.
#[derive(Debug, Clone)]
pub struct Epoch {
    /// [C, offset - onset + 2·buffer + 1] slice of the recording.
    pub samples: Array2<f32>,
    /// Label of the onset event.
    pub type_label: String,
    /// Onset latency in recording samples.
    pub onset: usize,
    /// Offset latency in recording samples.
    pub offset: usize,
}

impl Epoch {
    #[inline]
    pub fn width(&self) -> usize {
        self.samples.ncols()
    }
}

/// Tally of scan windows by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpochCounts {
    pub added: usize,
    pub invalid: usize,
    pub rejected_near_boundary: usize,
}

impl EpochCounts {
    /// Total windows examined.
    pub fn examined(&self) -> usize {
        self.added + self.invalid + self.rejected_near_boundary
    }

    fn record(mut self, verdict: &WindowVerdict) -> Self {
        match verdict {
            WindowVerdict::Accept => self.added += 1,
            WindowVerdict::Incomplete => self.invalid += 1,
            WindowVerdict::NearBoundary => self.rejected_near_boundary += 1,
        }
        self
    }
}

/// Outcome of one scan window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowVerdict {
    Accept,
    /// `prev`/`curr` are not an onset→offset pair.
    Incomplete,
    /// A complete pair sits too close to an adjacent boundary.
    NearBoundary,
}

/// Classify a window.  Boundary distance is only inspected for complete
/// pairs, and only against the nearest boundary on each side.
pub fn classify(w: &ScanWindow<'_>, cfg: &SegmentConfig) -> WindowVerdict {
    if !(w.curr.has_marker(&cfg.offset_marker) && w.prev.has_marker(&cfg.onset_marker)) {
        return WindowVerdict::Incomplete;
    }

    let min = cfg.min_boundary_distance;
    let far_before = !w.before.is_boundary() || distance(w.before, w.prev) > min;
    let far_after = !w.after.is_boundary() || distance(w.curr, w.after) > min;

    if far_before && far_after {
        WindowVerdict::Accept
    } else {
        WindowVerdict::NearBoundary
    }
}

/// `later.latency - earlier.latency`, zero if the events are out of order.
#[inline]
fn distance(earlier: &Event, later: &Event) -> usize {
    later.latency.saturating_sub(earlier.latency)
}

/// Segment `recording` ([C, T]) into trial epochs.
///
/// Returns the accepted epochs in scan order together with the window
/// tally.  Any accepted trial whose buffered range leaves the recording
/// aborts the whole run with [`StimError::OutOfRange`].
pub fn segment(
    events: &[Event],
    recording: &Array2<f32>,
    cfg: &SegmentConfig,
) -> Result<(Vec<Epoch>, EpochCounts)> {
    cfg.validate()?;

    let stream = EventStream::from_events(events, &cfg.onset_marker, &cfg.offset_marker);
    log::debug!(
        "segment: {} of {} events kept after marker filter",
        stream.len(),
        events.len()
    );

    let mut epochs = Vec::new();
    let counts = stream.windows().try_fold(EpochCounts::default(), |counts, w| -> Result<_> {
        let verdict = classify(&w, cfg);
        match verdict {
            WindowVerdict::Accept => {
                epochs.push(cut_epoch(recording, w.prev, w.curr, cfg.buffer)?);
            }
            WindowVerdict::NearBoundary => log::debug!(
                "trial {}@{} .. {}@{} rejected: boundary within {} samples",
                w.prev.label,
                w.prev.latency,
                w.curr.label,
                w.curr.latency,
                cfg.min_boundary_distance
            ),
            WindowVerdict::Incomplete => {}
        }
        Ok(counts.record(&verdict))
    })?;

    log::info!(
        "segment: {} added, {} invalid, {} rejected near boundary",
        counts.added,
        counts.invalid,
        counts.rejected_near_boundary
    );
    Ok((epochs, counts))
}

/// Slice `[onset - buffer, offset + buffer]` (inclusive) out of `recording`.
fn cut_epoch(recording: &Array2<f32>, onset: &Event, offset: &Event, buffer: usize) -> Result<Epoch> {
    let n_times = recording.ncols();
    let start = onset.latency as i64 - buffer as i64;
    let end = offset.latency + buffer;

    if start < 0 || end >= n_times || offset.latency < onset.latency {
        return Err(StimError::OutOfRange { start, end, n_times });
    }
    let start = start as usize;

    Ok(Epoch {
        samples: recording.slice(s![.., start..=end]).to_owned(),
        type_label: onset.label.clone(),
        onset: onset.latency,
        offset: offset.latency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(label: &str, latency: usize) -> Event {
        Event::new(label, latency)
    }

    fn cfg(min: usize) -> SegmentConfig {
        SegmentConfig { min_boundary_distance: min, ..SegmentConfig::default() }
    }

    fn window<'a>(e: &'a [Event; 4]) -> ScanWindow<'a> {
        ScanWindow { before: &e[0], prev: &e[1], curr: &e[2], after: &e[3] }
    }

    #[test]
    fn incomplete_pair_skips_boundary_check() {
        let e = [ev("boundary", 0), ev("offset", 1), ev("offset", 2), ev("boundary", 3)];
        assert_eq!(classify(&window(&e), &cfg(50)), WindowVerdict::Incomplete);
    }

    #[test]
    fn boundary_between_onset_and_offset_is_incomplete() {
        let e = [ev("onset", 0), ev("boundary", 100), ev("offset", 200), ev("onset", 900)];
        assert_eq!(classify(&window(&e), &cfg(10)), WindowVerdict::Incomplete);
    }

    #[test]
    fn distance_equal_to_minimum_is_rejected() {
        let e = [ev("boundary", 1000), ev("onset", 1050), ev("offset", 1300), ev("onset", 2000)];
        assert_eq!(classify(&window(&e), &cfg(50)), WindowVerdict::NearBoundary);
        assert_eq!(classify(&window(&e), &cfg(49)), WindowVerdict::Accept);
    }

    #[test]
    fn trailing_boundary_checked_independently() {
        let e = [ev("boundary", 0), ev("onset", 1000), ev("offset", 1300), ev("boundary", 1330)];
        assert_eq!(classify(&window(&e), &cfg(30)), WindowVerdict::NearBoundary);
        assert_eq!(classify(&window(&e), &cfg(29)), WindowVerdict::Accept);
    }

    #[test]
    fn non_boundary_neighbours_are_ignored() {
        let e = [ev("offset", 999), ev("onset", 1000), ev("offset", 1001), ev("onset", 1002)];
        assert_eq!(classify(&window(&e), &cfg(500)), WindowVerdict::Accept);
    }

    #[test]
    fn cut_epoch_width_and_label() {
        let rec = Array2::from_shape_fn((3, 1000), |(c, t)| (c * 1000 + t) as f32);
        let ep = cut_epoch(&rec, &ev("onset/7", 300), &ev("offset", 400), 200).unwrap();
        assert_eq!(ep.samples.dim(), (3, 501));
        assert_eq!(ep.type_label, "onset/7");
        assert_eq!(ep.samples[[0, 0]], 100.0);
        assert_eq!(ep.samples[[2, 500]], 2600.0);
    }

    #[test]
    fn cut_epoch_out_of_range_is_fatal() {
        let rec = Array2::<f32>::zeros((1, 600));
        let err = cut_epoch(&rec, &ev("onset", 150), &ev("offset", 300), 200).unwrap_err();
        assert_eq!(err, StimError::OutOfRange { start: -50, end: 500, n_times: 600 });
        assert!(cut_epoch(&rec, &ev("onset", 200), &ev("offset", 400), 200).is_err());
        assert!(cut_epoch(&rec, &ev("onset", 200), &ev("offset", 399), 200).is_ok());
    }
}
