//! Segmentation and matching configuration.
//!
//! [`SegmentConfig`] drives the epoch segmenter and [`MatchConfig`] the
//! stimulus matcher.  Both are plain structs with `pub` fields so callers
//! can override single values with struct-update syntax.
use crate::error::{Result, StimError};

/// Configuration for [`segment`](crate::epoch::segment).
///
/// ```
/// use eegstim::SegmentConfig;
///
/// let cfg = SegmentConfig {
///     onset_marker:  "S 10".into(),
///     offset_marker: "S 20".into(),
///     ..SegmentConfig::default()
/// };
/// assert_eq!(cfg.buffer, 200);
/// ```
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Substring identifying a trial-onset event label.
    ///
    /// Default: `"onset"`.
    pub onset_marker: String,

    /// Substring identifying a trial-offset event label.
    ///
    /// Default: `"offset"`.
    pub offset_marker: String,

    /// Minimum distance in samples between a trial and an adjacent boundary
    /// event.  The check is strict: a trial exactly this far from a
    /// boundary is rejected.
    ///
    /// Must be positive.  Default: `250` samples (0.5 s at 500 Hz).
    pub min_boundary_distance: usize,

    /// Pre/post context added around every trial, in samples.
    ///
    /// The slice runs from `onset - buffer` to `offset + buffer` inclusive,
    /// so each epoch is `offset - onset + 2 * buffer + 1` samples wide.
    ///
    /// Default: `200`.
    pub buffer: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            onset_marker: "onset".into(),
            offset_marker: "offset".into(),
            min_boundary_distance: 250,
            buffer: 200,
        }
    }
}

impl SegmentConfig {
    /// Reject settings the segmenter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.min_boundary_distance == 0 {
            return Err(StimError::InvalidInput(
                "min_boundary_distance must be positive".into(),
            ));
        }
        if self.onset_marker.is_empty() || self.offset_marker.is_empty() {
            return Err(StimError::InvalidInput(
                "onset and offset markers must be non-empty".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the stimulus matcher.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Zero-based index of the stimulus-tracking channel in each epoch.
    ///
    /// Default: `64` (the 65th channel of the acquisition montage).
    pub track_channel: usize,

    /// Sampling rate of the recording, and therefore of the track, in Hz.
    ///
    /// Candidates are resampled to this rate before correlation.
    ///
    /// Default: `500.0`.
    pub track_sfreq: f64,

    /// Native sampling rate of candidate audio in Hz.  Not validated
    /// against the files themselves.
    ///
    /// Default: `44100.0`.
    pub audio_sfreq: f64,

    /// Score candidates on the rayon thread pool.  Scores are identical
    /// either way.
    ///
    /// Default: `true`.
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            track_channel: 64,
            track_sfreq: 500.0,
            audio_sfreq: 44_100.0,
            parallel: true,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("track_sfreq", self.track_sfreq), ("audio_sfreq", self.audio_sfreq)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(StimError::InvalidInput(format!(
                    "{name} must be finite and positive, got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SegmentConfig::default().validate().is_ok());
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_boundary_distance_rejected() {
        let cfg = SegmentConfig { min_boundary_distance: 0, ..SegmentConfig::default() };
        assert!(matches!(cfg.validate(), Err(StimError::InvalidInput(_))));
    }

    #[test]
    fn empty_marker_rejected() {
        let cfg = SegmentConfig { onset_marker: String::new(), ..SegmentConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_positive_rate_rejected() {
        let cfg = MatchConfig { audio_sfreq: 0.0, ..MatchConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = MatchConfig { track_sfreq: f64::NAN, ..MatchConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
