//! Error type shared by the segmenter and the matcher.
//!
//! Only fatal conditions live here. Trials rejected by policy (incomplete
//! onset/offset pairing, too close to a boundary) are tallied in
//! [`EpochCounts`](crate::epoch::EpochCounts) instead.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StimError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Epoch range [{start}, {end}] outside recording with {n_times} samples")]
    OutOfRange { start: i64, end: usize, n_times: usize },

    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("Resampling failed: {0}")]
    Resample(String),
}

pub type Result<T> = std::result::Result<T, StimError>;
