//! # eegstim — trial epoching and stimulus identification for EEG
//!
//! `eegstim` cuts a continuous EEG recording into variable-length trials
//! delimited by onset/offset event markers, and identifies which audio
//! stimulus was played in each trial by correlating a stimulus-tracking
//! channel against every candidate waveform.
//!
//! ## Pipeline overview
//!
//! ```text
//! recording.safetensors            stimuli/*.wav
//!   │                                 │
//!   ├─ epoch::segment()               ├─ io::load_wav()        first channel
//!   │    marker filter                │
//!   │    (before, prev, curr, after)  ├─ resample::resample_1d() 44.1 kHz → 500 Hz
//!   │    boundary-distance check      ├─ normalize               demean, ÷ peak
//!   │    [onset-200, offset+200]      │
//!   │                                 │
//!   └─ matcher::track_from_epoch() ───┴─ xcorr::best_alignment() shorter stays whole,
//!                                           longer slides; max Pearson r
//!                                           │
//!                                           └─→ matcher::best_match()  stable argmax
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use eegstim::{segment, match_stimuli, best_match, track_from_epoch};
//! use eegstim::{MatchConfig, SegmentConfig};
//! use eegstim::io::{load_wav, Recording};
//! use std::path::Path;
//!
//! let rec = Recording::load(Path::new("data/session1.safetensors")).unwrap();
//! let seg_cfg = SegmentConfig {
//!     onset_marker: "S 10".into(),
//!     offset_marker: "S 20".into(),
//!     ..SegmentConfig::default()
//! };
//! let (epochs, counts) = segment(&rec.events, &rec.data, &seg_cfg).unwrap();
//! println!("{} trials, {} near a boundary", counts.added, counts.rejected_near_boundary);
//!
//! let clips: Vec<Vec<f32>> = ["a.wav", "b.wav"]
//!     .iter()
//!     .map(|p| load_wav(Path::new(p)).unwrap().samples)
//!     .collect();
//!
//! let cfg = MatchConfig::default();
//! for epoch in &epochs {
//!     let track  = track_from_epoch(epoch, &cfg).unwrap();
//!     let scores = match_stimuli(&track, &clips, &cfg).unwrap();
//!     if let Some((idx, r)) = best_match(&scores) {
//!         println!("{}: stimulus {idx} (r = {r:.3})", epoch.type_label);
//!     }
//! }
//! ```

pub mod config;
pub mod epoch;
pub mod error;
pub mod events;
pub mod io;
pub mod matcher;
pub mod normalize;
pub mod resample;
pub mod xcorr;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use config::{MatchConfig, SegmentConfig};
pub use epoch::{classify, segment, Epoch, EpochCounts, WindowVerdict};
pub use error::{Result, StimError};
pub use events::{Event, EventStream, ScanWindow};
pub use matcher::{
    best_match, best_match_indexed, match_epochs, match_filtered, match_stimuli,
    score_candidate, track_from_epoch, NamedCandidate, TrialMatch, Waveform,
};
pub use normalize::{demean_inplace, peak_abs, peak_normalize_inplace};
pub use resample::{auto_npad, final_length, rational_approx, resample_1d};
pub use xcorr::{best_alignment, pearson, sliding_correlation, Alignment, SlidOperand};
