//! Stimulus identification by best-alignment correlation.
//!
//! For one trial the tracking channel is mean-removed and peak-normalised
//! into a [`Waveform`].  Every candidate is resampled from the audio rate to
//! the track rate, normalised the same way, and scored by the maximum
//! Pearson coefficient over all alignments (see [`crate::xcorr`]).  The
//! caller picks the stable argmax with [`best_match`].
//!
//! Candidates are independent, so with [`MatchConfig::parallel`] they are
//! scored on the rayon pool.  Any failing candidate fails the whole call.
use rayon::prelude::*;

use crate::config::MatchConfig;
use crate::epoch::Epoch;
use crate::error::{Result, StimError};
use crate::normalize::peak_normalize_inplace;
use crate::resample::resample_1d;
use crate::xcorr::best_alignment;

/// A mean-removed, peak-normalised signal at a known rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f64>,
    pub sfreq: f64,
}

impl Waveform {
    /// Normalise a track recorded at `sfreq`.
    pub fn track(raw: &[f32], sfreq: f64) -> Result<Self> {
        let mut samples: Vec<f64> = raw.iter().map(|&v| v as f64).collect();
        peak_normalize_inplace(&mut samples)
            .map_err(|e| degenerate("track", e))?;
        Ok(Self { samples, sfreq })
    }

    /// Resample raw audio from `src_sfreq` to `dst_sfreq`, then normalise.
    pub fn candidate(raw: &[f32], src_sfreq: f64, dst_sfreq: f64) -> Result<Self> {
        let x: Vec<f64> = raw.iter().map(|&v| v as f64).collect();
        let mut samples = resample_1d(&x, src_sfreq, dst_sfreq)?;
        peak_normalize_inplace(&mut samples)
            .map_err(|e| degenerate("candidate", e))?;
        Ok(Self { samples, sfreq: dst_sfreq })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn degenerate(what: &str, e: StimError) -> StimError {
    match e {
        StimError::DegenerateSignal(msg) => StimError::DegenerateSignal(format!("{what}: {msg}")),
        other => other,
    }
}

/// Pull the tracking channel out of an epoch and normalise it.
pub fn track_from_epoch(epoch: &Epoch, cfg: &MatchConfig) -> Result<Waveform> {
    let n_ch = epoch.samples.nrows();
    if cfg.track_channel >= n_ch {
        return Err(StimError::InvalidInput(format!(
            "tracking channel {} not present in epoch with {n_ch} channels",
            cfg.track_channel
        )));
    }
    let row: Vec<f32> = epoch.samples.row(cfg.track_channel).to_vec();
    Waveform::track(&row, cfg.track_sfreq)
}

/// Score one raw candidate against `track`.
///
/// `NaN` when no alignment has a defined coefficient (every window of the
/// sliding operand is flat).
pub fn score_candidate(track: &Waveform, raw: &[f32], cfg: &MatchConfig) -> Result<f64> {
    let cand = Waveform::candidate(raw, cfg.audio_sfreq, track.sfreq)?;
    Ok(best_alignment(&track.samples, &cand.samples).map_or(f64::NAN, |a| a.score))
}

/// Score every candidate against `track`.  Output order follows input
/// order; an empty candidate list yields an empty score list.
pub fn match_stimuli<C>(track: &Waveform, candidates: &[C], cfg: &MatchConfig) -> Result<Vec<f64>>
where
    C: AsRef<[f32]> + Sync,
{
    cfg.validate()?;
    if track.is_empty() {
        return Err(StimError::DegenerateSignal("track: empty signal".into()));
    }
    log::debug!(
        "matching {}-sample track against {} candidates",
        track.len(),
        candidates.len()
    );

    if cfg.parallel {
        candidates
            .par_iter()
            .map(|c| score_candidate(track, c.as_ref(), cfg))
            .collect()
    } else {
        candidates
            .iter()
            .map(|c| score_candidate(track, c.as_ref(), cfg))
            .collect()
    }
}

/// Stable argmax: the first index holding the largest score.  `NaN` scores
/// are never selected; `None` if there is nothing to select.
pub fn best_match(scores: &[f64]) -> Option<(usize, f64)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| !s.is_nan())
        .fold(None, |best, (i, s)| match best {
            Some((_, b)) if s <= b => best,
            _ => Some((i, s)),
        })
}

/// A candidate with the name the caller knows it by.
#[derive(Debug, Clone)]
pub struct NamedCandidate {
    pub name: String,
    pub samples: Vec<f32>,
}

impl AsRef<[f32]> for NamedCandidate {
    fn as_ref(&self) -> &[f32] {
        &self.samples
    }
}

/// Score only the candidates accepted by `keep`.
///
/// Returns `(index into candidates, score)` pairs in input order, ready for
/// [`best_match_indexed`].  How `keep` decides (file-name metadata, trial
/// type, …) is up to the caller.
pub fn match_filtered<F>(
    track: &Waveform,
    candidates: &[NamedCandidate],
    keep: F,
    cfg: &MatchConfig,
) -> Result<Vec<(usize, f64)>>
where
    F: Fn(&NamedCandidate) -> bool,
{
    let (indices, pool): (Vec<usize>, Vec<&NamedCandidate>) = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| keep(c))
        .unzip();
    log::debug!("pre-filter kept {} of {} candidates", pool.len(), candidates.len());

    let pool: Vec<&[f32]> = pool.iter().map(|c| c.samples.as_slice()).collect();
    let scores = match_stimuli(track, &pool, cfg)?;
    Ok(indices.into_iter().zip(scores).collect())
}

/// Stable argmax over `(index, score)` pairs, returning the original index.
pub fn best_match_indexed(scored: &[(usize, f64)]) -> Option<(usize, f64)> {
    let scores: Vec<f64> = scored.iter().map(|&(_, s)| s).collect();
    best_match(&scores).map(|(k, s)| (scored[k].0, s))
}

/// Best candidate for one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialMatch {
    /// Position of the epoch in the segmenter output.
    pub trial: usize,
    pub type_label: String,
    pub best_index: usize,
    pub best_name: String,
    pub score: f64,
}

/// Run the matcher for every epoch against the same candidate pool.
///
/// Trials where no candidate has a defined score are left out.
pub fn match_epochs(
    epochs: &[Epoch],
    candidates: &[NamedCandidate],
    cfg: &MatchConfig,
) -> Result<Vec<TrialMatch>> {
    let mut out = Vec::with_capacity(epochs.len());
    for (trial, epoch) in epochs.iter().enumerate() {
        let track = track_from_epoch(epoch, cfg)?;
        let scores = match_stimuli(&track, candidates, cfg)?;
        match best_match(&scores) {
            Some((best_index, score)) => {
                log::info!(
                    "trial {trial} ({}): best {} r={score:.4}",
                    epoch.type_label,
                    candidates[best_index].name
                );
                out.push(TrialMatch {
                    trial,
                    type_label: epoch.type_label.clone(),
                    best_index,
                    best_name: candidates[best_index].name.clone(),
                    score,
                });
            }
            None => log::warn!("trial {trial} ({}): no candidate scored", epoch.type_label),
        }
    }
    Ok(out)
}
