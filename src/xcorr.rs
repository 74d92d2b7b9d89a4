//! Sliding-window Pearson correlation.
//!
//! The shorter of two signals is held whole; a window of the same length
//! slides over the longer one at every integer offset
//! `0 ..= long.len() - short.len()`, and the Pearson coefficient is taken at
//! each offset.  Which operand slides depends only on the lengths, never on
//! which one is the track.
//!
//! Cost is `O(short · (long - short + 1))`.  The fixed operand is centred
//! once; each offset takes the window mean, then one pass over the centred
//! window for `Σ(x - x̄)²` and `Σ(x - x̄)·f`.  Variances are never formed
//! as `Σx² - (Σx)²/n`, which cancels on windows riding a DC level.

/// Which operand slid during [`best_alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlidOperand {
    /// Candidate was at least as long as the track; the track stayed whole.
    Candidate,
    /// Candidate was shorter; it stayed whole and the track slid.
    Track,
}

/// Best offset found by [`best_alignment`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Offset into the sliding operand.
    pub offset: usize,
    /// Pearson coefficient at `offset`.
    pub score: f64,
    pub slid: SlidOperand,
}

/// Pearson correlation coefficient of two equal-length signals.
///
/// `None` when lengths differ, are zero, or either signal is constant.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let fixed = Centered::new(b)?;
    fixed.correlate(a)
}

/// Pearson coefficient of `fixed` against every window of `sliding`.
///
/// Entry `j` is the coefficient for `sliding[j .. j + fixed.len()]`, or
/// `None` where it is undefined.  Empty when `sliding` is shorter than
/// `fixed`; all `None` when `fixed` is constant.
pub fn sliding_correlation(fixed: &[f64], sliding: &[f64]) -> Vec<Option<f64>> {
    let n = fixed.len();
    if n == 0 || sliding.len() < n {
        return vec![];
    }
    let n_offsets = sliding.len() - n + 1;
    match Centered::new(fixed) {
        Some(f) => sliding.windows(n).map(|w| f.correlate(w)).collect(),
        None => vec![None; n_offsets],
    }
}

/// Maximum Pearson coefficient between `track` and `candidate` over all
/// alignments.
///
/// The shorter operand is held whole and the longer slides; equal lengths
/// give a single alignment.  Ties keep the earliest offset.  `None` if no
/// offset has a defined coefficient.
pub fn best_alignment(track: &[f64], candidate: &[f64]) -> Option<Alignment> {
    let (fixed, sliding, slid) = if candidate.len() >= track.len() {
        (track, candidate, SlidOperand::Candidate)
    } else {
        (candidate, track, SlidOperand::Track)
    };

    let mut best: Option<Alignment> = None;
    for (offset, r) in sliding_correlation(fixed, sliding).into_iter().enumerate() {
        let Some(score) = r else { continue };
        if best.map_or(true, |b| score > b.score) {
            best = Some(Alignment { offset, score, slid });
        }
    }
    best
}

/// Mean of `x`, `None` if `x` is empty or constant.
fn non_constant_mean(x: &[f64]) -> Option<f64> {
    let first = *x.first()?;
    if x.iter().all(|&v| v == first) {
        return None;
    }
    Some(x.iter().sum::<f64>() / x.len() as f64)
}

/// Mean-removed copy of the fixed operand and its L2 norm.
struct Centered {
    values: Vec<f64>,
    norm: f64,
}

impl Centered {
    fn new(x: &[f64]) -> Option<Self> {
        let mean = non_constant_mean(x)?;
        let values: Vec<f64> = x.iter().map(|v| v - mean).collect();
        let ss: f64 = values.iter().map(|v| v * v).sum();
        if !(ss > 0.0) {
            return None;
        }
        Some(Self { values, norm: ss.sqrt() })
    }

    fn correlate(&self, w: &[f64]) -> Option<f64> {
        let mean = non_constant_mean(w)?;
        let (mut ss, mut sxf) = (0.0_f64, 0.0_f64);
        for (&x, &f) in w.iter().zip(&self.values) {
            let d = x - mean;
            ss += d * d;
            sxf += d * f;
        }
        if !(ss > 0.0) {
            return None;
        }
        Some((sxf / (ss.sqrt() * self.norm)).clamp(-1.0, 1.0))
    }
}
