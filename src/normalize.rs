//! Mean removal and peak normalisation.
//!
//! `peak_normalize_inplace`:
//!   x = x - mean(x)
//!   x = x / max(|x|)
//!
//! A signal with no samples or a zero peak after mean removal cannot be
//! normalised and is reported as [`StimError::DegenerateSignal`].
use crate::error::{Result, StimError};

/// Subtract the mean in place and return it.  Empty input is left as is.
pub fn demean_inplace(x: &mut [f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let mean = x.iter().sum::<f64>() / x.len() as f64;
    x.iter_mut().for_each(|v| *v -= mean);
    mean
}

/// Largest absolute sample value, `0.0` for an empty slice.
pub fn peak_abs(x: &[f64]) -> f64 {
    x.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

/// Remove the mean, then scale so the largest absolute sample is 1.
///
/// Returns the pre-scaling peak.
pub fn peak_normalize_inplace(x: &mut [f64]) -> Result<f64> {
    if x.is_empty() {
        return Err(StimError::DegenerateSignal("empty signal".into()));
    }
    demean_inplace(x);
    let peak = peak_abs(x);
    if !(peak > 0.0 && peak.is_finite()) {
        return Err(StimError::DegenerateSignal(format!(
            "peak amplitude {peak} after mean removal ({} samples)",
            x.len()
        )));
    }
    let inv = 1.0 / peak;
    x.iter_mut().for_each(|v| *v *= inv);
    Ok(peak)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demean_returns_mean() {
        let mut x = vec![1.0, 2.0, 3.0, 6.0];
        let m = demean_inplace(&mut x);
        approx::assert_abs_diff_eq!(m, 3.0);
        approx::assert_abs_diff_eq!(x.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn peak_is_one_after_normalize() {
        let mut x: Vec<f64> = (0..256).map(|t| (t as f64 * 0.1).sin() * 40.0 + 7.0).collect();
        let peak = peak_normalize_inplace(&mut x).unwrap();
        assert!(peak > 0.0);
        approx::assert_abs_diff_eq!(peak_abs(&x), 1.0, epsilon = 1e-12);
        let mean = x.iter().sum::<f64>() / x.len() as f64;
        approx::assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_signal_is_degenerate() {
        let mut x = vec![3.5; 64];
        assert!(matches!(
            peak_normalize_inplace(&mut x),
            Err(StimError::DegenerateSignal(_))
        ));
    }

    #[test]
    fn empty_signal_is_degenerate() {
        let mut x: Vec<f64> = vec![];
        assert!(peak_normalize_inplace(&mut x).is_err());
    }
}
