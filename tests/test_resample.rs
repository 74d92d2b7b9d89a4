mod common;
use common::{stimulus, AUDIO_SFREQ, TRACK_SFREQ};
use eegstim::pearson;
use eegstim::resample::{final_length, rational_approx, resample_1d};

/// Analytic band-limited signal sampled at `sfreq`.
fn tones(n: usize, sfreq: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / sfreq;
            (2.0 * std::f64::consts::PI * 4.0 * t).sin()
                + 0.5 * (2.0 * std::f64::consts::PI * 9.0 * t + 0.3).cos()
        })
        .collect()
}

#[test]
fn audio_to_track_matches_analytic_signal() {
    let n = 3 * AUDIO_SFREQ as usize;
    let x = tones(n, AUDIO_SFREQ);
    let y = resample_1d(&x, AUDIO_SFREQ, TRACK_SFREQ).unwrap();
    let expected = tones(y.len(), TRACK_SFREQ);
    assert_eq!(y.len(), 1500);

    // Edges carry padding transients and the padding strip is rounded to
    // whole output samples, so allow a small sub-sample shift.
    let interior = 100..y.len() - 100;
    let max_err = interior
        .clone()
        .map(|i| (y[i] - expected[i]).abs())
        .fold(0.0_f64, f64::max);
    assert!(max_err < 2e-2, "max abs error {max_err:.2e}");
    let r = pearson(&y[interior.clone()], &expected[interior]).unwrap();
    assert!(r > 0.9999, "r = {r}");
}

#[test]
fn output_length_follows_rational_ratio() {
    let (up, down) = rational_approx(TRACK_SFREQ, AUDIO_SFREQ);
    for n_in in [4410_usize, 44_100, 66_150, 100_003] {
        let x = vec![0.0; n_in];
        let y = resample_1d(&x, AUDIO_SFREQ, TRACK_SFREQ).unwrap();
        assert_eq!(y.len(), final_length(n_in, up, down), "n_in={n_in}");
    }
}

#[test]
fn upsampling_preserves_shape() {
    let x = tones(1000, TRACK_SFREQ);
    let y = resample_1d(&x, TRACK_SFREQ, 1000.0).unwrap();
    assert_eq!(y.len(), 2000);
    let expected = tones(2000, 1000.0);
    let max_err = (100..1900)
        .map(|i| (y[i] - expected[i]).abs())
        .fold(0.0_f64, f64::max);
    assert!(max_err < 1e-2, "max abs error {max_err:.2e}");
}

#[test]
fn resampled_stimulus_keeps_its_energy() {
    let raw: Vec<f64> = stimulus(2.0, 3).iter().map(|&v| v as f64).collect();
    let y = resample_1d(&raw, AUDIO_SFREQ, TRACK_SFREQ).unwrap();
    let rms = |v: &[f64]| (v.iter().map(|x| x * x).sum::<f64>() / v.len() as f64).sqrt();
    let ratio = rms(&y) / rms(&raw);
    assert!((ratio - 1.0).abs() < 0.02, "rms ratio {ratio}");
}
