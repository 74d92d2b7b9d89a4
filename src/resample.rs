//! FFT-based rational resampler for 1-D signals.
//!
//! Used to bring candidate audio (44.1 kHz) down to the recording rate
//! (500 Hz, ratio 5/441).
//!
//! Algorithm:
//!   1. Reflect-limited padding so the padded length is a power of two.
//!   2. Forward FFT, keep the half-spectrum (n/2 + 1 bins).
//!   3. Nyquist bin: doubled when downsampling, halved when upsampling
//!      (only for an even `use_len`).
//!   4. Scale by `new_len_padded / old_len_padded`.
//!   5. Inverse FFT at `new_len_padded`, truncating or zero-extending the
//!      spectrum and restoring Hermitian symmetry.
//!   6. Strip the resampled padding.
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{Result, StimError};

/// Padding on each side so that `n + pads` is the next power of two above
/// `n + 2·min(n/8, 100)`.
pub fn auto_npad(n: usize) -> (usize, usize) {
    let min_add = (n / 8).min(100) * 2;
    let sum = n + min_add;
    let next_pow2 = sum.next_power_of_two();
    let total = next_pow2 - n;
    (total / 2, total - total / 2)
}

/// Resample `x` from `src_sfreq` to `dst_sfreq`.
///
/// Output length is `round(x.len() · dst / src)`, not the `ceil` of a
/// polyphase resampler.  Equal rates return a
/// copy of the input.
pub fn resample_1d(x: &[f64], src_sfreq: f64, dst_sfreq: f64) -> Result<Vec<f64>> {
    if !(src_sfreq > 0.0 && dst_sfreq > 0.0) {
        return Err(StimError::Resample(format!(
            "invalid rates {src_sfreq} -> {dst_sfreq}"
        )));
    }
    if (src_sfreq - dst_sfreq).abs() < 1e-9 {
        return Ok(x.to_vec());
    }
    if x.is_empty() {
        return Err(StimError::Resample("empty input".into()));
    }
    let ratio = dst_sfreq / src_sfreq;
    let (npad_l, npad_r) = auto_npad(x.len());
    fft_resample(x, ratio, npad_l, npad_r)
}

fn fft_resample(x: &[f64], ratio: f64, npad_l: usize, npad_r: usize) -> Result<Vec<f64>> {
    let n_in = x.len();
    let final_len = (ratio * n_in as f64).round() as usize;
    if final_len == 0 {
        return Err(StimError::Resample(format!(
            "{n_in} samples resample to zero at ratio {ratio:.6}"
        )));
    }

    // ── 1. Padding ───────────────────────────────────────────────────────
    let x_ext = reflect_limited_pad(x, npad_l, npad_r);
    let old_len = x_ext.len();

    let new_len_padded = ((ratio * old_len as f64).round() as usize).max(1);
    let shorter = new_len_padded < old_len;
    let use_len = if shorter { new_len_padded } else { old_len };

    // ── 2. Half-spectrum ─────────────────────────────────────────────────
    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let mut buf: Vec<Complex<f64>> = x_ext.iter().map(|&v| Complex::new(v, 0.0)).collect();
    planner.plan_fft_forward(old_len).process(&mut buf);
    buf.truncate(old_len / 2 + 1);

    // ── 3. Nyquist bin ───────────────────────────────────────────────────
    if use_len % 2 == 0 {
        let nyq = use_len / 2;
        if let Some(bin) = buf.get_mut(nyq) {
            *bin *= if shorter { 2.0 } else { 0.5 };
        }
    }

    // ── 4. Scale ─────────────────────────────────────────────────────────
    let scale = new_len_padded as f64 / old_len as f64;
    buf.iter_mut().for_each(|v| *v *= scale);

    // ── 5. Inverse at the new length ─────────────────────────────────────
    let new_half = new_len_padded / 2 + 1;
    let mut spec = vec![Complex::<f64>::default(); new_len_padded];
    let n_copy = buf.len().min(new_half).min(new_len_padded);
    spec[..n_copy].copy_from_slice(&buf[..n_copy]);
    for i in 1..new_half {
        let mirror = new_len_padded - i;
        if mirror >= new_half {
            spec[mirror] = spec[i].conj();
        }
    }
    planner.plan_fft_inverse(new_len_padded).process(&mut spec);
    let inv = 1.0 / new_len_padded as f64;

    // ── 6. Strip padding ─────────────────────────────────────────────────
    let skip_l = ((ratio * npad_l as f64).round() as usize).min(new_len_padded);
    let mut out: Vec<f64> = spec[skip_l..]
        .iter()
        .take(final_len)
        .map(|c| c.re * inv)
        .collect();
    out.resize(final_len, 0.0);
    Ok(out)
}

/// Odd reflection about the end samples, limited to `n - 1` samples per
/// side.  Requests beyond that are zero-filled.
fn reflect_limited_pad(x: &[f64], n_l: usize, n_r: usize) -> Vec<f64> {
    let n = x.len();
    let actual_l = n_l.min(n - 1);
    let actual_r = n_r.min(n - 1);
    let first = x[0];
    let last = x[n - 1];

    let mut out = Vec::with_capacity(n_l + n + n_r);
    out.extend(std::iter::repeat(0.0).take(n_l - actual_l));
    out.extend((1..=actual_l).rev().map(|i| 2.0 * first - x[i]));
    out.extend_from_slice(x);
    out.extend((1..=actual_r).map(|i| 2.0 * last - x[n - 1 - i]));
    out.extend(std::iter::repeat(0.0).take(n_r - actual_r));
    out
}

/// Reduced `(up, down)` such that `up / down == dst / src` (rates rounded to
/// 1 mHz).
pub fn rational_approx(dst: f64, src: f64) -> (usize, usize) {
    let up0 = (dst * 1000.0).round() as usize;
    let down0 = (src * 1000.0).round() as usize;
    let g = gcd(up0, down0).max(1);
    (up0 / g, down0 / g)
}

/// Exact output length: `round(n · up / down)`.
pub fn final_length(n: usize, up: usize, down: usize) -> usize {
    (n as f64 * up as f64 / down as f64).round() as usize
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
