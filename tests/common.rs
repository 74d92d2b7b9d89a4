/// Shared synthetic fixtures.
use eegstim::Event;
use ndarray::Array2;

#[allow(unused)]
pub const AUDIO_SFREQ: f64 = 44_100.0;
#[allow(unused)]
pub const TRACK_SFREQ: f64 = 500.0;

#[allow(unused)]
pub fn ev(label: &str, latency: usize) -> Event {
    Event::new(label, latency)
}

#[allow(unused)]
/// [C, T] recording where `x[c, t] = c·10000 + t`, so slices are easy to
/// locate.
pub fn ramp_recording(n_ch: usize, n_t: usize) -> Array2<f32> {
    Array2::from_shape_fn((n_ch, n_t), |(c, t)| (c * 10_000 + t) as f32)
}

#[allow(unused)]
/// Band-limited test "stimulus" at 44.1 kHz: a few sines below 40 Hz under
/// a slow envelope, with phases and frequencies depending on `seed`.
pub fn stimulus(seconds: f64, seed: u32) -> Vec<f32> {
    let n = (seconds * AUDIO_SFREQ).round() as usize;
    let s = seed as f64;
    let freqs = [2.0 + 0.7 * s, 5.5 + 1.3 * s, 11.0 + 2.1 * s, 23.0 + 0.9 * s];
    (0..n)
        .map(|i| {
            let t = i as f64 / AUDIO_SFREQ;
            let env = 0.6 + 0.4 * (2.0 * std::f64::consts::PI * 0.8 * t + s).sin();
            let sum: f64 = freqs
                .iter()
                .enumerate()
                .map(|(k, f)| {
                    let phase = s * 1.7 + k as f64;
                    (2.0 * std::f64::consts::PI * f * t + phase).sin() / (k as f64 + 1.0)
                })
                .sum();
            (env * sum * 0.3) as f32
        })
        .collect()
}

#[allow(unused)]
/// Maximum absolute value.
pub fn peak(x: &[f64]) -> f64 {
    x.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}
