//! File I/O around the core: recordings and epochs as safetensors, candidate
//! audio as WAV, match reports as JSON.
//!
//! Recording layout (`*.safetensors`):
//!   data             F32      [C, T]  continuous samples
//!   sfreq            F32      [1]     sampling rate (Hz)
//!   event_latencies  I32/I64  [N]     sample index per event
//!   event_labels     U8       [B]     newline-separated labels, N lines
use anyhow::{bail, ensure, Context, Result};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;

use crate::epoch::{Epoch, EpochCounts};
use crate::events::Event;
use crate::matcher::TrialMatch;

// ── Low-level safetensors parsing ────────────────────────────────────────────

struct Tensors<'a> {
    header: HashMap<String, serde_json::Value>,
    data: &'a [u8],
}

impl<'a> Tensors<'a> {
    fn parse(bytes: &'a [u8]) -> Result<Self> {
        ensure!(bytes.len() >= 8, "safetensors file too small ({} bytes)", bytes.len());
        let mut len = [0u8; 8];
        len.copy_from_slice(&bytes[..8]);
        let n = u64::from_le_bytes(len) as usize;
        let end = 8usize.checked_add(n).filter(|&e| e <= bytes.len())
            .context("safetensors header length exceeds file size")?;
        let header: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes[8..end])
            .context("failed to parse safetensors header")?;
        Ok(Self { header, data: &bytes[end..] })
    }

    fn entry(&self, key: &str) -> Result<&serde_json::Value> {
        self.header.get(key).with_context(|| format!("missing '{key}' tensor"))
    }

    fn has(&self, key: &str) -> bool {
        self.header.contains_key(key)
    }

    fn dtype(&self, key: &str) -> Result<&str> {
        self.entry(key)?["dtype"].as_str().with_context(|| format!("'{key}': missing dtype"))
    }

    fn shape(&self, key: &str) -> Result<Vec<usize>> {
        self.entry(key)?["shape"]
            .as_array()
            .with_context(|| format!("'{key}': missing shape"))?
            .iter()
            .map(|v| v.as_u64().map(|d| d as usize).with_context(|| format!("'{key}': bad shape")))
            .collect()
    }

    fn raw(&self, key: &str) -> Result<&'a [u8]> {
        let offsets = self.entry(key)?["data_offsets"]
            .as_array()
            .with_context(|| format!("'{key}': missing data_offsets"))?;
        ensure!(offsets.len() == 2, "'{key}': data_offsets must have two entries");
        let s = offsets[0].as_u64().context("bad data offset")? as usize;
        let e = offsets[1].as_u64().context("bad data offset")? as usize;
        let data: &'a [u8] = self.data;
        ensure!(s <= e && e <= data.len(), "'{key}': data_offsets [{s}, {e}) out of bounds");
        Ok(&data[s..e])
    }

    fn f32s(&self, key: &str) -> Result<Vec<f32>> {
        ensure!(self.dtype(key)? == "F32", "'{key}': expected F32");
        Ok(self.raw(key)?
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    fn integers(&self, key: &str) -> Result<Vec<i64>> {
        let raw = self.raw(key)?;
        Ok(match self.dtype(key)? {
            "I32" => raw
                .chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64)
                .collect(),
            "I64" => raw
                .chunks_exact(8)
                .map(|b| i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
                .collect(),
            other => bail!("'{key}': expected I32 or I64, found {other}"),
        })
    }
}

// ── Recording ────────────────────────────────────────────────────────────────

/// A continuous recording with its event markers.
#[derive(Debug, Clone)]
pub struct Recording {
    /// [C, T] samples.
    pub data: Array2<f32>,
    /// Sampling rate (Hz).
    pub sfreq: f32,
    /// Events in file order.
    pub events: Vec<Event>,
}

impl Recording {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let t = Tensors::parse(bytes)?;

        let shape = t.shape("data")?;
        ensure!(shape.len() == 2, "'data' must be 2-D, got shape {shape:?}");
        let data = Array2::from_shape_vec((shape[0], shape[1]), t.f32s("data")?)
            .context("'data' length does not match its shape")?;

        let sfreq = *t.f32s("sfreq")?.first().context("'sfreq' is empty")?;

        let latencies = t.integers("event_latencies")?;
        // Newline-separated, one entry per latency; empty labels are kept.
        let labels: Vec<String> = if t.has("event_labels") && !latencies.is_empty() {
            std::str::from_utf8(t.raw("event_labels")?)
                .context("'event_labels' is not UTF-8")?
                .split('\n')
                .map(String::from)
                .collect()
        } else {
            vec![]
        };
        ensure!(
            labels.len() == latencies.len(),
            "{} event labels for {} latencies",
            labels.len(),
            latencies.len()
        );

        let events = labels
            .into_iter()
            .zip(latencies)
            .map(|(label, lat)| {
                ensure!(lat >= 0, "negative latency {lat} for event '{label}'");
                Ok(Event { label, latency: lat as usize })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Recording { data, sfreq, events })
    }

    /// Serialise to the layout read by [`Recording::load`].
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut w = StWriter::new();
        w.add_f32_arr2("data", &self.data);
        w.add_f32("sfreq", &[self.sfreq], &[1]);
        let lat: Vec<i64> = self.events.iter().map(|e| e.latency as i64).collect();
        w.add_i64("event_latencies", &lat, &[lat.len()]);
        if let Some(e) = self.events.iter().find(|e| e.label.contains('\n')) {
            bail!("event label {:?} at {} contains a newline", e.label, e.latency);
        }
        let labels = self.events.iter().map(|e| e.label.as_str()).collect::<Vec<_>>().join("\n");
        w.add_u8("event_labels", labels.as_bytes());
        w.write(path)
    }
}

// ── Candidate audio ──────────────────────────────────────────────────────────

/// Audio samples from one WAV file, reduced to its first channel.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// First-channel samples scaled to [-1, 1].
    pub samples: Vec<f32>,
    pub sfreq: u32,
    pub channels: u16,
}

/// Read a WAV file and keep its first channel.
pub fn load_wav(path: &Path) -> Result<AudioClip> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1);

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            ensure!(
                (1..=32).contains(&spec.bits_per_sample),
                "{}: unsupported bit depth {}",
                path.display(),
                spec.bits_per_sample
            );
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<f32>, _>>()?
        }
    };

    let samples = interleaved.into_iter().step_by(channels as usize).collect();
    Ok(AudioClip { samples, sfreq: spec.sample_rate, channels })
}

// ── Safetensors writer ───────────────────────────────────────────────────────

/// Minimal safetensors writer for F32, I64 and U8 tensors.
///
/// ```rust,no_run
/// use eegstim::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("signal", &[1.0f32, 2.0, 3.0], &[1, 3]);
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f32_arr2(&mut self, name: &str, arr: &Array2<f32>) {
        let data: Vec<f32> = arr.iter().copied().collect();
        self.add_f32(name, &data, &[arr.nrows(), arr.ncols()]);
    }

    pub fn add_i64(&mut self, name: &str, data: &[i64], shape: &[usize]) {
        let bytes = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I64", shape.to_vec()));
    }

    pub fn add_u8(&mut self, name: &str, data: &[u8]) {
        self.entries.push((name.to_string(), data.to_vec(), "U8", vec![data.len()]));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let mut hdr = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr.len() % 8) % 8;
        hdr.extend(std::iter::repeat(b' ').take(pad));

        let mut f = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        f.write_all(&(hdr.len() as u64).to_le_bytes())?;
        f.write_all(&hdr)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

/// Write epochs to safetensors.
///
/// Keys: `epoch_{i}` [C, W] F32, `onset_offset` [E, 2] I64, `type_labels`
/// (newline-separated), `counts` [3] I64 (added, invalid, near boundary).
pub fn write_epochs(epochs: &[Epoch], counts: &EpochCounts, path: &Path) -> Result<()> {
    let mut w = StWriter::new();
    for (i, ep) in epochs.iter().enumerate() {
        w.add_f32_arr2(&format!("epoch_{i}"), &ep.samples);
    }
    let bounds: Vec<i64> = epochs
        .iter()
        .flat_map(|e| [e.onset as i64, e.offset as i64])
        .collect();
    w.add_i64("onset_offset", &bounds, &[epochs.len(), 2]);
    let labels = epochs.iter().map(|e| e.type_label.as_str()).collect::<Vec<_>>().join("\n");
    w.add_u8("type_labels", labels.as_bytes());
    w.add_i64(
        "counts",
        &[counts.added as i64, counts.invalid as i64, counts.rejected_near_boundary as i64],
        &[3],
    );
    w.write(path)
}

// ── Match report ─────────────────────────────────────────────────────────────

/// JSON summary of a segmentation + matching run.
pub fn report_json(matches: &[TrialMatch], counts: &EpochCounts) -> serde_json::Value {
    let trials: Vec<serde_json::Value> = matches
        .iter()
        .map(|m| serde_json::json!({
            "trial": m.trial,
            "type_label": m.type_label,
            "best_index": m.best_index,
            "best_name": m.best_name,
            "score": m.score,
        }))
        .collect();
    serde_json::json!({
        "counts": {
            "added": counts.added,
            "invalid": counts.invalid,
            "rejected_near_boundary": counts.rejected_near_boundary,
        },
        "trials": trials,
    })
}

pub fn write_report(path: &Path, matches: &[TrialMatch], counts: &EpochCounts) -> Result<()> {
    let json = serde_json::to_string_pretty(&report_json(matches, counts))?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
