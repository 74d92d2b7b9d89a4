/// match_trials: segment a recording, then identify the stimulus played in
/// each trial by correlating the tracking channel against every candidate
/// WAV file.  Writes a JSON report.
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use eegstim::{
    io::{load_wav, write_report, Recording},
    match_epochs, segment, MatchConfig, NamedCandidate, SegmentConfig,
};

#[derive(Parser, Debug)]
#[command(name = "match_trials", about = "Identify per-trial audio stimuli by cross-correlation")]
struct Args {
    /// Recording safetensors (data, sfreq, event_latencies, event_labels).
    #[arg(long)]
    recording: PathBuf,

    /// Candidate stimulus WAV files.
    #[arg(long, num_args = 1.., required = true)]
    candidates: Vec<PathBuf>,

    /// JSON report path.
    #[arg(long)]
    output: PathBuf,

    #[arg(long, default_value = "onset")]
    onset: String,

    #[arg(long, default_value = "offset")]
    offset: String,

    /// Minimum distance to an adjacent boundary event (samples).
    #[arg(long, default_value_t = 250)]
    min_boundary_distance: usize,

    /// Pre/post context around each trial (samples).
    #[arg(long, default_value_t = 200)]
    buffer: usize,

    /// Zero-based index of the stimulus-tracking channel.
    #[arg(long, default_value_t = 64)]
    track_channel: usize,

    /// Native candidate sampling rate (Hz).
    #[arg(long, default_value_t = 44_100.0)]
    audio_sfreq: f64,

    /// Score candidates on a single thread.
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rec = Recording::load(&args.recording)?;
    let seg_cfg = SegmentConfig {
        onset_marker: args.onset,
        offset_marker: args.offset,
        min_boundary_distance: args.min_boundary_distance,
        buffer: args.buffer,
    };
    let (epochs, counts) = segment(&rec.events, &rec.data, &seg_cfg)?;
    println!(
        "Added {} trials, {} invalid windows, {} too close to a boundary",
        counts.added, counts.invalid, counts.rejected_near_boundary
    );

    let candidates = args
        .candidates
        .iter()
        .map(|p| {
            let clip = load_wav(p)?;
            if clip.sfreq as f64 != args.audio_sfreq {
                log::warn!("{}: {} Hz, expected {} Hz", p.display(), clip.sfreq, args.audio_sfreq);
            }
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("{} has no file name", p.display()))?;
            Ok(NamedCandidate { name, samples: clip.samples })
        })
        .collect::<Result<Vec<_>>>()?;
    log::info!("loaded {} candidate stimuli", candidates.len());

    let cfg = MatchConfig {
        track_channel: args.track_channel,
        track_sfreq: rec.sfreq as f64,
        audio_sfreq: args.audio_sfreq,
        parallel: !args.sequential,
    };
    let matches = match_epochs(&epochs, &candidates, &cfg)?;

    for m in &matches {
        println!("trial {:>4}  {:<20} {:<30} r={:.4}", m.trial, m.type_label, m.best_name, m.score);
    }
    write_report(&args.output, &matches, &counts)?;
    println!("Written → {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_flag_defaults_and_overrides() {
        let base = ["match_trials", "--recording", "r.st", "--candidates", "a.wav", "b.wav", "--output", "o.json"];
        let args = Args::try_parse_from(base).unwrap();
        assert_eq!(args.buffer, SegmentConfig::default().buffer);
        assert_eq!(args.candidates.len(), 2);

        let args = Args::try_parse_from(base.iter().copied().chain(["--buffer", "75"])).unwrap();
        assert_eq!(args.buffer, 75);
    }
}
