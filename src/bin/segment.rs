/// segment: cut a recording into onset→offset trials and write them to a
/// safetensors file.
///
/// Output keys:
///   epoch_N        [C, W]   f32  trial N with buffer context
///   onset_offset   [E, 2]   i64  onset/offset latency per trial
///   type_labels    [B]      u8   newline-separated onset labels
///   counts         [3]      i64  added, invalid, rejected near boundary
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use eegstim::{io::{write_epochs, Recording}, segment, SegmentConfig};

#[derive(Parser, Debug)]
#[command(name = "segment", about = "Event-delimited EEG trial epoching")]
struct Args {
    /// Recording safetensors (data, sfreq, event_latencies, event_labels).
    #[arg(long)]
    recording: PathBuf,

    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,

    /// Substring marking a trial onset.
    #[arg(long, default_value = "onset")]
    onset: String,

    /// Substring marking a trial offset.
    #[arg(long, default_value = "offset")]
    offset: String,

    /// Minimum distance to an adjacent boundary event (samples).
    #[arg(long, default_value_t = 250)]
    min_boundary_distance: usize,

    /// Pre/post context around each trial (samples).
    #[arg(long, default_value_t = 200)]
    buffer: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rec = Recording::load(&args.recording)?;
    log::info!(
        "loaded {} ch × {} samples @ {} Hz, {} events",
        rec.data.nrows(),
        rec.data.ncols(),
        rec.sfreq,
        rec.events.len()
    );

    let cfg = SegmentConfig {
        onset_marker: args.onset,
        offset_marker: args.offset,
        min_boundary_distance: args.min_boundary_distance,
        buffer: args.buffer,
    };
    let (epochs, counts) = segment(&rec.events, &rec.data, &cfg)?;

    println!(
        "Added {} trials, {} invalid windows, {} too close to a boundary",
        counts.added, counts.invalid, counts.rejected_near_boundary
    );

    write_epochs(&epochs, &counts, &args.output)?;
    println!("Written → {}", args.output.display());
    Ok(())
}
