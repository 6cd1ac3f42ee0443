use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::audio::features::SpectrumMode;
use crate::render::frame::DEFAULT_CANVAS_SIZE;

#[derive(Parser, Debug)]
#[command(
    name = "micprobe",
    about = "Recording-environment diagnosis, noise preset selection and visual audio codes"
)]
pub struct Cli {
    /// Config file (defaults to ./micprobe.toml or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sample the environment and print the full diagnostic report
    Analyze(CaptureArgs),

    /// Quick sampling pass that picks and applies a preset
    Auto(CaptureArgs),

    /// Generate a 16x16 visual code from a recording
    Code(CodeArgs),

    /// Load an exported code sidecar and preview it
    Inspect {
        /// Path to an audio-code-<timestamp>.json file
        path: PathBuf,
    },

    /// List the built-in processing presets
    Presets {
        /// Show one preset's processing chain with config overrides applied
        #[arg(long)]
        show: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Audio file played through the analyser (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Sampling interval in milliseconds (overrides config)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Total sampling duration in milliseconds (overrides config)
    #[arg(long)]
    pub duration_ms: Option<u64>,

    /// Pace snapshots on the wall clock instead of capturing back to back
    #[arg(long)]
    pub realtime: bool,

    /// Print machine-readable JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CodeArgs {
    /// Recorded audio file
    pub input: PathBuf,

    /// Directory for the PNG and JSON sidecar (overrides config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Canvas size in pixels
    #[arg(long, default_value_t = DEFAULT_CANVAS_SIZE)]
    pub size: u32,

    /// Transform used for the spectral centroid
    #[arg(long, value_enum)]
    pub spectrum: Option<SpectrumMode>,

    /// Skip drawing cell borders
    #[arg(long)]
    pub no_grid_lines: bool,
}
