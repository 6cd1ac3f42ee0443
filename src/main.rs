mod audio;
mod cli;
mod code;
mod config;
mod encode;
mod environment;
mod error;
mod presets;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use audio::analysis::extract_features;
use audio::collector::{CancelToken, CollectionPlan, Pacing, SampleCollector};
use audio::decode::decode_audio;
use audio::snapshot::{AnalyserSource, SnapshotSource};
use cli::{CaptureArgs, Cli, CodeArgs, Command};
use code::grid::{encode, CodeGrid, CodeMetadata, Compatibility, GRID_SIZE};
use config::Config;
use encode::png::export_code;
use environment::diagnostics::EnvironmentReport;
use environment::recommend::{Recommendation, RecommendationMode};
use environment::spectrum::BandLevels;
use error::{CollectError, SourceError};
use presets::chain::ChainSettings;
use presets::registry::{PresetKey, PRESETS};
use render::frame::{shade_map, CodeRenderer, DEFAULT_CANVAS_SIZE};

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    report: &'a EnvironmentReport,
    recommendation: &'a Recommendation,
}

#[derive(Serialize)]
struct AutoOutput<'a> {
    recommendation: &'a Recommendation,
    chain: &'a ChainSettings,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match config::find_config_path(cli.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(err) => {
                log::warn!("{:#}; using defaults", err);
                Config::default()
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Analyze(args) => run_capture(&args, &config, RecommendationMode::Analysis),
        Command::Auto(args) => run_capture(&args, &config, RecommendationMode::AutoApply),
        Command::Code(args) => run_code(&args, &config),
        Command::Inspect { path } => run_inspect(&path),
        Command::Presets { show } => list_presets(show.as_deref(), &config),
    }
}

fn run_capture(args: &CaptureArgs, config: &Config, mode: RecommendationMode) -> Result<()> {
    let base = match mode {
        RecommendationMode::Analysis => config.analysis,
        RecommendationMode::AutoApply => config.auto,
    };
    let plan = CollectionPlan {
        interval_ms: args.interval_ms.unwrap_or(base.interval_ms),
        duration_ms: args.duration_ms.unwrap_or(base.duration_ms),
    };
    plan.validate().context("Invalid sampling plan")?;

    let audio = decode_audio(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let mut source = AnalyserSource::new(&audio, config.analyser.clone());

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("Could not install Ctrl-C handler: {}", err);
    }

    let pacing = if args.realtime { Pacing::RealTime } else { Pacing::Immediate };
    let collector = SampleCollector::new(plan, pacing, cancel);

    match mode {
        RecommendationMode::Analysis => log::info!("Starting environment analysis..."),
        RecommendationMode::AutoApply => log::info!("Auto-analyzing environment..."),
    }
    log::info!(
        "Sampling {} snapshots of {} bins every {}ms",
        plan.snapshot_count(),
        source.bin_count(),
        plan.interval_ms
    );

    let pb = ProgressBar::new(collector.plan().snapshot_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} samples ({percent}%)")?
            .progress_chars("=>-"),
    );

    let window = match collector.collect(&mut source, |done, _| pb.set_position(done as u64)) {
        Ok(window) => window,
        Err(err @ CollectError::Cancelled { .. })
        | Err(
            err @ CollectError::Source {
                source: SourceError::Exhausted { .. },
                ..
            },
        ) => {
            pb.abandon();
            log::warn!("Analysis skipped, discarded {} samples: {}", err.collected(), err);
            return Ok(());
        }
        Err(err) => {
            pb.abandon();
            return Err(err).context("Environment sampling failed");
        }
    };
    pb.finish_and_clear();
    log::info!(
        "Processing analysis results ({} snapshots, {} bins)...",
        window.len(),
        window.bin_count()
    );

    let recommendation = Recommendation::for_window(&window, mode);

    match mode {
        RecommendationMode::Analysis => {
            let report = EnvironmentReport::new(BandLevels::from_window(&window));
            if args.json {
                let output = AnalysisOutput {
                    report: &report,
                    recommendation: &recommendation,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", report);
                println!();
                println!("Recommended Template: {}", recommendation.name);
                println!("{}", recommendation.reason);
            }
            log::info!("Analysis complete! Recommended template: {}", recommendation.name);
        }
        RecommendationMode::AutoApply => {
            let chain =
                ChainSettings::auto_applied(recommendation.key.preset(), &config.processing);
            if args.json {
                let output = AutoOutput {
                    recommendation: &recommendation,
                    chain: &chain,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Recommended Template: {}", recommendation.name);
                println!("{}", recommendation.reason);
                println!();
                println!("{}", chain);
            }
            log::info!(
                "Auto-applied template: {} - Settings optimized!",
                recommendation.name
            );
        }
    }

    Ok(())
}

fn run_code(args: &CodeArgs, config: &Config) -> Result<()> {
    // CLI values apply only when they differ from their defaults
    let size = if args.size == DEFAULT_CANVAS_SIZE { config.code.canvas_size } else { args.size };
    let spectrum = args.spectrum.unwrap_or(config.code.spectrum);
    let grid_lines = config.code.grid_lines && !args.no_grid_lines;
    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.code.output_dir.clone());
    if size < GRID_SIZE as u32 {
        anyhow::bail!("Canvas size {} is smaller than the {}x{} grid", size, GRID_SIZE, GRID_SIZE);
    }

    log::info!("Analyzing recorded audio for code generation...");
    let audio = decode_audio(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let timestamp = jiff::Timestamp::now().as_millisecond();

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Extracting audio features...");
    let features = extract_features(&audio, spectrum);

    spinner.set_message("Generating visual code...");
    let code = encode(
        &features,
        CodeMetadata::new(audio.duration, audio.sample_rate, timestamp),
    );

    spinner.set_message("Rendering code image...");
    let renderer = CodeRenderer::new(size, grid_lines);
    let exported = export_code(&code, &renderer, &output_dir)?;
    spinner.finish_and_clear();

    print_metadata(&code);
    println!("Image:   {}", exported.image.display());
    println!("Sidecar: {}", exported.sidecar.display());

    log::info!("Audio code generated successfully!");
    Ok(())
}

fn run_inspect(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let loaded = CodeGrid::from_json(&text)
        .with_context(|| format!("Failed to load code from {}", path.display()))?;

    print_metadata(&loaded.code);
    if let Compatibility::VersionMismatch(version) = &loaded.compatibility {
        println!("Note: written by format version {}, read as {}", version, code::grid::FORMAT_VERSION);
    }
    println!();

    for row in shade_map(&loaded.code).iter() {
        let line: String = row
            .iter()
            .flat_map(|shade| std::iter::repeat(shade.glyph()).take(2))
            .collect();
        println!("|{}|", line);
    }
    Ok(())
}

fn print_metadata(code: &CodeGrid) {
    let metadata = &code.metadata;
    println!("Audio Visual Code");
    println!("Duration: {:.2}s", metadata.duration);
    println!("Sample Rate: {}Hz", metadata.sample_rate);
    println!("Grid Size: {}x{}", GRID_SIZE, GRID_SIZE);
    println!("Generated: {}", metadata.generated_at());
    println!("Version: {}", metadata.version);
}

fn list_presets(show: Option<&str>, config: &Config) -> Result<()> {
    if let Some(name) = show {
        let key: PresetKey = name.parse()?;
        let preset = key.preset();
        let chain = ChainSettings::from_preset(preset).with_overrides(&config.processing);
        println!("{} ({})", preset.name, key);
        println!("{}", preset.description);
        println!();
        println!("{}", chain);
        return Ok(());
    }

    println!("Available presets:");
    for preset in &PRESETS {
        println!("  {:<16} {:<22} {}", preset.key, preset.name, preset.description);
    }
    Ok(())
}
