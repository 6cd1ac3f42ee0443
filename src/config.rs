use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::collector::CollectionPlan;
use crate::audio::features::SpectrumMode;
use crate::audio::snapshot::AnalyserSettings;
use crate::presets::chain::ProcessingOverrides;
use crate::render::frame::DEFAULT_CANVAS_SIZE;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_analysis_plan")]
    pub analysis: CollectionPlan,
    #[serde(default = "default_auto_plan")]
    pub auto: CollectionPlan,
    #[serde(default)]
    pub analyser: AnalyserSettings,
    #[serde(default)]
    pub code: CodeConfig,
    #[serde(default)]
    pub processing: ProcessingOverrides,
}

#[derive(Debug, Deserialize)]
pub struct CodeConfig {
    #[serde(default = "default_canvas_size")]
    pub canvas_size: u32,
    #[serde(default = "default_grid_lines")]
    pub grid_lines: bool,
    #[serde(default)]
    pub spectrum: SpectrumMode,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            canvas_size: default_canvas_size(),
            grid_lines: default_grid_lines(),
            spectrum: SpectrumMode::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: default_analysis_plan(),
            auto: default_auto_plan(),
            analyser: AnalyserSettings::default(),
            code: CodeConfig::default(),
            processing: ProcessingOverrides::default(),
        }
    }
}

fn default_analysis_plan() -> CollectionPlan { CollectionPlan::FULL }
fn default_auto_plan() -> CollectionPlan { CollectionPlan::QUICK }
fn default_canvas_size() -> u32 { DEFAULT_CANVAS_SIZE }
fn default_grid_lines() -> bool { true }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

/// Explicit path, else `micprobe.toml` in the working directory, else the
/// per-user config file.
pub fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("micprobe.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("micprobe").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("micprobe").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.analysis.validate().context("Invalid [analysis] plan")?;
    config.auto.validate().context("Invalid [auto] plan")?;
    let analyser = &config.analyser;
    if analyser.fft_size < 2 || !analyser.fft_size.is_power_of_two() {
        anyhow::bail!("analyser fft_size must be a power of two, got {}", analyser.fft_size);
    }
    if analyser.max_decibels <= analyser.min_decibels {
        anyhow::bail!(
            "analyser max_decibels ({}) must exceed min_decibels ({})",
            analyser.max_decibels,
            analyser.min_decibels
        );
    }
    if !(0.0..=1.0).contains(&analyser.smoothing) {
        anyhow::bail!("analyser smoothing must be in [0, 1], got {}", analyser.smoothing);
    }
    Ok(config)
}
