use serde::Serialize;

use super::spectrum::{band_average, Band};
use crate::audio::snapshot::SampleWindow;
use crate::presets::registry::PresetKey;

/// The three band levels the decision tree looks at, plus their mean.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeInput {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    pub avg: f64,
}

impl TreeInput {
    pub fn new(low: f64, mid: f64, high: f64) -> Self {
        Self {
            low,
            mid,
            high,
            avg: (low + mid + high) / 3.0,
        }
    }

    pub fn from_window(window: &SampleWindow) -> Self {
        let level = |band: Band| {
            let (start, end) = band.bins();
            band_average(window, start, end)
        };
        Self::new(level(Band::Low), level(Band::Mid), level(Band::High))
    }
}

/// Rule order is significant: rumble first, then hiss, then overall loudness.
pub fn decide(input: &TreeInput) -> PresetKey {
    if input.low > -15.0 {
        return if input.mid > -10.0 {
            PresetKey::Car
        } else {
            PresetKey::OfficeAc
        };
    }
    if input.high > -5.0 {
        return PresetKey::OutdoorCicada;
    }
    if input.avg > -15.0 {
        return PresetKey::Cafe;
    }
    if input.avg < -35.0 {
        return PresetKey::Studio;
    }
    PresetKey::OfficeAc
}

pub fn recommend_template(window: &SampleWindow) -> PresetKey {
    decide(&TreeInput::from_window(window))
}

/// How the recommendation was reached; only changes the reason wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecommendationMode {
    Analysis,
    AutoApply,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub key: PresetKey,
    pub name: &'static str,
    pub reason: String,
}

impl Recommendation {
    pub fn new(key: PresetKey, mode: RecommendationMode) -> Self {
        let preset = key.preset();
        let prefix = match mode {
            RecommendationMode::Analysis => "Based on analysis",
            RecommendationMode::AutoApply => "Auto-applied",
        };
        Self {
            key,
            name: preset.name,
            reason: format!("{}: {}", prefix, preset.description),
        }
    }

    pub fn for_window(window: &SampleWindow, mode: RecommendationMode) -> Self {
        Self::new(recommend_template(window), mode)
    }
}
