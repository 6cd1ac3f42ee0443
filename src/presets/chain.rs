use serde::{Deserialize, Serialize};
use std::fmt;

use super::registry::Preset;

const FILTER_Q: f64 = 1.0;
const COMPRESSOR_KNEE_DB: f64 = 30.0;
const COMPRESSOR_ATTACK_S: f64 = 0.003;
const COMPRESSOR_RELEASE_S: f64 = 0.25;

/// Manual adjustments layered over a preset ("custom" settings).
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ProcessingOverrides {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub noise_gate_db: Option<f64>,
    pub low_cut_hz: Option<f64>,
    pub high_cut_hz: Option<f64>,
    pub compression_ratio: Option<f64>,
    pub gain: Option<f64>,
}

impl Default for ProcessingOverrides {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            noise_gate_db: None,
            low_cut_hz: None,
            high_cut_hz: None,
            compression_ratio: None,
            gain: None,
        }
    }
}

fn default_enabled() -> bool { true }

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    pub frequency_hz: f64,
    pub q: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressorSettings {
    pub threshold_db: f64,
    pub knee_db: f64,
    pub ratio: f64,
    pub attack_s: f64,
    pub release_s: f64,
}

/// Parameters the host's processing graph applies, in signal order:
/// high-pass, low-pass, compressor, gain. With `enabled` off the input goes
/// straight to the analyser.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSettings {
    pub enabled: bool,
    pub high_pass: FilterSettings,
    pub low_pass: FilterSettings,
    pub compressor: CompressorSettings,
    pub gain: f64,
}

impl ChainSettings {
    pub fn from_preset(preset: &Preset) -> Self {
        Self {
            enabled: true,
            high_pass: FilterSettings {
                frequency_hz: preset.low_cut_hz,
                q: FILTER_Q,
            },
            low_pass: FilterSettings {
                frequency_hz: preset.high_cut_hz,
                q: FILTER_Q,
            },
            compressor: CompressorSettings {
                threshold_db: preset.noise_gate_db,
                knee_db: COMPRESSOR_KNEE_DB,
                ratio: preset.compression_ratio,
                attack_s: COMPRESSOR_ATTACK_S,
                release_s: COMPRESSOR_RELEASE_S,
            },
            gain: preset.gain,
        }
    }

    /// Settings after auto-apply: the preset replaces every manual value and
    /// only the bypass switch is carried over.
    pub fn auto_applied(preset: &Preset, overrides: &ProcessingOverrides) -> Self {
        Self {
            enabled: overrides.enabled,
            ..Self::from_preset(preset)
        }
    }

    pub fn with_overrides(mut self, overrides: &ProcessingOverrides) -> Self {
        self.enabled = overrides.enabled;
        if let Some(v) = overrides.noise_gate_db {
            self.compressor.threshold_db = v;
        }
        if let Some(v) = overrides.low_cut_hz {
            self.high_pass.frequency_hz = v;
        }
        if let Some(v) = overrides.high_cut_hz {
            self.low_pass.frequency_hz = v;
        }
        if let Some(v) = overrides.compression_ratio {
            self.compressor.ratio = v;
        }
        if let Some(v) = overrides.gain {
            self.gain = v;
        }
        self
    }
}

impl fmt::Display for ChainSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return write!(f, "Processing: bypassed");
        }
        writeln!(f, "Noise Gate:   {}dB", self.compressor.threshold_db)?;
        writeln!(f, "Low Cut:      {}Hz", self.high_pass.frequency_hz)?;
        writeln!(f, "High Cut:     {}Hz", self.low_pass.frequency_hz)?;
        writeln!(f, "Compressor:   {}:1", self.compressor.ratio)?;
        write!(f, "Gain:         {}x", self.gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::registry::PresetKey;

    #[test]
    fn preset_maps_onto_chain() {
        let chain = ChainSettings::from_preset(PresetKey::OfficeAc.preset());
        assert!(chain.enabled);
        assert_eq!(chain.high_pass.frequency_hz, 120.0);
        assert_eq!(chain.low_pass.frequency_hz, 12000.0);
        assert_eq!(chain.compressor.threshold_db, -35.0);
        assert_eq!(chain.compressor.ratio, 6.0);
        assert_eq!(chain.compressor.knee_db, 30.0);
        assert_eq!(chain.gain, 1.5);
    }

    #[test]
    fn auto_apply_keeps_only_the_bypass_switch() {
        let preset = PresetKey::Car.preset();
        let manual = ProcessingOverrides {
            enabled: false,
            noise_gate_db: Some(-10.0),
            low_cut_hz: Some(500.0),
            high_cut_hz: Some(2000.0),
            compression_ratio: Some(20.0),
            gain: Some(3.0),
        };

        let applied = ChainSettings::auto_applied(preset, &manual);
        let expected = ChainSettings {
            enabled: false,
            ..ChainSettings::from_preset(preset)
        };
        assert_eq!(applied, expected);

        let enabled = ChainSettings::auto_applied(preset, &ProcessingOverrides::default());
        assert_eq!(enabled, ChainSettings::from_preset(preset));
    }

    #[test]
    fn json_keys_are_camel_case() {
        let json = serde_json::to_string(&ChainSettings::from_preset(PresetKey::Studio.preset()))
            .unwrap();
        assert!(json.contains("\"highPass\""));
        assert!(json.contains("\"frequencyHz\""));
        assert!(json.contains("\"thresholdDb\""));
        assert!(!json.contains("high_pass"));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let overrides = ProcessingOverrides {
            enabled: true,
            low_cut_hz: Some(90.0),
            gain: Some(1.0),
            ..Default::default()
        };
        let chain = ChainSettings::from_preset(PresetKey::Car.preset()).with_overrides(&overrides);
        assert_eq!(chain.high_pass.frequency_hz, 90.0);
        assert_eq!(chain.gain, 1.0);
        assert_eq!(chain.low_pass.frequency_hz, 9000.0);
        assert_eq!(chain.compressor.ratio, 7.0);
    }

    #[test]
    fn disabled_chain_reads_as_bypassed() {
        let overrides = ProcessingOverrides {
            enabled: false,
            ..Default::default()
        };
        let chain = ChainSettings::from_preset(PresetKey::Studio.preset()).with_overrides(&overrides);
        assert_eq!(chain.to_string(), "Processing: bypassed");
    }

    #[test]
    fn display_uses_control_units() {
        let chain = ChainSettings::from_preset(PresetKey::Studio.preset());
        let text = chain.to_string();
        assert!(text.contains("Noise Gate:   -50dB"));
        assert!(text.contains("Compressor:   2.5:1"));
        assert!(text.contains("Gain:         1.2x"));
    }
}
