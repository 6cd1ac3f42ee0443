use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a built-in processing preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKey {
    Studio,
    OfficeAc,
    OutdoorCicada,
    Cafe,
    Car,
    Windy,
    EchoRoom,
    PhoneCall,
}

impl PresetKey {
    pub const ALL: [PresetKey; 8] = [
        PresetKey::Studio,
        PresetKey::OfficeAc,
        PresetKey::OutdoorCicada,
        PresetKey::Cafe,
        PresetKey::Car,
        PresetKey::Windy,
        PresetKey::EchoRoom,
        PresetKey::PhoneCall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetKey::Studio => "studio",
            PresetKey::OfficeAc => "office_ac",
            PresetKey::OutdoorCicada => "outdoor_cicada",
            PresetKey::Cafe => "cafe",
            PresetKey::Car => "car",
            PresetKey::Windy => "windy",
            PresetKey::EchoRoom => "echo_room",
            PresetKey::PhoneCall => "phone_call",
        }
    }

    pub fn preset(self) -> &'static Preset {
        // PRESETS is laid out in ALL order
        &PRESETS[self as usize]
    }
}

impl fmt::Display for PresetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown preset '{}'. Valid names: {}",
                    s,
                    PresetKey::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

/// A named bundle of noise-processing parameters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub key: PresetKey,
    pub name: &'static str,
    pub noise_gate_db: f64,
    pub low_cut_hz: f64,
    pub high_cut_hz: f64,
    pub compression_ratio: f64,
    pub gain: f64,
    pub description: &'static str,
}

pub static PRESETS: [Preset; 8] = [
    Preset {
        key: PresetKey::Studio,
        name: "Studio (Quiet Room)",
        noise_gate_db: -50.0,
        low_cut_hz: 60.0,
        high_cut_hz: 18000.0,
        compression_ratio: 2.5,
        gain: 1.2,
        description: "Minimal processing for clean studio environment",
    },
    Preset {
        key: PresetKey::OfficeAc,
        name: "Office with AC",
        noise_gate_db: -35.0,
        low_cut_hz: 120.0,
        high_cut_hz: 12000.0,
        compression_ratio: 6.0,
        gain: 1.5,
        description: "Aggressive low-cut to remove AC hum, moderate compression",
    },
    Preset {
        key: PresetKey::OutdoorCicada,
        name: "Outdoor (Cicadas)",
        noise_gate_db: -25.0,
        low_cut_hz: 200.0,
        high_cut_hz: 8000.0,
        compression_ratio: 8.0,
        gain: 2.0,
        description: "Heavy filtering for high-frequency insect noise",
    },
    Preset {
        key: PresetKey::Cafe,
        name: "Cafe/Restaurant",
        noise_gate_db: -30.0,
        low_cut_hz: 150.0,
        high_cut_hz: 10000.0,
        compression_ratio: 5.0,
        gain: 1.8,
        description: "Mid-range focus, background chatter suppression",
    },
    Preset {
        key: PresetKey::Car,
        name: "Car Interior",
        noise_gate_db: -28.0,
        low_cut_hz: 180.0,
        high_cut_hz: 9000.0,
        compression_ratio: 7.0,
        gain: 2.2,
        description: "Road noise and engine rumble removal",
    },
    Preset {
        key: PresetKey::Windy,
        name: "Windy Outdoor",
        noise_gate_db: -20.0,
        low_cut_hz: 300.0,
        high_cut_hz: 12000.0,
        compression_ratio: 10.0,
        gain: 2.5,
        description: "Extreme low-cut for wind noise, heavy compression",
    },
    Preset {
        key: PresetKey::EchoRoom,
        name: "Echo Room/Hall",
        noise_gate_db: -45.0,
        low_cut_hz: 100.0,
        high_cut_hz: 15000.0,
        compression_ratio: 3.0,
        gain: 1.3,
        description: "Moderate settings preserving natural reverb",
    },
    Preset {
        key: PresetKey::PhoneCall,
        name: "Phone Call Quality",
        noise_gate_db: -35.0,
        low_cut_hz: 300.0,
        high_cut_hz: 3400.0,
        compression_ratio: 12.0,
        gain: 2.8,
        description: "Narrow bandwidth for clear speech transmission",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_key_order() {
        for key in PresetKey::ALL {
            assert_eq!(key.preset().key, key);
        }
    }

    #[test]
    fn keys_round_trip_through_strings() {
        for key in PresetKey::ALL {
            assert_eq!(key.as_str().parse::<PresetKey>().unwrap(), key);
        }
        assert!("custom".parse::<PresetKey>().is_err());
    }

    #[test]
    fn cutoffs_are_ordered() {
        for preset in &PRESETS {
            assert!(preset.low_cut_hz < preset.high_cut_hz, "{}", preset.name);
            assert!(preset.noise_gate_db < 0.0);
            assert!(preset.compression_ratio >= 1.0);
        }
    }

    #[test]
    fn phone_call_is_narrowband() {
        let p = PresetKey::PhoneCall.preset();
        assert_eq!(p.low_cut_hz, 300.0);
        assert_eq!(p.high_cut_hz, 3400.0);
        assert_eq!(p.name, "Phone Call Quality");
    }
}
