use serde::Serialize;
use std::fmt;

use super::spectrum::{Band, BandLevels};

const BAR_WIDTH: usize = 20;
const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';
/// Scale used for the band rows of the report.
const BAR_MIN_DB: f64 = -60.0;
const BAR_MAX_DB: f64 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl Quality {
    pub fn label(self) -> &'static str {
        match self {
            Quality::Excellent => "Excellent (Studio quality)",
            Quality::Good => "Good (Clean recording)",
            Quality::Fair => "Fair (Some processing needed)",
            Quality::Poor => "Poor (Heavy processing required)",
            Quality::VeryPoor => "Very Poor (Consider different location)",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First matching tier wins; the tiers overlap.
pub fn quality(avg: f64, range: f64) -> Quality {
    if avg < -35.0 && range > 30.0 {
        Quality::Excellent
    } else if avg < -25.0 && range > 25.0 {
        Quality::Good
    } else if avg < -15.0 && range > 20.0 {
        Quality::Fair
    } else if avg < -10.0 {
        Quality::Poor
    } else {
        Quality::VeryPoor
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
    LowFrequencyNoise,
    MidLowNoise,
    HighFrequencyNoise,
    LowDynamicRange,
    HighAmbientNoise,
    VeryQuiet,
    /// Reported alone when nothing else fires
    Clean,
}

impl Issue {
    pub fn message(self) -> &'static str {
        match self {
            Issue::LowFrequencyNoise => "Heavy low-frequency noise (AC, traffic, rumble)",
            Issue::MidLowNoise => "Mid-low noise (voices, machinery)",
            Issue::HighFrequencyNoise => "High-frequency noise (insects, electronics)",
            Issue::LowDynamicRange => "Low dynamic range (compressed/noisy)",
            Issue::HighAmbientNoise => "High ambient noise level",
            Issue::VeryQuiet => "Very quiet environment",
            Issue::Clean => "Relatively clean environment",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Independent threshold checks over the band levels. `mid` and `mid_high`
/// take no part in any check.
pub fn diagnose(
    low: f64,
    mid_low: f64,
    _mid: f64,
    _mid_high: f64,
    high: f64,
    avg: f64,
    range: f64,
) -> Vec<Issue> {
    let checks = [
        (low > -20.0, Issue::LowFrequencyNoise),
        (mid_low > -15.0, Issue::MidLowNoise),
        (high > -10.0, Issue::HighFrequencyNoise),
        (range < 20.0, Issue::LowDynamicRange),
        (avg > -10.0, Issue::HighAmbientNoise),
        (avg < -40.0, Issue::VeryQuiet),
    ];

    let issues: Vec<Issue> = checks
        .iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, issue)| *issue)
        .collect();

    if issues.is_empty() {
        vec![Issue::Clean]
    } else {
        issues
    }
}

/// Fixed-width bar for `value` on a linear `[min, max]` scale.
pub fn bar_chart(value: f64, min: f64, max: f64) -> String {
    let normalized = ((value - min) / (max - min)).clamp(0.0, 1.0);
    let filled = (normalized * BAR_WIDTH as f64).round() as usize;
    let mut bar = String::with_capacity(BAR_WIDTH * 3);
    bar.extend(std::iter::repeat(BAR_FILLED).take(filled));
    bar.extend(std::iter::repeat(BAR_EMPTY).take(BAR_WIDTH - filled));
    bar
}

/// Everything the diagnostic text block shows.
#[derive(Clone, Debug, Serialize)]
pub struct EnvironmentReport {
    pub levels: BandLevels,
    pub quality: Quality,
    pub issues: Vec<Issue>,
}

impl EnvironmentReport {
    pub fn new(levels: BandLevels) -> Self {
        let issues = diagnose(
            levels.low,
            levels.mid_low,
            levels.mid,
            levels.mid_high,
            levels.high,
            levels.average,
            levels.dynamic_range,
        );
        Self {
            quality: quality(levels.average, levels.dynamic_range),
            levels,
            issues,
        }
    }
}

impl fmt::Display for EnvironmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Environment Analysis Results:")?;
        writeln!(f, "{}", "─".repeat(32))?;
        writeln!(f, "Frequency Band Analysis:")?;
        for band in Band::ALL {
            let value = self.levels.get(band);
            writeln!(
                f,
                "{:<24}{:.1} dB  {}",
                format!("{}:", band.label()),
                value,
                bar_chart(value, BAR_MIN_DB, BAR_MAX_DB)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Overall Metrics:")?;
        writeln!(f, "{:<24}{:.1} dB", "Average Level:", self.levels.average)?;
        writeln!(f, "{:<24}{:.1} dB", "Dynamic Range:", self.levels.dynamic_range)?;
        writeln!(f, "{:<24}{}", "Environment Quality:", self.quality)?;
        writeln!(f)?;
        write!(f, "Detected Issues:")?;
        for issue in &self.issues {
            write!(f, "\n• {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(low: f64, mid_low: f64, mid: f64, mid_high: f64, high: f64, range: f64) -> BandLevels {
        BandLevels {
            low,
            mid_low,
            mid,
            mid_high,
            high,
            average: (low + mid_low + mid + mid_high + high) / 5.0,
            dynamic_range: range,
        }
    }

    #[test]
    fn quality_takes_first_matching_tier() {
        // satisfies every tier; must stop at the first
        assert_eq!(quality(-40.0, 40.0), Quality::Excellent);
        assert_eq!(quality(-40.0, 28.0), Quality::Good);
        assert_eq!(quality(-30.0, 40.0), Quality::Good);
        assert_eq!(quality(-20.0, 22.0), Quality::Fair);
        assert_eq!(quality(-40.0, 5.0), Quality::Poor);
        assert_eq!(quality(-12.0, 50.0), Quality::Poor);
        assert_eq!(quality(-10.0, 50.0), Quality::VeryPoor);
        assert_eq!(quality(-5.0, 0.0), Quality::VeryPoor);
    }

    #[test]
    fn quality_boundaries_are_strict() {
        assert_eq!(quality(-35.0, 31.0), Quality::Good);
        assert_eq!(quality(-36.0, 30.0), Quality::Good);
    }

    #[test]
    fn issues_are_independent() {
        let issues = diagnose(-10.0, -10.0, -5.0, -5.0, -5.0, -5.0, 10.0);
        assert_eq!(
            issues,
            vec![
                Issue::LowFrequencyNoise,
                Issue::MidLowNoise,
                Issue::HighFrequencyNoise,
                Issue::LowDynamicRange,
                Issue::HighAmbientNoise,
            ]
        );
    }

    #[test]
    fn quiet_room_reports_only_quiet() {
        let issues = diagnose(-50.0, -50.0, -50.0, -50.0, -50.0, -50.0, 35.0);
        assert_eq!(issues, vec![Issue::VeryQuiet]);
    }

    #[test]
    fn nothing_fired_is_clean() {
        let issues = diagnose(-30.0, -30.0, -30.0, -30.0, -30.0, -30.0, 25.0);
        assert_eq!(issues, vec![Issue::Clean]);
    }

    #[test]
    fn bar_chart_ratio() {
        assert_eq!(bar_chart(-60.0, -60.0, 0.0), "░".repeat(20));
        assert_eq!(bar_chart(0.0, -60.0, 0.0), "█".repeat(20));
        assert_eq!(bar_chart(-30.0, -60.0, 0.0), format!("{}{}", "█".repeat(10), "░".repeat(10)));
        // clamped outside the scale
        assert_eq!(bar_chart(-96.0, -60.0, 0.0), "░".repeat(20));
        assert_eq!(bar_chart(12.0, -60.0, 0.0), "█".repeat(20));
    }

    #[test]
    fn report_layout() {
        let report = EnvironmentReport::new(levels(-30.0, -40.0, -45.0, -50.0, -55.0, 35.0));
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Environment Analysis Results:");
        assert_eq!(lines[1], "─".repeat(32));
        assert_eq!(lines[2], "Frequency Band Analysis:");
        assert_eq!(
            lines[3],
            format!("Low Freq (0-100Hz):     -30.0 dB  {}{}", "█".repeat(10), "░".repeat(10))
        );
        assert!(lines[4].starts_with("Mid-Low (100-300Hz):    -40.0 dB  "));
        assert!(lines[5].starts_with("Mid Freq (300-800Hz):   -45.0 dB  "));
        assert!(lines[6].starts_with("Mid-High (800-1200Hz):  -50.0 dB  "));
        assert!(lines[7].starts_with("High Freq (1200Hz+):    -55.0 dB  "));
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "Overall Metrics:");
        assert_eq!(lines[10], "Average Level:          -44.0 dB");
        assert_eq!(lines[11], "Dynamic Range:          35.0 dB");
        assert_eq!(lines[12], "Environment Quality:    Excellent (Studio quality)");
        assert_eq!(lines[13], "");
        assert_eq!(lines[14], "Detected Issues:");
        assert_eq!(lines[15], "• Very quiet environment");
        assert_eq!(lines.len(), 16);
    }
}
