use serde::{Deserialize, Serialize};

use crate::audio::features::SegmentFeatures;
use crate::error::CodeFormatError;

pub const GRID_SIZE: usize = 16;
pub const FORMAT_VERSION: &str = "1.0";
pub const CODE_TYPE: &str = "audio-visual-code";

/// Calibration applied to the blended features before clamping.
const FEATURE_SCALE: f64 = 10.0;
/// Decay applied to a cell copied from its up-left neighbour.
const FILL_DECAY: f64 = 0.8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetadata {
    /// Seconds
    pub duration: f64,
    pub sample_rate: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl CodeMetadata {
    pub fn new(duration: f64, sample_rate: u32, timestamp: i64) -> Self {
        Self {
            duration,
            sample_rate,
            timestamp,
            version: FORMAT_VERSION.to_string(),
            kind: CODE_TYPE.to_string(),
        }
    }

    /// Local wall-clock time of `timestamp`, or the raw milliseconds when they
    /// fall outside the representable range.
    pub fn generated_at(&self) -> String {
        match jiff::Timestamp::from_millisecond(self.timestamp) {
            Ok(ts) => ts
                .to_zoned(jiff::tz::TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
                .to_string(),
            Err(_) => self.timestamp.to_string(),
        }
    }
}

/// 16×16 intensity grid, row-major, values in [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeGrid {
    pub grid: Vec<Vec<f64>>,
    pub metadata: CodeMetadata,
}

pub fn normalize(value: f64) -> f64 {
    (value * FEATURE_SCALE).clamp(0.0, 1.0)
}

/// Build the grid from per-segment features.
///
/// Cell `(i, j)` takes segment `i * 16 + j` when it exists. Otherwise it takes
/// 0.8 × the cell at `(max(i-1, 0), max(j-1, 0))`, which the row-major fill has
/// already visited, or 0 if that cell is the current one.
pub fn encode(features: &[SegmentFeatures], metadata: CodeMetadata) -> CodeGrid {
    let mut cells: [[Option<f64>; GRID_SIZE]; GRID_SIZE] = [[None; GRID_SIZE]; GRID_SIZE];

    for i in 0..GRID_SIZE {
        for j in 0..GRID_SIZE {
            let index = i * GRID_SIZE + j;
            let value = match features.get(index) {
                Some(segment) => normalize(segment.code_weight()),
                None => {
                    let neighbour = cells[i.saturating_sub(1)][j.saturating_sub(1)];
                    neighbour.map_or(0.0, |v| v * FILL_DECAY)
                }
            };
            cells[i][j] = Some(value);
        }
    }

    let grid = cells
        .iter()
        .map(|row| row.iter().map(|c| c.unwrap_or(0.0)).collect())
        .collect();

    CodeGrid { grid, metadata }
}

impl CodeGrid {
    pub fn cell(&self, row: usize, col: usize) -> f64 {
        self.grid[row][col]
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse an exported code. Only the grid shape is binding; a different
    /// format version is reported but accepted.
    pub fn from_json(text: &str) -> Result<LoadedCode, CodeFormatError> {
        let code: CodeGrid = serde_json::from_str(text)?;

        let rows = code.grid.len();
        if let Some(bad) = code.grid.iter().find(|row| row.len() != GRID_SIZE) {
            return Err(CodeFormatError::GridSize {
                rows,
                cols: bad.len(),
                expected: GRID_SIZE,
            });
        }
        if rows != GRID_SIZE {
            return Err(CodeFormatError::GridSize {
                rows,
                cols: GRID_SIZE,
                expected: GRID_SIZE,
            });
        }

        let compatibility = if code.metadata.version == FORMAT_VERSION {
            Compatibility::Exact
        } else {
            log::warn!(
                "Code format version {} differs from supported {}; reading it anyway",
                code.metadata.version,
                FORMAT_VERSION
            );
            Compatibility::VersionMismatch(code.metadata.version.clone())
        };

        Ok(LoadedCode {
            code,
            compatibility,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Compatibility {
    Exact,
    VersionMismatch(String),
}

#[derive(Clone, Debug)]
pub struct LoadedCode {
    pub code: CodeGrid,
    pub compatibility: Compatibility,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(rms: f64, zcr: f64, energy: f64) -> SegmentFeatures {
        SegmentFeatures {
            rms,
            zero_crossing_rate: zcr,
            spectral_centroid_hz: 1000.0,
            energy,
        }
    }

    fn meta() -> CodeMetadata {
        CodeMetadata::new(2.5, 44_100, 1_700_000_000_000)
    }

    #[test]
    fn normalize_scales_and_clamps() {
        assert!((normalize(0.05) - 0.5).abs() < 1e-12);
        assert_eq!(normalize(0.5), 1.0);
        assert_eq!(normalize(-0.1), 0.0);
    }

    #[test]
    fn sixteen_segments_fill_first_row_directly() {
        let features: Vec<SegmentFeatures> =
            (0..16).map(|i| segment(i as f64 / 160.0, 0.0, 0.0)).collect();
        let code = encode(&features, meta());
        for j in 0..16 {
            let expected = normalize(0.4 * j as f64 / 160.0);
            assert!((code.cell(0, j) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn full_grid_needs_no_interpolation() {
        let features: Vec<SegmentFeatures> = (0..256).map(|_| segment(0.05, 0.0, 0.0)).collect();
        let code = encode(&features, meta());
        assert!(code.grid.iter().flatten().all(|&v| (v - 0.2).abs() < 1e-12));
    }

    #[test]
    fn missing_cells_decay_from_up_left() {
        let features: Vec<SegmentFeatures> = (0..16).map(|_| segment(0.25, 0.0, 0.0)).collect();
        let code = encode(&features, meta());

        // row 0 is real: 10 * 0.4 * 0.25 = 1.0
        assert_eq!(code.cell(0, 5), 1.0);
        // (1, 0) copies (0, 0)
        assert!((code.cell(1, 0) - 0.8).abs() < 1e-12);
        // diagonal cascade compounds
        assert!((code.cell(1, 1) - 0.8).abs() < 1e-12);
        assert!((code.cell(2, 2) - 0.8f64.powi(2)).abs() < 1e-12);
        assert!((code.cell(3, 3) - 0.8f64.powi(3)).abs() < 1e-12);
        // column 0 keeps decaying straight down
        assert!((code.cell(4, 0) - 0.8f64.powi(4)).abs() < 1e-12);
    }

    #[test]
    fn partial_row_decays_along_the_row() {
        let features = vec![segment(0.25, 0.0, 0.0), segment(0.125, 0.0, 0.0)];
        let code = encode(&features, meta());

        assert_eq!(code.cell(0, 0), 1.0);
        assert!((code.cell(0, 1) - 0.5).abs() < 1e-12);
        // (0, 2) and (0, 3) take their left neighbour on the top row
        assert!((code.cell(0, 2) - 0.4).abs() < 1e-12);
        assert!((code.cell(0, 3) - 0.32).abs() < 1e-12);
    }

    #[test]
    fn no_segments_gives_blank_grid() {
        let code = encode(&[], meta());
        assert!(code.grid.iter().flatten().all(|&v| v == 0.0));
        assert_eq!(code.grid.len(), 16);
    }

    #[test]
    fn metadata_is_copied_verbatim() {
        let code = encode(&[], meta());
        assert_eq!(code.metadata.duration, 2.5);
        assert_eq!(code.metadata.sample_rate, 44_100);
        assert_eq!(code.metadata.timestamp, 1_700_000_000_000);
        assert_eq!(code.metadata.version, "1.0");
        assert_eq!(code.metadata.kind, "audio-visual-code");
    }

    #[test]
    fn generated_at_falls_back_to_raw_millis() {
        let mut metadata = meta();
        assert!(metadata.generated_at().starts_with("2023-11-1"));
        metadata.timestamp = i64::MAX;
        assert_eq!(metadata.generated_at(), i64::MAX.to_string());
    }

    #[test]
    fn json_uses_exported_field_names() {
        let json = encode(&[], meta()).to_json().unwrap();
        assert!(json.contains("\"sampleRate\": 44100"));
        assert!(json.contains("\"type\": \"audio-visual-code\""));
        let loaded = CodeGrid::from_json(&json).unwrap();
        assert_eq!(loaded.compatibility, Compatibility::Exact);
    }

    #[test]
    fn newer_version_is_accepted_with_flag() {
        let mut code = encode(&[], meta());
        code.metadata.version = "1.1".into();
        let loaded = CodeGrid::from_json(&code.to_json().unwrap()).unwrap();
        assert_eq!(loaded.compatibility, Compatibility::VersionMismatch("1.1".into()));
    }

    #[test]
    fn wrong_grid_size_is_rejected() {
        let mut code = encode(&[], meta());
        code.grid.pop();
        let err = CodeGrid::from_json(&code.to_json().unwrap()).unwrap_err();
        assert!(matches!(err, CodeFormatError::GridSize { rows: 15, .. }));

        let mut code = encode(&[], meta());
        code.grid[3].push(0.0);
        let err = CodeGrid::from_json(&code.to_json().unwrap()).unwrap_err();
        assert!(matches!(err, CodeFormatError::GridSize { cols: 17, .. }));
    }
}
