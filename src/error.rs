use thiserror::Error;

/// Failures reported by the collaborators that feed the analysis core.
///
/// Each variant maps to a stable category string so callers can branch on it
/// without matching on the message text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    #[error("source exhausted at {at:.2}s (buffer is {length:.2}s long)")]
    Exhausted { at: f64, length: f64 },
}

impl SourceError {
    pub fn category(&self) -> &'static str {
        match self {
            SourceError::Unavailable(_) => "source unavailable",
            SourceError::DecodeFailed(_) => "decode failed",
            SourceError::Exhausted { .. } => "source exhausted",
        }
    }
}

/// Why a sample window could not be completed.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("insufficient samples: collected {collected} of {expected} (cancelled)")]
    Cancelled { collected: usize, expected: usize },
    #[error("insufficient samples: plan of {duration_ms}ms every {interval_ms}ms takes no snapshots")]
    EmptyPlan { interval_ms: u64, duration_ms: u64 },
    #[error("insufficient samples: collected {collected} of {expected} ({source})")]
    Source {
        collected: usize,
        expected: usize,
        #[source]
        source: SourceError,
    },
}

impl CollectError {
    pub fn collected(&self) -> usize {
        match self {
            CollectError::Cancelled { collected, .. } | CollectError::Source { collected, .. } => {
                *collected
            }
            CollectError::EmptyPlan { .. } => 0,
        }
    }
}

/// Problems with an exported visual code that make it unusable.
#[derive(Debug, Error)]
pub enum CodeFormatError {
    #[error("malformed code file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported grid size {rows}x{cols} (expected {expected}x{expected})")]
    GridSize {
        rows: usize,
        cols: usize,
        expected: usize,
    },
}
