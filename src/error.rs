//! Error types.
//!
//! One enum per failure domain. Constraint violations found by the
//! validator are *not* errors: they are data carried by
//! [`ValidationReport`](crate::validation::ValidationReport).

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Team;

/// Structurally impossible schedule input (`MalformedScheduleError`).
///
/// Raised while building a [`Schedule`](crate::models::Schedule); the
/// first defect found in week/period order is reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Team count is zero or negative.
    #[error("team count must be positive, got {0}")]
    NonPositiveTeamCount(i64),

    /// Team count is odd.
    #[error("team count must be even, got {0}")]
    OddTeamCount(i64),

    /// Team count does not fit a team id.
    #[error("team count {0} is too large")]
    TeamCountTooLarge(i64),

    /// Number of (week, period) cells does not match `(n-1)·(n/2)`.
    #[error("expected {expected} cells, got {actual}")]
    CellCount { expected: usize, actual: usize },

    /// A cell lies outside the week/period grid.
    #[error("cell (week {week}, period {period}) is outside the {weeks}x{periods} grid")]
    CellOutOfRange {
        week: u32,
        period: u32,
        weeks: u32,
        periods: u32,
    },

    /// A game references a team outside `[1, n]`.
    #[error("team {team} at week {week}, period {period} is outside 1..={n}")]
    TeamOutOfRange {
        team: i64,
        week: u32,
        period: u32,
        n: u32,
    },

    /// A game pairs a team with itself.
    #[error("team {team} plays itself at week {week}, period {period}")]
    SelfPairing { team: Team, week: u32, period: u32 },
}

/// Generator given an invalid team count (`UnsupportedSizeError`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// `n` is odd or not positive.
    #[error("circle method needs a positive even team count, got {0}")]
    UnsupportedSize(i64),
}

/// Imbalance evaluation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluateError {
    /// The evaluator was called on a schedule that does not validate
    /// (`PreconditionError`).
    #[error("imbalance requires a valid schedule ({violations} violation(s) found)")]
    Precondition { violations: usize },

    /// Claimed and realized objective differ (`ObjectiveMismatchError`).
    #[error("objective mismatch: expected={expected}, actual={actual}")]
    ObjectiveMismatch { expected: i64, actual: i64 },
}

/// Failures reading serialized solver results.
#[derive(Error, Debug)]
pub enum ParseError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON is not a valid result document.
    #[error("invalid result JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field has a value outside the accepted contract.
    #[error("invalid field `{field}`: {message}")]
    Field { field: &'static str, message: String },

    /// The instance size could not be determined.
    #[error("cannot determine team count for {0}")]
    UnknownInstance(String),
}

/// Failures loading a [`CheckerConfig`](crate::config::CheckerConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML did not match the config schema.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
