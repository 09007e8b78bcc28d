//! Claimed objective of an optimization-mode result.

use serde::{Deserialize, Serialize};

/// Objective value and optimality flag reported by a solver.
///
/// The objective is the sum over teams of `|home − away|`. Optimality is
/// taken on trust; only consistency with the realized schedule is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveRecord {
    /// Claimed objective value.
    pub objective: i64,
    /// Whether the solver proved the value optimal.
    pub optimal: bool,
}

impl ObjectiveRecord {
    /// Creates a record.
    pub fn new(objective: i64, optimal: bool) -> Self {
        Self { objective, optimal }
    }
}
