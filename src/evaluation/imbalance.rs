//! Imbalance objective and cross-check against claimed values.

use serde::{Deserialize, Serialize};

use crate::error::EvaluateError;
use crate::models::{ObjectiveRecord, Schedule, Team};
use crate::validation::ConstraintValidator;

/// Home and away game counts of one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBalance {
    pub team: Team,
    pub home: u32,
    pub away: u32,
}

impl TeamBalance {
    /// `|home − away|`.
    pub fn imbalance(&self) -> u32 {
        self.home.abs_diff(self.away)
    }
}

/// Per-team balances with their aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImbalanceReport {
    /// One entry per team, ordered by id.
    pub teams: Vec<TeamBalance>,
    /// Sum of team imbalances.
    pub total: i64,
    /// Largest team imbalance.
    pub max: i64,
}

impl ImbalanceReport {
    fn tally(schedule: &Schedule) -> Self {
        let teams: Vec<TeamBalance> = schedule
            .home_away_counts()
            .into_iter()
            .map(|(team, home, away)| TeamBalance { team, home, away })
            .collect();
        let total = teams.iter().map(|t| i64::from(t.imbalance())).sum();
        let max = teams
            .iter()
            .map(|t| i64::from(t.imbalance()))
            .max()
            .unwrap_or(0);
        Self { teams, total, max }
    }
}

/// Computes the fairness objective of valid schedules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImbalanceEvaluator;

impl ImbalanceEvaluator {
    /// Total imbalance: `Σ |H − A|` over all teams.
    ///
    /// # Errors
    /// [`EvaluateError::Precondition`] if the schedule does not validate.
    ///
    /// # Example
    /// ```
    /// use u_tournament::evaluation::ImbalanceEvaluator;
    /// use u_tournament::models::{Schedule, ScheduleTable};
    ///
    /// let table = ScheduleTable(vec![vec![[1, 2]]]);
    /// let schedule = Schedule::from_period_rows(2, &table).unwrap();
    /// assert_eq!(ImbalanceEvaluator::evaluate(&schedule), Ok(2));
    /// ```
    pub fn evaluate(schedule: &Schedule) -> Result<i64, EvaluateError> {
        Self::report(schedule).map(|report| report.total)
    }

    /// Per-team balances, total and max.
    ///
    /// # Errors
    /// [`EvaluateError::Precondition`] if the schedule does not validate.
    pub fn report(schedule: &Schedule) -> Result<ImbalanceReport, EvaluateError> {
        let validation = ConstraintValidator::validate(schedule);
        if !validation.valid {
            return Err(EvaluateError::Precondition {
                violations: validation.violations.len(),
            });
        }
        Ok(ImbalanceReport::tally(schedule))
    }

    /// Checks a claimed objective against the realized one.
    ///
    /// Optimality is not re-proved; only the value must agree, with zero
    /// tolerance. Returns the realized objective on success.
    ///
    /// # Errors
    /// [`EvaluateError::Precondition`] as in [`evaluate`](Self::evaluate);
    /// [`EvaluateError::ObjectiveMismatch`] if the values differ.
    pub fn check(schedule: &Schedule, claimed: &ObjectiveRecord) -> Result<i64, EvaluateError> {
        let actual = Self::evaluate(schedule)?;
        if actual != claimed.objective {
            return Err(EvaluateError::ObjectiveMismatch {
                expected: claimed.objective,
                actual,
            });
        }
        Ok(actual)
    }
}
