//! Batch verdicts over solver results.
//!
//! Each result is judged on its own: parse, build the schedule, validate,
//! cross-check the objective in optimization mode, then check the solve
//! time. A failing result never affects another, and the report is sorted
//! by `(instance, experiment)` so it does not depend on input order.
//!
//! # Verdicts
//!
//! | Verdict | When |
//! |---------|------|
//! | `Pass` | Valid schedule, consistent objective, within the time limit |
//! | `NoSolution` | Empty table (no solution found, typically a timeout) |
//! | `Fail(format_error)` | Unreadable file, bad entry or malformed schedule |
//! | `Fail(invalid_schedule)` | At least one constraint violation |
//! | `Fail(objective_mismatch)` | Claimed objective differs from the realized one |
//! | `Fail(time_limit_exceeded)` | Reported time above the configured limit |

mod result;

pub use result::{ResultFile, ResultRecord, SolverResult};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::CheckerConfig;
use crate::error::EvaluateError;
use crate::evaluation::ImbalanceEvaluator;
use crate::models::Schedule;
use crate::validation::ConstraintValidator;

/// Why a result failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailKind {
    FormatError,
    InvalidSchedule,
    ObjectiveMismatch,
    TimeLimitExceeded,
}

impl fmt::Display for FailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailKind::FormatError => "format_error",
            FailKind::InvalidSchedule => "invalid_schedule",
            FailKind::ObjectiveMismatch => "objective_mismatch",
            FailKind::TimeLimitExceeded => "time_limit_exceeded",
        };
        f.write_str(name)
    }
}

/// Outcome for one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    NoSolution,
    Fail { kind: FailKind, detail: String },
}

impl Verdict {
    fn fail(kind: FailKind, detail: impl Into<String>) -> Self {
        Verdict::Fail {
            kind,
            detail: detail.into(),
        }
    }

    /// Whether this is a `Fail`.
    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::NoSolution => f.write_str("NO SOLUTION"),
            Verdict::Fail { kind, detail } => write!(f, "FAIL({kind}): {detail}"),
        }
    }
}

/// Verdict of one (instance, experiment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultVerdict {
    /// Team count, when known.
    pub instance: Option<i64>,
    /// Experiment name; empty for whole-file failures.
    pub experiment: String,
    /// Realized objective, when the result is in optimization mode and
    /// its schedule is valid.
    pub objective: Option<i64>,
    pub verdict: Verdict,
}

/// Verdict counts of one experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub experiment: String,
    pub passed: usize,
    pub no_solution: usize,
    pub failed: usize,
}

/// Sorted verdicts with per-experiment counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub verdicts: Vec<ResultVerdict>,
    pub summary: Vec<ExperimentSummary>,
}

impl AggregateReport {
    fn new(mut verdicts: Vec<ResultVerdict>) -> Self {
        verdicts.sort_by(|a, b| {
            (a.instance, &a.experiment, &a.verdict.to_string())
                .cmp(&(b.instance, &b.experiment, &b.verdict.to_string()))
        });

        let mut by_experiment: BTreeMap<&str, ExperimentSummary> = BTreeMap::new();
        for v in &verdicts {
            let entry = by_experiment
                .entry(v.experiment.as_str())
                .or_insert_with(|| ExperimentSummary {
                    experiment: v.experiment.clone(),
                    ..ExperimentSummary::default()
                });
            match v.verdict {
                Verdict::Pass => entry.passed += 1,
                Verdict::NoSolution => entry.no_solution += 1,
                Verdict::Fail { .. } => entry.failed += 1,
            }
        }
        let summary = by_experiment.into_values().collect();

        Self { verdicts, summary }
    }

    /// Whether no result failed. `NoSolution` does not count as a failure.
    pub fn all_passed(&self) -> bool {
        !self.verdicts.iter().any(|v| v.verdict.is_fail())
    }

    /// Failing verdicts, in report order.
    pub fn failures(&self) -> impl Iterator<Item = &ResultVerdict> {
        self.verdicts.iter().filter(|v| v.verdict.is_fail())
    }

    /// Plain-text rendering.
    pub fn render(&self) -> String {
        let mut report = String::new();
        report.push_str("=== STS results ===\n\n");
        report.push_str(&format!(
            "{:<8} {:<24} {:>6} {}\n",
            "n", "Experiment", "Obj", "Verdict"
        ));
        report.push_str(&"-".repeat(60));
        report.push('\n');

        for v in &self.verdicts {
            let instance = v.instance.map_or_else(|| "?".to_string(), |n| n.to_string());
            let objective = v.objective.map_or_else(|| "-".to_string(), |o| o.to_string());
            report.push_str(&format!(
                "{:<8} {:<24} {:>6} {}\n",
                instance, v.experiment, objective, v.verdict
            ));
        }

        report.push_str("\nSummary:\n");
        report.push_str(&format!(
            "{:<24} {:>6} {:>6} {:>6}\n",
            "Experiment", "Pass", "None", "Fail"
        ));
        for s in &self.summary {
            report.push_str(&format!(
                "{:<24} {:>6} {:>6} {:>6}\n",
                s.experiment, s.passed, s.no_solution, s.failed
            ));
        }
        report
    }
}

/// Judges batches of results.
///
/// # Example
/// ```
/// use u_tournament::aggregate::{FailKind, ResultAggregator, SolverResult, Verdict};
/// use u_tournament::config::CheckerConfig;
/// use u_tournament::models::ScheduleTable;
///
/// let result = SolverResult::new(2, "mip_opt", ScheduleTable(vec![vec![[1, 2]]]))
///     .with_objective(0, true);
/// let report = ResultAggregator::new(CheckerConfig::default()).run(vec![result.into()]);
///
/// assert_eq!(
///     report.verdicts[0].verdict,
///     Verdict::Fail {
///         kind: FailKind::ObjectiveMismatch,
///         detail: "expected=0, actual=2".to_string(),
///     }
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    config: CheckerConfig,
}

impl ResultAggregator {
    /// Creates an aggregator.
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Judges every record and builds the report.
    ///
    /// Runs on the rayon pool when `config.parallel` is set; the result is
    /// identical either way.
    pub fn run(&self, records: Vec<ResultRecord>) -> AggregateReport {
        let verdicts: Vec<ResultVerdict> = if self.config.parallel {
            records.par_iter().map(|r| self.judge(r)).collect()
        } else {
            records.iter().map(|r| self.judge(r)).collect()
        };

        let report = AggregateReport::new(verdicts);
        info!(
            "judged {} result(s): {} failure(s)",
            report.verdicts.len(),
            report.failures().count()
        );
        report
    }

    /// Judges a single record.
    pub fn judge(&self, record: &ResultRecord) -> ResultVerdict {
        let (objective, verdict) = match record {
            ResultRecord::Unparsed { source, error, .. } => (
                None,
                Verdict::fail(FailKind::FormatError, format!("{source}: {error}")),
            ),
            ResultRecord::Parsed(result) => self.judge_result(result),
        };
        debug!(
            "n={:?} [{}]: {verdict}",
            record.instance(),
            record.experiment()
        );

        ResultVerdict {
            instance: record.instance(),
            experiment: record.experiment().to_string(),
            objective,
            verdict,
        }
    }

    fn judge_result(&self, result: &SolverResult) -> (Option<i64>, Verdict) {
        if result.table.is_empty() {
            return (None, Verdict::NoSolution);
        }

        let Some(n) = result.instance else {
            return (
                None,
                Verdict::fail(FailKind::FormatError, "team count unknown"),
            );
        };
        let schedule = match Schedule::from_period_rows(n, &result.table) {
            Ok(schedule) => schedule,
            Err(e) => return (None, Verdict::fail(FailKind::FormatError, e.to_string())),
        };

        let validation = ConstraintValidator::validate(&schedule);
        if !validation.valid {
            let detail: Vec<String> = validation.violations.iter().map(|v| v.to_string()).collect();
            return (None, Verdict::fail(FailKind::InvalidSchedule, detail.join("; ")));
        }

        let mut objective = None;
        if let Some(claimed) = result.objective_record() {
            match ImbalanceEvaluator::check(&schedule, &claimed) {
                Ok(actual) => objective = Some(actual),
                Err(EvaluateError::ObjectiveMismatch { expected, actual }) => {
                    return (
                        Some(actual),
                        Verdict::fail(
                            FailKind::ObjectiveMismatch,
                            format!("expected={expected}, actual={actual}"),
                        ),
                    );
                }
                Err(e) => return (None, Verdict::fail(FailKind::InvalidSchedule, e.to_string())),
            }
        }

        if result.time_secs > self.config.time_limit_secs {
            return (
                objective,
                Verdict::fail(
                    FailKind::TimeLimitExceeded,
                    format!(
                        "time {}s exceeds limit {}s",
                        result.time_secs, self.config.time_limit_secs
                    ),
                ),
            );
        }

        (objective, Verdict::Pass)
    }
}
