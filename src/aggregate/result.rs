//! Serialized solver results.
//!
//! One JSON file per instance, named `<n>.json`, mapping each experiment
//! to its outcome:
//!
//! ```json
//! {
//!   "cp_base": { "time": 3, "optimal": true, "obj": "None", "sol": [[[1, 2]]] },
//!   "mip_opt": { "time": 300, "optimal": false, "obj": null, "sol": [] }
//! }
//! ```
//!
//! `sol[p][w]` is the `[home, away]` game of period `p+1`, week `w+1`; an
//! empty `sol` means no solution was found. `obj` is an integer in
//! optimization mode and `"None"` (or `null`) otherwise.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ParseError;
use crate::models::{ObjectiveRecord, ScheduleTable};

/// One experiment's outcome on one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    /// Team count `n`; unknown only for an empty table without a file
    /// name hint.
    pub instance: Option<i64>,
    /// Experiment (solver/model) name.
    pub experiment: String,
    /// Reported solve time in seconds.
    pub time_secs: f64,
    /// Whether the solver claims optimality.
    pub optimal: bool,
    /// Claimed objective; present only in optimization mode.
    pub objective: Option<i64>,
    /// Period-row schedule; empty when no solution was found.
    pub table: ScheduleTable,
}

#[derive(Deserialize)]
struct RawEntry {
    time: f64,
    #[serde(default)]
    optimal: bool,
    #[serde(default)]
    obj: Value,
    #[serde(default)]
    sol: ScheduleTable,
}

impl SolverResult {
    /// Creates a satisfaction-mode result.
    pub fn new(instance: i64, experiment: impl Into<String>, table: ScheduleTable) -> Self {
        Self {
            instance: Some(instance),
            experiment: experiment.into(),
            time_secs: 0.0,
            optimal: false,
            objective: None,
            table,
        }
    }

    /// Sets the reported solve time.
    pub fn with_time(mut self, secs: f64) -> Self {
        self.time_secs = secs;
        self
    }

    /// Switches to optimization mode with a claimed objective.
    pub fn with_objective(mut self, objective: i64, optimal: bool) -> Self {
        self.objective = Some(objective);
        self.optimal = optimal;
        self
    }

    /// Whether this result claims an objective.
    pub fn optimization(&self) -> bool {
        self.objective.is_some()
    }

    /// Claimed objective record, in optimization mode.
    pub fn objective_record(&self) -> Option<ObjectiveRecord> {
        self.objective
            .map(|objective| ObjectiveRecord::new(objective, self.optimal))
    }

    /// Parses one experiment entry.
    ///
    /// `instance` comes from the file name when known; otherwise the
    /// highest team id in the table is taken as `n`. An empty table needs
    /// no `n` and keeps the instance unknown.
    ///
    /// # Errors
    /// [`ParseError::Json`] for a malformed entry, [`ParseError::Field`]
    /// for an unusable `obj` or `time`, [`ParseError::UnknownInstance`]
    /// when a non-empty table gives no `n`.
    pub fn from_entry(
        instance: Option<i64>,
        experiment: &str,
        entry: &Value,
    ) -> Result<Self, ParseError> {
        let raw: RawEntry = serde_json::from_value(entry.clone())?;
        if !raw.time.is_finite() || raw.time < 0.0 {
            return Err(ParseError::Field {
                field: "time",
                message: format!("expected a non-negative number, got {}", raw.time),
            });
        }
        let objective = parse_objective(&raw.obj)?;
        let instance = if raw.sol.is_empty() {
            instance
        } else {
            let n = instance
                .or_else(|| raw.sol.max_team())
                .ok_or_else(|| ParseError::UnknownInstance(experiment.to_string()))?;
            Some(n)
        };

        Ok(Self {
            instance,
            experiment: experiment.to_string(),
            time_secs: raw.time,
            optimal: raw.optimal,
            objective,
            table: raw.sol,
        })
    }
}

fn parse_objective(obj: &Value) -> Result<Option<i64>, ParseError> {
    match obj {
        Value::Null => Ok(None),
        Value::String(s) if s == "None" => Ok(None),
        Value::Number(num) => num.as_i64().map(Some).ok_or_else(|| ParseError::Field {
            field: "obj",
            message: format!("expected an integer, got {num}"),
        }),
        other => Err(ParseError::Field {
            field: "obj",
            message: format!("expected an integer or \"None\", got {other}"),
        }),
    }
}

/// A result as loaded: parsed, or the reason it could not be.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRecord {
    Parsed(SolverResult),
    Unparsed {
        /// Team count, when the file name gives it.
        instance: Option<i64>,
        /// Experiment, when the failure is confined to one entry.
        experiment: Option<String>,
        /// File the record came from.
        source: String,
        /// Parse error text.
        error: String,
    },
}

impl ResultRecord {
    /// Instance the record belongs to, if known.
    pub fn instance(&self) -> Option<i64> {
        match self {
            ResultRecord::Parsed(result) => result.instance,
            ResultRecord::Unparsed { instance, .. } => *instance,
        }
    }

    /// Experiment name; empty for whole-file failures.
    pub fn experiment(&self) -> &str {
        match self {
            ResultRecord::Parsed(result) => &result.experiment,
            ResultRecord::Unparsed { experiment, .. } => experiment.as_deref().unwrap_or(""),
        }
    }
}

impl From<SolverResult> for ResultRecord {
    fn from(result: SolverResult) -> Self {
        ResultRecord::Parsed(result)
    }
}

/// Loader for result files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultFile;

impl ResultFile {
    /// Parses the content of one result file.
    ///
    /// Never fails as a whole: a document that is not a JSON object
    /// becomes a single [`ResultRecord::Unparsed`], a bad entry becomes an
    /// `Unparsed` record for that experiment only. Records come out in
    /// experiment order.
    pub fn parse(source: &str, instance: Option<i64>, content: &str) -> Vec<ResultRecord> {
        let entries: BTreeMap<String, Value> = match serde_json::from_str(content) {
            Ok(entries) => entries,
            Err(e) => {
                let error = if serde_json::from_str::<Value>(content).is_ok() {
                    ParseError::Field {
                        field: "<root>",
                        message: "expected an object of experiments".to_string(),
                    }
                } else {
                    ParseError::from(e)
                };
                warn!("{source}: {error}");
                return vec![unparsed(source, instance, None, error)];
            }
        };

        entries
            .iter()
            .map(
                |(experiment, entry)| match SolverResult::from_entry(instance, experiment, entry) {
                    Ok(result) => ResultRecord::Parsed(result),
                    Err(e) => {
                        warn!("{source} [{experiment}]: {e}");
                        unparsed(source, instance, Some(experiment.as_str()), e)
                    }
                },
            )
            .collect()
    }

    /// Loads one result file. The instance size is read from a numeric
    /// file stem (`6.json`), else inferred per entry.
    pub fn load<P: AsRef<Path>>(path: P) -> Vec<ResultRecord> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let instance = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i64>().ok());

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&source, instance, &content),
            Err(e) => {
                let error = ParseError::Io {
                    path: path.to_path_buf(),
                    source: e,
                };
                warn!("{error}");
                vec![unparsed(&source, instance, None, error)]
            }
        }
    }

    /// Loads every `*.json` file of a directory, in file-name order.
    ///
    /// # Errors
    /// [`ParseError::Io`] if the directory itself cannot be listed.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<ResultRecord>, ParseError> {
        let dir = dir.as_ref();
        let io_error = |source| ParseError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        Ok(files.iter().flat_map(Self::load).collect())
    }
}

fn unparsed(
    source: &str,
    instance: Option<i64>,
    experiment: Option<&str>,
    error: ParseError,
) -> ResultRecord {
    ResultRecord::Unparsed {
        instance,
        experiment: experiment.map(str::to_string),
        source: source.to_string(),
        error: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SIX: &str = r#"{
        "cp": {
            "time": 1,
            "optimal": true,
            "obj": "None",
            "sol": [
                [[6, 1], [5, 4], [2, 4], [3, 5], [3, 2]],
                [[5, 2], [1, 3], [6, 3], [6, 4], [4, 1]],
                [[4, 3], [6, 2], [1, 5], [2, 1], [6, 5]]
            ]
        },
        "mip": { "time": 300, "optimal": false, "obj": null, "sol": [] },
        "sat_opt": { "time": 2.5, "optimal": true, "obj": 6, "sol": [] }
    }"#;

    #[test]
    fn test_parse_entries() {
        let records = ResultFile::parse("6.json", Some(6), SIX);
        assert_eq!(records.len(), 3);

        let ResultRecord::Parsed(cp) = &records[0] else {
            panic!("cp should parse");
        };
        assert_eq!(cp.instance, Some(6));
        assert_eq!(cp.experiment, "cp");
        assert!(!cp.optimization());
        assert_eq!(cp.table.game_count(), 15);

        let ResultRecord::Parsed(mip) = &records[1] else {
            panic!("mip should parse");
        };
        assert!(mip.table.is_empty());
        assert_eq!(mip.time_secs, 300.0);

        let ResultRecord::Parsed(sat) = &records[2] else {
            panic!("sat_opt should parse");
        };
        assert_eq!(sat.objective_record(), Some(ObjectiveRecord::new(6, true)));
    }

    #[test]
    fn test_instance_inferred_from_table() {
        let records = ResultFile::parse("results.json", None, SIX);
        assert_eq!(records[0].instance(), Some(6));
        // Empty table and no file name hint: still a result, size unknown.
        let ResultRecord::Parsed(mip) = &records[1] else {
            panic!("mip should parse, got {:?}", records[1]);
        };
        assert_eq!(mip.instance, None);
        assert!(mip.table.is_empty());
    }

    #[test]
    fn test_unknown_instance_needs_games() {
        let content = r#"{ "odd": { "time": 1, "obj": "None", "sol": [[]] } }"#;
        let records = ResultFile::parse("results.json", None, content);
        let ResultRecord::Parsed(odd) = &records[0] else {
            panic!("expected parsed, got {:?}", records[0]);
        };
        assert_eq!(odd.instance, None);

        let content = r#"{ "cp": { "time": 1, "obj": "None", "sol": [[[2, 1]]] } }"#;
        let records = ResultFile::parse("results.json", None, content);
        assert_eq!(records[0].instance(), Some(2));
    }

    #[test]
    fn test_bad_entry_is_isolated() {
        let content = r#"{
            "good": { "time": 1, "optimal": false, "obj": "None", "sol": [[[1, 2]]] },
            "bad": { "time": 1, "optimal": false, "obj": "seven", "sol": [] },
            "worse": { "optimal": false }
        }"#;
        let records = ResultFile::parse("2.json", Some(2), content);
        assert_eq!(records.len(), 3);
        match &records[0] {
            ResultRecord::Unparsed {
                experiment, error, ..
            } => {
                assert_eq!(experiment.as_deref(), Some("bad"));
                assert!(error.contains("obj"));
            }
            other => panic!("expected unparsed, got {other:?}"),
        }
        assert!(matches!(records[1], ResultRecord::Parsed(_)));
        assert!(matches!(records[2], ResultRecord::Unparsed { .. }));
    }

    #[test]
    fn test_non_object_document() {
        let records = ResultFile::parse("4.json", Some(4), "[1, 2, 3]");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].instance(), Some(4));
        assert_eq!(records[0].experiment(), "");

        let records = ResultFile::parse("4.json", Some(4), "{ not json");
        match &records[0] {
            ResultRecord::Unparsed { error, .. } => assert!(error.starts_with("invalid result JSON")),
            other => panic!("expected unparsed, got {other:?}"),
        }
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("6.json"), SIX).unwrap();
        let mut bad = fs::File::create(dir.path().join("8.json")).unwrap();
        write!(bad, "{{").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = ResultFile::load_dir(dir.path()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3].instance(), Some(8));
        assert!(matches!(records[3], ResultRecord::Unparsed { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let records = ResultFile::load(dir.path().join("10.json"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].instance(), Some(10));
        match &records[0] {
            ResultRecord::Unparsed { error, .. } => assert!(error.starts_with("failed to read")),
            other => panic!("expected unparsed, got {other:?}"),
        }
    }

    #[test]
    fn test_load_dir_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ResultFile::load_dir(dir.path().join("absent")),
            Err(ParseError::Io { .. })
        ));
    }
}
