//! Home/away fairness of a schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Team imbalance | `|H − A|` for one team |
//! | Total imbalance | Sum of team imbalances (the optimization objective) |
//! | Max imbalance | Largest team imbalance |
//!
//! Every team plays `n-1` games, an odd number, so each team's imbalance
//! is at least 1 and the total at least `n`. [`HomeAwayBalancer`] reaches
//! that bound without touching pairs or cells.
//!
//! # Reference
//! de Werra (1981), "Scheduling in sports", on breaks and home/away
//! patterns.

pub mod balance;
mod imbalance;

pub use balance::HomeAwayBalancer;
pub use imbalance::{ImbalanceEvaluator, ImbalanceReport, TeamBalance};
