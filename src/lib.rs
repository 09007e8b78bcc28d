//! Sports tournament scheduling for the U-Engine ecosystem.
//!
//! Generates and verifies single round-robin schedules: `n` teams (even),
//! `n-1` weeks, `n/2` periods per week, every pair meeting exactly once,
//! every team playing once per week and at most twice in any period.
//! How a schedule is found (CP, SAT, SMT, MIP) is out of scope; this crate
//! encodes the problem's semantics once, independently of any solver.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Team`, `Game`, `Cell`, `Schedule`, `ObjectiveRecord`
//! - **`generator`**: Circle-method construction with period assignment
//! - **`validation`**: Constraint checks (pairs, weeks, period cap)
//! - **`evaluation`**: Home/away imbalance objective and balancing
//! - **`aggregate`**: Verdicts over batches of serialized solver results
//! - **`config`**: Checker settings (TOML)
//!
//! # Example
//! ```
//! use u_tournament::evaluation::{HomeAwayBalancer, ImbalanceEvaluator};
//! use u_tournament::generator::CircleMethodGenerator;
//! use u_tournament::validation::ConstraintValidator;
//!
//! let schedule = CircleMethodGenerator::new(12).unwrap().generate();
//! assert!(ConstraintValidator::validate(&schedule).valid);
//!
//! let balanced = HomeAwayBalancer::balance(&schedule);
//! assert_eq!(ImbalanceEvaluator::evaluate(&balanced), Ok(12));
//! ```
//!
//! # References
//!
//! - de Werra (1981), "Scheduling in sports"
//! - Schellenberg, van Rees & Vanstone (1977), "The existence of balanced
//!   tournament designs"
//! - Rasmussen & Trick (2008), "Round robin scheduling: a survey"

pub mod aggregate;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod generator;
pub mod models;
pub mod validation;
