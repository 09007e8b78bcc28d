//! Structural validation of tournament schedules.
//!
//! Checks the three hard invariants of a round-robin schedule, each
//! independently, and reports every violation found:
//! - All-pairs-once: every unordered pair of teams meets exactly once
//! - Once-per-week: every week is a perfect matching of the teams
//! - Period cap: no team plays more than twice in the same period
//!
//! The validator never mutates its input and never stops at the first
//! failure; all three checks always run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::generator::periods::PERIOD_CAP;
use crate::models::{Cell, Schedule, Team, TeamPair};

/// Outcome of validating a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `true` iff `violations` is empty.
    pub valid: bool,
    /// Violations in check order: pairs, then weeks, then periods.
    pub violations: Vec<Violation>,
}

/// Which invariant a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A pair met twice or never.
    AllPairsOnce,
    /// A team is absent from, or repeated in, a week.
    OncePerWeek,
    /// A team exceeds the per-period cap.
    PeriodCap,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolationKind::AllPairsOnce => "all-pairs-once",
            ViolationKind::OncePerWeek => "once-per-week",
            ViolationKind::PeriodCap => "period-cap",
        };
        f.write_str(name)
    }
}

/// A single invariant violation, with enough detail to locate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    /// `pair` is played in more than one cell.
    DuplicatePair { pair: TeamPair, cells: Vec<Cell> },
    /// `pair` is never played.
    MissingPair { pair: TeamPair },
    /// `week` is not a perfect matching.
    WeekNotPerfect {
        week: u32,
        /// Teams playing more than once that week.
        repeated: Vec<Team>,
        /// Teams not playing that week.
        missing: Vec<Team>,
    },
    /// `team` plays `count` games in `period`.
    PeriodCapExceeded { team: Team, period: u32, count: u32 },
}

impl Violation {
    /// Invariant broken.
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::DuplicatePair { .. } | Violation::MissingPair { .. } => {
                ViolationKind::AllPairsOnce
            }
            Violation::WeekNotPerfect { .. } => ViolationKind::OncePerWeek,
            Violation::PeriodCapExceeded { .. } => ViolationKind::PeriodCap,
        }
    }

    /// Teams named by this violation.
    pub fn teams(&self) -> Vec<Team> {
        match self {
            Violation::DuplicatePair { pair, .. } | Violation::MissingPair { pair } => {
                vec![pair.low(), pair.high()]
            }
            Violation::WeekNotPerfect {
                repeated, missing, ..
            } => repeated.iter().chain(missing).copied().collect(),
            Violation::PeriodCapExceeded { team, .. } => vec![*team],
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicatePair { pair, cells } => {
                let cells: Vec<String> = cells.iter().map(Cell::to_string).collect();
                write!(f, "[{}] pair {pair} played {} times: {}", self.kind(), cells.len(), cells.join("; "))
            }
            Violation::MissingPair { pair } => {
                write!(f, "[{}] pair {pair} never played", self.kind())
            }
            Violation::WeekNotPerfect {
                week,
                repeated,
                missing,
            } => {
                write!(
                    f,
                    "[{}] week {week}: repeated {}, missing {}",
                    self.kind(),
                    team_list(repeated),
                    team_list(missing)
                )
            }
            Violation::PeriodCapExceeded {
                team,
                period,
                count,
            } => write!(
                f,
                "[{}] team {team} plays {count} times in period {period} (cap {PERIOD_CAP})",
                self.kind()
            ),
        }
    }
}

fn team_list(teams: &[Team]) -> String {
    if teams.is_empty() {
        return "none".to_string();
    }
    let ids: Vec<String> = teams.iter().map(Team::to_string).collect();
    format!("[{}]", ids.join(", "))
}

/// Checks schedules against the round-robin invariants.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintValidator;

impl ConstraintValidator {
    /// Validates a schedule.
    ///
    /// Runs, in order and unconditionally:
    /// 1. [`check_pairs`](Self::check_pairs)
    /// 2. [`check_weeks`](Self::check_weeks)
    /// 3. [`check_periods`](Self::check_periods)
    pub fn validate(schedule: &Schedule) -> ValidationReport {
        let mut violations = Self::check_pairs(schedule);
        violations.extend(Self::check_weeks(schedule));
        violations.extend(Self::check_periods(schedule));

        ValidationReport {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// All-pairs-once: each pair of `K_n` is played in exactly one cell.
    ///
    /// Reports, in pair order, every pair played more than once (with all
    /// its cells) and every pair never played.
    pub fn check_pairs(schedule: &Schedule) -> Vec<Violation> {
        let played = schedule.pairs();
        let mut violations = Vec::new();

        for pair in TeamPair::complete(schedule.n()) {
            match played.get(&pair) {
                None => violations.push(Violation::MissingPair { pair }),
                Some(cells) if cells.len() > 1 => violations.push(Violation::DuplicatePair {
                    pair,
                    cells: cells.clone(),
                }),
                Some(_) => {}
            }
        }
        violations
    }

    /// Once-per-week: every team plays exactly once in every week.
    ///
    /// One violation per offending week.
    pub fn check_weeks(schedule: &Schedule) -> Vec<Violation> {
        let n = schedule.n();
        let mut violations = Vec::new();

        for (week, games) in schedule.by_week() {
            let mut seen = vec![0u32; n as usize];
            for game in games {
                for team in game.teams() {
                    seen[team.index()] += 1;
                }
            }
            let repeated: Vec<Team> = Team::all(n).filter(|t| seen[t.index()] > 1).collect();
            let missing: Vec<Team> = Team::all(n).filter(|t| seen[t.index()] == 0).collect();
            if !repeated.is_empty() || !missing.is_empty() {
                violations.push(Violation::WeekNotPerfect {
                    week,
                    repeated,
                    missing,
                });
            }
        }
        violations
    }

    /// Period cap: each team appears at most twice in each period.
    pub fn check_periods(schedule: &Schedule) -> Vec<Violation> {
        let n = schedule.n();
        let mut violations = Vec::new();

        for period in 1..=schedule.periods() {
            let mut count = vec![0u32; n as usize];
            for game in schedule.period(period) {
                for team in game.teams() {
                    count[team.index()] += 1;
                }
            }
            for team in Team::all(n) {
                if count[team.index()] > PERIOD_CAP {
                    violations.push(Violation::PeriodCapExceeded {
                        team,
                        period,
                        count: count[team.index()],
                    });
                }
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CircleMethodGenerator;
    use crate::models::Game;

    fn generated(n: i64) -> Schedule {
        CircleMethodGenerator::new(n).unwrap().generate()
    }

    fn replace_team(game: &Game, from: Team, to: Team) -> Game {
        let swap = |t: Team| if t == from { to } else { t };
        Game::new(swap(game.home), swap(game.away))
    }

    fn cell_of(schedule: &Schedule, week: u32, team: Team) -> (Cell, Game) {
        schedule
            .games()
            .find(|(c, g)| c.week == week && g.involves(team))
            .map(|(c, g)| (c, *g))
            .unwrap()
    }

    #[test]
    fn test_generated_schedule_is_valid() {
        let report = ConstraintValidator::validate(&generated(8));
        assert!(report.valid);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schedule = generated(4);
        assert_eq!(
            ConstraintValidator::validate(&schedule),
            ConstraintValidator::validate(&schedule)
        );
    }

    #[test]
    fn test_four_teams_only_break_period_cap() {
        let report = ConstraintValidator::validate(&generated(4));
        assert!(!report.valid);
        assert!(report
            .violations
            .iter()
            .all(|v| v.kind() == ViolationKind::PeriodCap));
        assert!(report.violations.iter().any(|v| matches!(
            v,
            Violation::PeriodCapExceeded { count: 3, .. }
        )));
    }

    #[test]
    fn test_team_repeated_in_one_week_and_missing_in_another() {
        let schedule = generated(8);
        let three = Team(3);

        // A team X whose week-2 game is not against 3 and whose week-4
        // game does not pit it against 3 either.
        let other = Team::all(8)
            .filter(|&t| t != three)
            .find(|&t| {
                let (_, g2) = cell_of(&schedule, 2, t);
                let (_, g4) = cell_of(&schedule, 4, three);
                !g2.involves(three) && !g4.involves(t)
            })
            .unwrap();

        let (c2, g2) = cell_of(&schedule, 2, other);
        let (c4, g4) = cell_of(&schedule, 4, three);
        let broken = schedule
            .with_game(c2, replace_team(&g2, other, three))
            .unwrap()
            .with_game(c4, replace_team(&g4, three, other))
            .unwrap();

        let weekly = ConstraintValidator::check_weeks(&broken);
        assert_eq!(weekly.len(), 2);
        assert_eq!(
            weekly[0],
            Violation::WeekNotPerfect {
                week: 2,
                repeated: vec![three],
                missing: vec![other],
            }
        );
        assert_eq!(
            weekly[1],
            Violation::WeekNotPerfect {
                week: 4,
                repeated: vec![other],
                missing: vec![three],
            }
        );
        assert!(weekly.iter().all(|v| v.teams().contains(&three)));

        let report = ConstraintValidator::validate(&broken);
        assert!(!report.valid);
        assert_eq!(
            report
                .violations
                .iter()
                .filter(|v| v.kind() == ViolationKind::OncePerWeek)
                .count(),
            2
        );
    }

    #[test]
    fn test_duplicate_and_missing_pair() {
        let schedule = generated(6);
        let first = *schedule.game(1, 1).unwrap();
        let target = *schedule.game(2, 1).unwrap();
        let broken = schedule.with_game(Cell::new(2, 1), first).unwrap();

        let pairs = ConstraintValidator::check_pairs(&broken);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&Violation::DuplicatePair {
            pair: first.pair(),
            cells: vec![Cell::new(1, 1), Cell::new(2, 1)],
        }));
        assert!(pairs.contains(&Violation::MissingPair {
            pair: target.pair()
        }));
    }

    #[test]
    fn test_all_checks_always_run() {
        // Overwrite a whole week with copies of its first game: breaks
        // pairs and the week at once; both must be reported.
        let schedule = generated(6);
        let first = *schedule.game(1, 1).unwrap();
        let broken = schedule
            .with_game(Cell::new(1, 2), first)
            .unwrap()
            .with_game(Cell::new(1, 3), first)
            .unwrap();

        let report = ConstraintValidator::validate(&broken);
        let kinds: Vec<ViolationKind> = report.violations.iter().map(Violation::kind).collect();
        assert!(kinds.contains(&ViolationKind::AllPairsOnce));
        assert!(kinds.contains(&ViolationKind::OncePerWeek));
        // Pairs first, then weeks.
        let first_week = kinds
            .iter()
            .position(|k| *k == ViolationKind::OncePerWeek)
            .unwrap();
        assert!(kinds[..first_week]
            .iter()
            .all(|k| *k == ViolationKind::AllPairsOnce));
    }

    #[test]
    fn test_period_cap_detail() {
        let report = ConstraintValidator::validate(&generated(4));
        let v = report.violations.first().unwrap();
        let text = v.to_string();
        assert!(text.starts_with("[period-cap] team "));
        assert!(text.contains("(cap 2)"));
    }

    #[test]
    fn test_swap_keeps_structure() {
        let schedule = generated(10);
        let game = *schedule.game(3, 2).unwrap();
        let swapped = schedule.with_game(Cell::new(3, 2), game.swapped()).unwrap();
        assert!(ConstraintValidator::validate(&swapped).valid);
    }
}
