//! Circle-method round-robin generation.
//!
//! Builds a reference schedule for `n` teams without solving anything:
//! pairings come from the circle method, periods from the strategy chain
//! in [`periods`], and home/away from a fixed parity rule.
//!
//! # Algorithm
//!
//! 1. Working array `[n, 1, 2, …, n-1]`. In each week pair position `i`
//!    with position `n-1-i`; then rotate positions `1..n-1` by one
//!    (position 1 takes the previous last team). Team `n` never moves.
//! 2. Assign periods (rotation, starter, greedy, search; first that keeps
//!    every team at most twice per period).
//! 3. Lower id is home in odd weeks, higher id in even weeks.
//!
//! Every unordered pair occurs exactly once over the `n-1` weeks and every
//! week is a perfect matching, by construction.
//!
//! # Complexity
//! O(n²) for pairings, rotation, starter and greedy. The search only runs
//! when those fail (`n ≡ 4 (mod 6)`), is bounded by a node budget, and is
//! skipped above [`MAX_SEARCH_TEAMS`](periods::MAX_SEARCH_TEAMS).
//!
//! # Reference
//! Kirkman (1847); see de Werra (1981), "Scheduling in sports".

pub mod periods;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::models::{Game, Schedule, Team};
use self::periods::{
    Pairings, PeriodAssignment, PeriodStrategy, SearchOutcome, MAX_SEARCH_TEAMS, PERIOD_CAP,
};

/// Default node budget of the search strategy.
pub const DEFAULT_SEARCH_BUDGET: u64 = 200_000;

/// Deterministic circle-method schedule generator.
///
/// # Example
/// ```
/// use u_tournament::generator::CircleMethodGenerator;
/// use u_tournament::validation::ConstraintValidator;
///
/// let schedule = CircleMethodGenerator::new(6).unwrap().generate();
/// assert_eq!(schedule.game_count(), 15);
/// assert!(ConstraintValidator::validate(&schedule).valid);
/// ```
#[derive(Debug, Clone)]
pub struct CircleMethodGenerator {
    n: u32,
    search_budget: u64,
}

/// How a generated schedule came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Strategy whose period assignment was kept.
    pub strategy: PeriodStrategy,
    /// Highest number of games any team plays in one period.
    pub max_period_load: u32,
    /// Whether the period cap holds.
    pub capped: bool,
}

impl CircleMethodGenerator {
    /// Creates a generator for `n` teams.
    ///
    /// # Errors
    /// [`GenerateError::UnsupportedSize`] if `n` is odd or not positive.
    pub fn new(n: i64) -> Result<Self, GenerateError> {
        if n <= 0 || n % 2 != 0 {
            return Err(GenerateError::UnsupportedSize(n));
        }
        let n = u32::try_from(n).map_err(|_| GenerateError::UnsupportedSize(n))?;
        Ok(Self {
            n,
            search_budget: DEFAULT_SEARCH_BUDGET,
        })
    }

    /// Sets the node budget of the search strategy.
    pub fn with_search_budget(mut self, budget: u64) -> Self {
        self.search_budget = budget;
        self
    }

    /// Team count.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Weekly matchups before period assignment.
    ///
    /// `pairings()[w][k]` pairs array positions `k` and `n-1-k` in week
    /// `w+1`; matchup 0 always involves team `n`.
    pub fn pairings(&self) -> Pairings {
        let n = self.n as usize;
        let mut ring: Vec<u32> = std::iter::once(self.n).chain(1..self.n).collect();
        let mut weeks = Vec::with_capacity(n - 1);

        for _ in 1..n {
            weeks.push(
                (0..n / 2)
                    .map(|i| (Team(ring[i]), Team(ring[n - 1 - i])))
                    .collect(),
            );
            ring = rotate(&ring);
        }
        weeks
    }

    /// Generates the schedule.
    pub fn generate(&self) -> Schedule {
        self.generate_with_report().0
    }

    /// Generates the schedule and reports which strategy produced it.
    pub fn generate_with_report(&self) -> (Schedule, GenerationReport) {
        let pairings = self.pairings();
        let (assignment, report) = self.assign_periods(&pairings);
        (self.build(&pairings, &assignment), report)
    }

    fn assign_periods(&self, pairings: &Pairings) -> (PeriodAssignment, GenerationReport) {
        let n = self.n;
        let mut best: Option<(PeriodAssignment, GenerationReport, u32)> = None;

        let constructive: [(PeriodStrategy, fn(u32, &Pairings) -> PeriodAssignment); 3] = [
            (PeriodStrategy::Rotation, periods::rotation),
            (PeriodStrategy::Starter, periods::starter),
            (PeriodStrategy::Greedy, periods::greedy),
        ];
        for (strategy, assign) in constructive {
            let assignment = assign(n, pairings);
            let load = periods::load_of(n, pairings, &assignment);
            let report = GenerationReport {
                strategy,
                max_period_load: load.max(),
                capped: load.max() <= PERIOD_CAP,
            };
            debug!("n={n}: {strategy} period assignment, max load {}", load.max());
            if report.capped {
                return (assignment, report);
            }
            let excess = load.excess();
            if best
                .as_ref()
                .map_or(true, |(_, b, e)| (report.max_period_load, excess) < (b.max_period_load, *e))
            {
                best = Some((assignment, report, excess));
            }
        }

        if n <= MAX_SEARCH_TEAMS {
            match periods::search(n, pairings, self.search_budget) {
                SearchOutcome::Found(assignment) => {
                    let load = periods::load_of(n, pairings, &assignment);
                    debug!("n={n}: search found a capped period assignment");
                    let report = GenerationReport {
                        strategy: PeriodStrategy::Search,
                        max_period_load: load.max(),
                        capped: true,
                    };
                    return (assignment, report);
                }
                SearchOutcome::Infeasible => {
                    warn!("n={n}: no period assignment keeps every team within {PERIOD_CAP} games per period");
                }
                SearchOutcome::BudgetExhausted => {
                    warn!("n={n}: period search gave up after {} nodes", self.search_budget);
                }
            }
        }

        // Constructive strategies always yield a candidate.
        let (assignment, report, _) = best.unwrap_or_else(|| {
            let assignment = periods::greedy(n, pairings);
            let max = periods::load_of(n, pairings, &assignment).max();
            let report = GenerationReport {
                strategy: PeriodStrategy::Greedy,
                max_period_load: max,
                capped: false,
            };
            (assignment, report, 0)
        });
        warn!(
            "n={n}: falling back to {} assignment with max period load {}",
            report.strategy, report.max_period_load
        );
        (assignment, report)
    }

    fn build(&self, pairings: &Pairings, assignment: &PeriodAssignment) -> Schedule {
        let periods = (self.n / 2) as usize;
        let mut grid = vec![Game::new(Team(1), Team(2)); pairings.len() * periods];

        for (w, (matchups, slots)) in pairings.iter().zip(assignment).enumerate() {
            let week = w as u32 + 1;
            for (&(a, b), &period) in matchups.iter().zip(slots) {
                grid[w * periods + period] = designate(week, a, b);
            }
        }
        Schedule::from_grid(self.n, grid)
    }
}

/// One step of the circle: position 0 stays, position 1 takes the last
/// team, everything else shifts right.
fn rotate(ring: &[u32]) -> Vec<u32> {
    let last = ring.len() - 1;
    let mut next = Vec::with_capacity(ring.len());
    next.push(ring[0]);
    next.push(ring[last]);
    next.extend_from_slice(&ring[1..last]);
    next
}

/// Parity rule: lower id at home in odd weeks, higher id in even weeks.
fn designate(week: u32, a: Team, b: Team) -> Game {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    if week % 2 == 1 {
        Game::new(low, high)
    } else {
        Game::new(high, low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamPair;
    use crate::validation::ConstraintValidator;
    use std::collections::BTreeSet;

    #[test]
    fn test_rejects_odd_and_non_positive() {
        assert_eq!(
            CircleMethodGenerator::new(5).unwrap_err(),
            GenerateError::UnsupportedSize(5)
        );
        assert!(CircleMethodGenerator::new(0).is_err());
        assert!(CircleMethodGenerator::new(-2).is_err());
    }

    #[test]
    fn test_pairings_first_weeks() {
        let p = CircleMethodGenerator::new(6).unwrap().pairings();
        assert_eq!(p.len(), 5);
        // [6, 1, 2, 3, 4, 5]
        assert_eq!(
            p[0],
            vec![(Team(6), Team(5)), (Team(1), Team(4)), (Team(2), Team(3))]
        );
        // [6, 5, 1, 2, 3, 4]
        assert_eq!(
            p[1],
            vec![(Team(6), Team(4)), (Team(5), Team(3)), (Team(1), Team(2))]
        );
    }

    #[test]
    fn test_pairings_cover_complete_graph() {
        for n in [2u32, 4, 6, 8, 10, 16] {
            let p = CircleMethodGenerator::new(i64::from(n)).unwrap().pairings();
            let pairs: BTreeSet<TeamPair> =
                p.iter().flatten().map(|&(a, b)| TeamPair::new(a, b)).collect();
            assert_eq!(pairs.len(), (n * (n - 1) / 2) as usize);
            for week in &p {
                let teams: BTreeSet<Team> = week.iter().flat_map(|&(a, b)| [a, b]).collect();
                assert_eq!(teams.len(), n as usize);
            }
        }
    }

    #[test]
    fn test_rotate_is_pure_copy() {
        let ring = vec![6, 1, 2, 3, 4, 5];
        assert_eq!(rotate(&ring), vec![6, 5, 1, 2, 3, 4]);
        assert_eq!(ring, vec![6, 1, 2, 3, 4, 5]);
        assert_eq!(rotate(&[2, 1]), vec![2, 1]);
    }

    #[test]
    fn test_parity_designation() {
        assert_eq!(designate(1, Team(5), Team(2)), Game::new(Team(2), Team(5)));
        assert_eq!(designate(2, Team(5), Team(2)), Game::new(Team(5), Team(2)));
        assert_eq!(designate(3, Team(2), Team(5)), Game::new(Team(2), Team(5)));
    }

    #[test]
    fn test_generated_schedules_validate() {
        for n in [2i64, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 28] {
            let (schedule, report) = CircleMethodGenerator::new(n).unwrap().generate_with_report();
            let validation = ConstraintValidator::validate(&schedule);
            assert!(validation.valid, "n={n}: {:?}", validation.violations);
            assert!(report.capped);
            assert!(report.max_period_load <= PERIOD_CAP);
        }
    }

    #[test]
    fn test_strategy_selection() {
        let strategy = |n| {
            CircleMethodGenerator::new(n)
                .unwrap()
                .generate_with_report()
                .1
                .strategy
        };
        assert_eq!(strategy(2), PeriodStrategy::Rotation);
        assert_eq!(strategy(6), PeriodStrategy::Starter);
        assert_eq!(strategy(12), PeriodStrategy::Starter);
        assert_eq!(strategy(10), PeriodStrategy::Search);
        assert_eq!(strategy(16), PeriodStrategy::Search);
        assert_eq!(strategy(22), PeriodStrategy::Search);
    }

    #[test]
    fn test_four_teams_best_effort() {
        let (schedule, report) = CircleMethodGenerator::new(4).unwrap().generate_with_report();
        assert_eq!(schedule.game_count(), 6);
        assert_eq!(schedule.pair_set().len(), 6);
        assert!(!report.capped);
        assert_eq!(report.max_period_load, 3);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let g = CircleMethodGenerator::new(10).unwrap();
        assert_eq!(g.generate(), g.generate());
    }

    #[test]
    fn test_home_away_sums() {
        let schedule = CircleMethodGenerator::new(8).unwrap().generate();
        for (_, home, away) in schedule.home_away_counts() {
            assert_eq!(home + away, 7);
        }
    }
}
