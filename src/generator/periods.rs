//! Period assignment for circle-method pairings.
//!
//! Given the weekly matchups, decides which period each matchup is played
//! in so that no team appears in one period more than twice.
//!
//! # Strategies
//!
//! Tried in order; the first one that respects the cap wins.
//!
//! | Strategy | Rule |
//! |----------|------|
//! | `Rotation` | matchup `k` of week `w` → period `(k + w) mod n/2` |
//! | `Starter` | matchup `k` → period `k`, except matchup 0 and matchup `j(c)` trade places |
//! | `Greedy` | lowest resulting per-team load, ties to the lowest period |
//! | `Search` | bounded depth-first search, one period at a time, mirror-symmetric first |
//!
//! `Starter` is the 1-rotational construction over `Z_{n-1} ∪ {∞}` with
//! the patterned starter `{x, −x}`: when team `n` (∞) meets the team with
//! label `c ≠ 0`, its game moves to period `j = ±2c` (folded into
//! `1..n/2`) and matchup `j` moves to period 0. It respects the cap for
//! every even `n ≢ 4 (mod 6)`. For `n ≡ 4 (mod 6)` the search takes over;
//! it proves `n = 4` infeasible and solves every larger size up to
//! [`MAX_SEARCH_TEAMS`] within the default budget.
//!
//! # Reference
//! Schellenberg, van Rees & Vanstone (1977), "The existence of balanced
//! tournament designs", Ars Combinatoria 3.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Team, TeamPair};

/// Most games a team may play in a single period.
pub const PERIOD_CAP: u32 = 2;

/// Largest team count the search strategy is attempted for.
pub const MAX_SEARCH_TEAMS: u32 = 46;

/// Weekly matchups: `pairings[w][k]` is matchup `k` of week `w` (0-based).
pub type Pairings = Vec<Vec<(Team, Team)>>;

/// `assignment[w][k]` is the 0-based period of matchup `k` in week `w`.
pub type PeriodAssignment = Vec<Vec<usize>>;

/// How periods were assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodStrategy {
    /// Cyclic shift of the period index by week.
    Rotation,
    /// 1-rotational starter construction.
    Starter,
    /// Greedy minimisation of per-team period load.
    Greedy,
    /// Bounded backtracking search.
    Search,
}

impl fmt::Display for PeriodStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodStrategy::Rotation => "rotation",
            PeriodStrategy::Starter => "starter",
            PeriodStrategy::Greedy => "greedy",
            PeriodStrategy::Search => "search",
        };
        f.write_str(name)
    }
}

/// Per-team, per-period appearance counts.
#[derive(Debug, Clone)]
pub(crate) struct PeriodLoad {
    periods: usize,
    counts: Vec<u32>,
}

impl PeriodLoad {
    pub(crate) fn new(n: u32) -> Self {
        Self {
            periods: (n / 2) as usize,
            counts: vec![0; n as usize * (n / 2) as usize],
        }
    }

    #[inline]
    pub(crate) fn get(&self, team: Team, period: usize) -> u32 {
        self.counts[team.index() * self.periods + period]
    }

    #[inline]
    fn add(&mut self, (a, b): (Team, Team), period: usize) {
        self.counts[a.index() * self.periods + period] += 1;
        self.counts[b.index() * self.periods + period] += 1;
    }

    /// Highest count over all (team, period).
    pub(crate) fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Appearances beyond the cap, summed.
    pub(crate) fn excess(&self) -> u32 {
        self.counts
            .iter()
            .map(|&c| c.saturating_sub(PERIOD_CAP))
            .sum()
    }
}

/// Load produced by an assignment.
pub(crate) fn load_of(n: u32, pairings: &Pairings, assignment: &PeriodAssignment) -> PeriodLoad {
    let mut load = PeriodLoad::new(n);
    for (matchups, periods) in pairings.iter().zip(assignment) {
        for (&matchup, &period) in matchups.iter().zip(periods) {
            load.add(matchup, period);
        }
    }
    load
}

/// Cyclic shift of the period index by the week number.
pub(crate) fn rotation(n: u32, pairings: &Pairings) -> PeriodAssignment {
    let periods = (n / 2) as usize;
    pairings
        .iter()
        .enumerate()
        .map(|(w, matchups)| (0..matchups.len()).map(|k| (k + w) % periods).collect())
        .collect()
}

/// Starter construction; expects matchup 0 of every week to involve team `n`.
pub(crate) fn starter(n: u32, pairings: &Pairings) -> PeriodAssignment {
    let modulus = i64::from(n) - 1;
    pairings
        .iter()
        .map(|matchups| {
            let mut periods: Vec<usize> = (0..matchups.len()).collect();
            let (a, b) = matchups[0];
            let opponent = if a.id() == n { b } else { a };
            let label = i64::from(opponent.id()) - 1;
            if label != 0 {
                let doubled = (2 * label).rem_euclid(modulus);
                let j = doubled.min(modulus - doubled) as usize;
                periods.swap(0, j);
            }
            periods
        })
        .collect()
}

/// Week by week, each matchup to the free period where its busier team
/// has the fewest appearances; ties go to the lowest period.
pub(crate) fn greedy(n: u32, pairings: &Pairings) -> PeriodAssignment {
    let periods = (n / 2) as usize;
    let mut load = PeriodLoad::new(n);
    let mut assignment = Vec::with_capacity(pairings.len());

    for matchups in pairings {
        let mut free = vec![true; periods];
        let mut week = Vec::with_capacity(matchups.len());
        for &(a, b) in matchups {
            let period = (0..periods)
                .filter(|&p| free[p])
                .min_by_key(|&p| (load.get(a, p).max(load.get(b, p)), p))
                .unwrap_or(0);
            free[period] = false;
            load.add((a, b), period);
            week.push(period);
        }
        assignment.push(week);
    }
    assignment
}

/// Outcome of the bounded search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SearchOutcome {
    /// An assignment respecting the cap.
    Found(PeriodAssignment),
    /// The whole space was explored: no assignment exists for these pairings.
    Infeasible,
    /// Node budget ran out first.
    BudgetExhausted,
}

/// Depth-first search filling one period at a time.
///
/// Each period takes one unplaced matchup from every week. A team has
/// `n` slots (`n/2` periods, two each) for its `n-1` games, so in a capped
/// assignment every period holds each team exactly twice except two teams
/// that play there once, and no team plays a period once more than one
/// time. Within a period the week with the fewest playable matchups goes
/// first, preferring matchups whose teams already play in the period; a
/// branch is cut as soon as a team can no longer reach two games there
/// and has used its single allowance.
///
/// The first pass is restricted to mirror-symmetric assignments: the
/// reflection fixing teams 1 and `n` and swapping `i` with `n+1-i` maps
/// every circle week onto another one, and a week and its mirror put
/// mirrored matchups in the same period. When that pass fails, the
/// unrestricted search runs with a fresh budget and settles feasibility.
pub(crate) fn search(n: u32, pairings: &Pairings, node_budget: u64) -> SearchOutcome {
    if let Some(orbits) = mirror_orbits(n, pairings) {
        let mut state = SearchState::new(n, pairings, orbits, node_budget);
        if state.descend(0, 0) == Some(true) {
            debug!("n={n}: mirror-symmetric assignment after {} nodes", state.nodes);
            return SearchOutcome::Found(state.assignment());
        }
        debug!("n={n}: no mirror-symmetric assignment, searching all");
    }

    let mut state = SearchState::new(n, pairings, single_weeks(n, pairings), node_budget);
    match state.descend(0, 0) {
        Some(true) => SearchOutcome::Found(state.assignment()),
        Some(false) => SearchOutcome::Infeasible,
        None => SearchOutcome::BudgetExhausted,
    }
}

/// Teams that play only once in a given period.
const SINGLES_PER_PERIOD: usize = 2;

/// Weeks that are filled together.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Orbit {
    /// `(week, matchups)`: the week plays `matchups[k]` when the orbit plays `k`.
    weeks: Vec<(usize, Vec<usize>)>,
}

fn single_weeks(n: u32, pairings: &Pairings) -> Vec<Orbit> {
    let periods = (n / 2) as usize;
    (0..pairings.len())
        .map(|week| Orbit {
            weeks: vec![(week, (0..periods).collect())],
        })
        .collect()
}

/// Team 1 and team `n` stay, `i ↔ n+1-i` otherwise.
fn reflect(n: u32, team: Team) -> Team {
    if team.id() == 1 || team.id() == n {
        team
    } else {
        Team(n + 1 - team.id())
    }
}

/// Pairs every week with its mirror week; `None` if the pairings are not
/// closed under [`reflect`].
fn mirror_orbits(n: u32, pairings: &Pairings) -> Option<Vec<Orbit>> {
    let periods = (n / 2) as usize;
    let mut position = BTreeMap::new();
    for (week, matchups) in pairings.iter().enumerate() {
        for (k, &(a, b)) in matchups.iter().enumerate() {
            position.insert(TeamPair::new(a, b), (week, k));
        }
    }

    let mut seen = vec![false; pairings.len()];
    let mut orbits = Vec::new();
    for (week, matchups) in pairings.iter().enumerate() {
        if seen[week] {
            continue;
        }
        let mut mirror_week = None;
        let mut mirrored = Vec::with_capacity(matchups.len());
        for &(a, b) in matchups {
            let &(other, k) = position.get(&TeamPair::new(reflect(n, a), reflect(n, b)))?;
            if *mirror_week.get_or_insert(other) != other {
                return None;
            }
            mirrored.push(k);
        }
        let mirror = mirror_week?;

        seen[week] = true;
        let mut weeks = vec![(week, (0..periods).collect())];
        if mirror != week {
            if seen[mirror] {
                return None;
            }
            seen[mirror] = true;
            weeks.push((mirror, mirrored));
        }
        orbits.push(Orbit { weeks });
    }
    Some(orbits)
}

struct SearchState<'a> {
    pairings: &'a Pairings,
    periods: usize,
    orbits: Vec<Orbit>,
    /// `placed[w * periods + k]`: period of matchup `k` in week `w`.
    placed: Vec<Option<usize>>,
    /// Games of each team in the period being filled.
    games: Vec<u32>,
    /// Orbits already represented in the period being filled.
    covered: Vec<bool>,
    /// Teams that may still play some period only once.
    single_left: Vec<bool>,
    nodes: u64,
    budget: u64,
}

impl<'a> SearchState<'a> {
    fn new(n: u32, pairings: &'a Pairings, orbits: Vec<Orbit>, budget: u64) -> Self {
        let periods = (n / 2) as usize;
        Self {
            pairings,
            periods,
            placed: vec![None; pairings.len() * periods],
            games: vec![0; n as usize],
            covered: vec![false; orbits.len()],
            single_left: vec![true; n as usize],
            orbits,
            nodes: 0,
            budget,
        }
    }

    /// `(week, matchup)` of every member week when `orbit` plays `k`.
    fn members(&self, orbit: usize, k: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.orbits[orbit]
            .weeks
            .iter()
            .map(move |(week, matchups)| (*week, matchups[k]))
    }

    fn teams(&self, orbit: usize, k: usize) -> impl Iterator<Item = Team> + '_ {
        self.members(orbit, k).flat_map(move |(week, m)| {
            let (a, b) = self.pairings[week][m];
            [a, b]
        })
    }

    fn playable(&self, orbit: usize, k: usize) -> bool {
        if self
            .members(orbit, k)
            .any(|(week, m)| self.placed[week * self.periods + m].is_some())
        {
            return false;
        }
        self.teams(orbit, k).all(|team| {
            let extra = self.teams(orbit, k).filter(|&t| t == team).count() as u32;
            self.games[team.index()] + extra <= PERIOD_CAP
        })
    }

    fn place(&mut self, orbit: usize, k: usize, period: Option<usize>) {
        let members: Vec<(usize, usize)> = self.members(orbit, k).collect();
        for (week, m) in members {
            self.placed[week * self.periods + m] = period;
            let (a, b) = self.pairings[week][m];
            for team in [a, b] {
                if period.is_some() {
                    self.games[team.index()] += 1;
                } else {
                    self.games[team.index()] -= 1;
                }
            }
        }
        self.covered[orbit] = period.is_some();
    }

    /// Whether the period being filled can no longer be completed.
    fn doomed(&self) -> bool {
        let mut reach = self.games.clone();
        for orbit in (0..self.orbits.len()).filter(|&o| !self.covered[o]) {
            for k in (0..self.periods).filter(|&k| self.playable(orbit, k)) {
                for team in self.teams(orbit, k) {
                    reach[team.index()] += 1;
                }
            }
        }

        let mut singles = 0;
        for (team, &games) in reach.iter().enumerate() {
            if games < PERIOD_CAP {
                if games == 0 || !self.single_left[team] {
                    return true;
                }
                singles += 1;
            }
        }
        singles > SINGLES_PER_PERIOD
    }

    /// `Some(true)` solved, `Some(false)` dead end, `None` out of budget.
    fn descend(&mut self, period: usize, filled: usize) -> Option<bool> {
        if period == self.periods {
            return Some(true);
        }
        self.nodes += 1;
        if self.nodes > self.budget {
            return None;
        }
        if filled == self.orbits.len() {
            return self.close(period);
        }

        let mut best: Option<(usize, usize)> = None;
        for orbit in (0..self.orbits.len()).filter(|&o| !self.covered[o]) {
            let options = (0..self.periods)
                .filter(|&k| self.playable(orbit, k))
                .count();
            if options == 0 {
                return Some(false);
            }
            if best.map_or(true, |(_, fewest)| options < fewest) {
                best = Some((orbit, options));
            }
        }
        let Some((orbit, _)) = best else {
            return Some(false);
        };

        let mut candidates: Vec<usize> = (0..self.periods)
            .filter(|&k| self.playable(orbit, k))
            .collect();
        candidates.sort_by_key(|&k| {
            let busy: u32 = self.teams(orbit, k).map(|t| self.games[t.index()]).sum();
            (Reverse(busy), k)
        });

        for k in candidates {
            self.place(orbit, k, Some(period));
            let outcome = if self.doomed() {
                Some(false)
            } else {
                self.descend(period, filled + 1)
            };
            if outcome != Some(false) {
                return outcome;
            }
            self.place(orbit, k, None);
        }
        Some(false)
    }

    /// Every week is represented: settle the single-game teams and move on.
    fn close(&mut self, period: usize) -> Option<bool> {
        let singles: Vec<usize> = (0..self.games.len())
            .filter(|&team| self.games[team] < PERIOD_CAP)
            .collect();
        if singles
            .iter()
            .any(|&team| self.games[team] == 0 || !self.single_left[team])
        {
            return Some(false);
        }

        let (teams, orbits) = (self.games.len(), self.covered.len());
        let games = std::mem::replace(&mut self.games, vec![0; teams]);
        let covered = std::mem::replace(&mut self.covered, vec![false; orbits]);
        for &team in &singles {
            self.single_left[team] = false;
        }

        let outcome = self.descend(period + 1, 0);
        if outcome == Some(false) {
            for &team in &singles {
                self.single_left[team] = true;
            }
            self.games = games;
            self.covered = covered;
        }
        outcome
    }

    fn assignment(&self) -> PeriodAssignment {
        self.placed
            .chunks(self.periods)
            .map(|week| week.iter().map(|p| p.unwrap_or(0)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CircleMethodGenerator;

    fn pairings(n: u32) -> Pairings {
        CircleMethodGenerator::new(i64::from(n)).unwrap().pairings()
    }

    fn is_permutation(week: &[usize]) -> bool {
        let mut seen = vec![false; week.len()];
        week.iter().all(|&p| p < seen.len() && !std::mem::replace(&mut seen[p], true))
    }

    #[test]
    fn test_every_strategy_fills_each_week_once() {
        for n in [4u32, 6, 10, 12] {
            let p = pairings(n);
            for assignment in [rotation(n, &p), starter(n, &p), greedy(n, &p)] {
                assert_eq!(assignment.len(), (n - 1) as usize);
                assert!(assignment.iter().all(|w| is_permutation(w)), "n={n}");
            }
        }
    }

    #[test]
    fn test_starter_respects_cap() {
        for n in [2u32, 6, 8, 12, 14, 18, 20, 24, 26, 30, 32, 36, 38] {
            let p = pairings(n);
            let load = load_of(n, &p, &starter(n, &p));
            assert!(load.max() <= PERIOD_CAP, "n={n}: max load {}", load.max());
        }
    }

    #[test]
    fn test_starter_fails_for_four_mod_six() {
        for n in [10u32, 16, 22] {
            let p = pairings(n);
            assert!(load_of(n, &p, &starter(n, &p)).max() > PERIOD_CAP, "n={n}");
        }
    }

    #[test]
    fn test_rotation_only_trivial() {
        let p = pairings(2);
        assert_eq!(load_of(2, &p, &rotation(2, &p)).max(), 1);
        let p = pairings(6);
        assert!(load_of(6, &p, &rotation(6, &p)).max() > PERIOD_CAP);
    }

    #[test]
    fn test_search_solves_ten() {
        let p = pairings(10);
        match search(10, &p, 200_000) {
            SearchOutcome::Found(assignment) => {
                assert!(assignment.iter().all(|w| is_permutation(w)));
                assert!(load_of(10, &p, &assignment).max() <= PERIOD_CAP);
            }
            other => panic!("expected a solution, got {other:?}"),
        }
    }

    #[test]
    fn test_search_covers_four_mod_six() {
        for n in [16u32, 22, 28] {
            let p = pairings(n);
            match search(n, &p, 200_000) {
                SearchOutcome::Found(assignment) => {
                    assert!(assignment.iter().all(|w| is_permutation(w)), "n={n}");
                    assert!(load_of(n, &p, &assignment).max() <= PERIOD_CAP, "n={n}");
                }
                other => panic!("n={n}: expected a solution, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_every_period_has_two_single_games() {
        let n = 16u32;
        let p = pairings(n);
        let SearchOutcome::Found(assignment) = search(n, &p, 200_000) else {
            panic!("n=16 should be solved");
        };
        let load = load_of(n, &p, &assignment);
        for period in 0..(n / 2) as usize {
            let singles = Team::all(n).filter(|&t| load.get(t, period) == 1).count();
            assert_eq!(singles, 2, "period {period}");
            assert!(Team::all(n).all(|t| load.get(t, period) >= 1));
        }
        for team in Team::all(n) {
            let ones = (0..(n / 2) as usize).filter(|&q| load.get(team, q) == 1).count();
            assert_eq!(ones, 1, "{team:?}");
        }
    }

    #[test]
    fn test_mirror_orbits() {
        assert_eq!(reflect(6, Team(1)), Team(1));
        assert_eq!(reflect(6, Team(6)), Team(6));
        assert_eq!(reflect(6, Team(2)), Team(5));

        // Team 6 meets 5, 4, 3, 2, 1 in weeks 1..=5; 5 mirrors 2, 4 mirrors 3.
        let orbits = mirror_orbits(6, &pairings(6)).unwrap();
        let weeks: Vec<Vec<usize>> = orbits
            .iter()
            .map(|o| o.weeks.iter().map(|(w, _)| *w).collect())
            .collect();
        assert_eq!(weeks, vec![vec![0, 3], vec![1, 2], vec![4]]);

        let shuffled: Pairings = vec![vec![(Team(1), Team(2)), (Team(3), Team(4))]];
        assert_eq!(mirror_orbits(4, &shuffled), None);
    }

    #[test]
    fn test_search_proves_four_infeasible() {
        assert_eq!(search(4, &pairings(4), 10_000), SearchOutcome::Infeasible);
    }

    #[test]
    fn test_search_budget() {
        assert_eq!(search(10, &pairings(10), 1), SearchOutcome::BudgetExhausted);
    }

    #[test]
    fn test_load_excess() {
        let p = pairings(4);
        let load = load_of(4, &p, &greedy(4, &p));
        assert_eq!(load.max(), 3);
        assert!(load.excess() >= 1);
    }
}
