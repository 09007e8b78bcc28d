//! Schedule model.
//!
//! A schedule is the complete assignment of games to (week, period)
//! cells: `n-1` weeks × `n/2` periods, `n(n-1)/2` games. It is built once,
//! either from a solver's tabular output or by the circle-method
//! generator, and is read-only afterwards.
//!
//! # Layout
//! Games are stored in a dense week-major grid: the game at
//! `(week, period)` lives at index `(week-1)·(n/2) + (period-1)`.
//! Weeks are therefore contiguous slices and periods are strided views.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{Game, Team, TeamPair};
use crate::error::ScheduleError;

/// A (week, period) coordinate. Both indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Week in `[1, n-1]`.
    pub week: u32,
    /// Period in `[1, n/2]`.
    pub period: u32,
}

impl Cell {
    /// Creates a cell.
    pub fn new(week: u32, period: u32) -> Self {
        Self { week, period }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {} period {}", self.week, self.period)
    }
}

/// Raw tabular schedule as solvers serialize it.
///
/// `table[period][week] = [home, away]`, zero-based outer indices. Team
/// ids are kept as signed integers so out-of-range values survive parsing
/// and are rejected by [`Schedule::from_period_rows`] with a precise error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleTable(pub Vec<Vec<[i64; 2]>>);

impl ScheduleTable {
    /// Whether the table holds no games at all.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|row| row.is_empty())
    }

    /// Number of games in the table.
    pub fn game_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Largest team id mentioned, if any.
    pub fn max_team(&self) -> Option<i64> {
        self.0.iter().flatten().flat_map(|g| g.iter().copied()).max()
    }

    /// Converts to a `(week, period) → (home, away)` mapping.
    pub fn to_cells(&self) -> BTreeMap<Cell, (i64, i64)> {
        let mut cells = BTreeMap::new();
        for (p, row) in self.0.iter().enumerate() {
            for (w, game) in row.iter().enumerate() {
                cells.insert(Cell::new(w as u32 + 1, p as u32 + 1), (game[0], game[1]));
            }
        }
        cells
    }
}

/// A complete tournament schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    n: u32,
    games: Vec<Game>,
}

impl Schedule {
    /// Builds a schedule from a `(week, period) → (home, away)` mapping.
    ///
    /// # Errors
    /// [`ScheduleError`] for a non-positive or odd `n`, a cell outside the
    /// grid, a cell count other than `(n-1)·(n/2)` (which is how a missing
    /// cell shows), a team id outside `[1, n]`, or a team paired with
    /// itself. The first defect in week/period order is reported.
    ///
    /// # Example
    /// ```
    /// use std::collections::BTreeMap;
    /// use u_tournament::models::{Cell, Schedule};
    ///
    /// let mut cells = BTreeMap::new();
    /// cells.insert(Cell::new(1, 1), (1, 2));
    /// let schedule = Schedule::from_cells(2, &cells).unwrap();
    /// assert_eq!(schedule.game_count(), 1);
    /// ```
    pub fn from_cells(n: i64, cells: &BTreeMap<Cell, (i64, i64)>) -> Result<Self, ScheduleError> {
        let team_count = check_team_count(n)?;
        let (weeks, periods) = (team_count - 1, team_count / 2);

        if let Some(cell) = cells
            .keys()
            .find(|c| !(1..=weeks).contains(&c.week) || !(1..=periods).contains(&c.period))
        {
            return Err(ScheduleError::CellOutOfRange {
                week: cell.week,
                period: cell.period,
                weeks,
                periods,
            });
        }

        let expected = cell_count(n, team_count)?;
        if cells.len() != expected {
            return Err(ScheduleError::CellCount {
                expected,
                actual: cells.len(),
            });
        }

        // Every in-range cell is present; map order is week-major.
        let games = cells
            .iter()
            .map(|(&cell, &(home, away))| check_game(team_count, cell, home, away))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            n: team_count,
            games,
        })
    }

    /// Builds a schedule from the period-row table solvers write.
    ///
    /// # Errors
    /// [`ScheduleError::CellCount`] if the table does not have `n/2` rows
    /// and `(n-1)·(n/2)` games; otherwise as [`Schedule::from_cells`].
    pub fn from_period_rows(n: i64, table: &ScheduleTable) -> Result<Self, ScheduleError> {
        let team_count = check_team_count(n)?;
        let expected = cell_count(n, team_count)?;
        let actual = table.game_count();
        if table.0.len() != (team_count / 2) as usize || actual != expected {
            return Err(ScheduleError::CellCount { expected, actual });
        }
        Self::from_cells(n, &table.to_cells())
    }

    /// Assembles a schedule from an already-checked week-major grid.
    pub(crate) fn from_grid(n: u32, games: Vec<Game>) -> Self {
        debug_assert_eq!(games.len() as u64, u64::from(n - 1) * u64::from(n / 2));
        Self { n, games }
    }

    /// Writes the schedule back as a period-row table.
    pub fn to_period_rows(&self) -> ScheduleTable {
        let rows = (1..=self.periods())
            .map(|p| {
                self.period(p)
                    .into_iter()
                    .map(|g| [i64::from(g.home.id()), i64::from(g.away.id())])
                    .collect()
            })
            .collect();
        ScheduleTable(rows)
    }

    /// Number of teams.
    #[inline]
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Number of weeks (`n-1`).
    #[inline]
    pub fn weeks(&self) -> u32 {
        self.n - 1
    }

    /// Number of periods (`n/2`).
    #[inline]
    pub fn periods(&self) -> u32 {
        self.n / 2
    }

    /// Number of games (`n(n-1)/2`).
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    fn index(&self, week: u32, period: u32) -> Option<usize> {
        if (1..=self.weeks()).contains(&week) && (1..=self.periods()).contains(&period) {
            Some((week - 1) as usize * self.periods() as usize + (period - 1) as usize)
        } else {
            None
        }
    }

    /// The game at `(week, period)`.
    pub fn game(&self, week: u32, period: u32) -> Option<&Game> {
        self.index(week, period).map(|i| &self.games[i])
    }

    /// All games with their cells, week-major.
    pub fn games(&self) -> impl Iterator<Item = (Cell, &Game)> + '_ {
        let periods = self.periods();
        self.games.iter().enumerate().map(move |(i, g)| {
            let i = i as u32;
            (Cell::new(i / periods + 1, i % periods + 1), g)
        })
    }

    /// Games of one week, ordered by period.
    pub fn week(&self, week: u32) -> Option<&[Game]> {
        let start = self.index(week, 1)?;
        Some(&self.games[start..start + self.periods() as usize])
    }

    /// `(week, games)` for every week in order.
    pub fn by_week(&self) -> impl Iterator<Item = (u32, &[Game])> + '_ {
        self.games
            .chunks(self.periods() as usize)
            .enumerate()
            .map(|(w, games)| (w as u32 + 1, games))
    }

    /// Games of one period, ordered by week. Empty if `period` is out of range.
    pub fn period(&self, period: u32) -> Vec<&Game> {
        if !(1..=self.periods()).contains(&period) {
            return Vec::new();
        }
        self.games
            .iter()
            .skip((period - 1) as usize)
            .step_by(self.periods() as usize)
            .collect()
    }

    /// Every unordered pair with all the cells it is played in.
    ///
    /// In a valid schedule each pair maps to exactly one cell.
    pub fn pairs(&self) -> BTreeMap<TeamPair, Vec<Cell>> {
        let mut pairs: BTreeMap<TeamPair, Vec<Cell>> = BTreeMap::new();
        for (cell, game) in self.games() {
            pairs.entry(game.pair()).or_default().push(cell);
        }
        pairs
    }

    /// Flattened set of unordered pairs.
    pub fn pair_set(&self) -> BTreeSet<TeamPair> {
        self.games.iter().map(Game::pair).collect()
    }

    /// `(team, home games, away games)` for every team.
    pub fn home_away_counts(&self) -> Vec<(Team, u32, u32)> {
        let mut counts = vec![(0u32, 0u32); self.n as usize];
        for game in &self.games {
            counts[game.home.index()].0 += 1;
            counts[game.away.index()].1 += 1;
        }
        Team::all(self.n)
            .zip(counts)
            .map(|(team, (home, away))| (team, home, away))
            .collect()
    }

    /// Returns a copy with the game at `cell` replaced.
    ///
    /// # Errors
    /// The same cell and team checks as [`Schedule::from_cells`].
    pub fn with_game(&self, cell: Cell, game: Game) -> Result<Self, ScheduleError> {
        let index = self
            .index(cell.week, cell.period)
            .ok_or(ScheduleError::CellOutOfRange {
                week: cell.week,
                period: cell.period,
                weeks: self.weeks(),
                periods: self.periods(),
            })?;
        let game = check_game(
            self.n,
            cell,
            i64::from(game.home.id()),
            i64::from(game.away.id()),
        )?;
        let mut games = self.games.clone();
        games[index] = game;
        Ok(Self { n: self.n, games })
    }
}

fn check_team_count(n: i64) -> Result<u32, ScheduleError> {
    if n <= 0 {
        return Err(ScheduleError::NonPositiveTeamCount(n));
    }
    if n % 2 != 0 {
        return Err(ScheduleError::OddTeamCount(n));
    }
    u32::try_from(n).map_err(|_| ScheduleError::TeamCountTooLarge(n))
}

/// `(n-1)·(n/2)`, without overflowing for large `n`.
fn cell_count(n: i64, team_count: u32) -> Result<usize, ScheduleError> {
    let cells = u64::from(team_count - 1) * u64::from(team_count / 2);
    usize::try_from(cells).map_err(|_| ScheduleError::TeamCountTooLarge(n))
}

fn check_game(n: u32, cell: Cell, home: i64, away: i64) -> Result<Game, ScheduleError> {
    for team in [home, away] {
        if !(1..=i64::from(n)).contains(&team) {
            return Err(ScheduleError::TeamOutOfRange {
                team,
                week: cell.week,
                period: cell.period,
                n,
            });
        }
    }
    let (home, away) = (Team(home as u32), Team(away as u32));
    if home == away {
        return Err(ScheduleError::SelfPairing {
            team: home,
            week: cell.week,
            period: cell.period,
        });
    }
    Ok(Game::new(home, away))
}
