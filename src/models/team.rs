//! Team identity, home/away slot, and unordered team pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A team, identified by an integer in `[1, n]`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Team(pub u32);

impl Team {
    /// Team id.
    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }

    /// Zero-based index (`id - 1`), for dense per-team tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// All teams `1..=n`.
    pub fn all(n: u32) -> impl Iterator<Item = Team> {
        (1..=n).map(Team)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of a game a team plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Home,
    Away,
}

/// Unordered pair of distinct teams, stored low/high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamPair {
    low: Team,
    high: Team,
}

impl TeamPair {
    /// Normalises `(a, b)` so that `low <= high`.
    pub fn new(a: Team, b: Team) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Lower team id.
    pub fn low(&self) -> Team {
        self.low
    }

    /// Higher team id.
    pub fn high(&self) -> Team {
        self.high
    }

    /// Every pair of `K_n`, in lexicographic order.
    pub fn complete(n: u32) -> impl Iterator<Item = TeamPair> {
        (1..=n).flat_map(move |a| (a + 1..=n).map(move |b| TeamPair::new(Team(a), Team(b))))
    }
}

impl fmt::Display for TeamPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.low, self.high)
    }
}
