//! Game model.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Slot, Team, TeamPair};

/// A game between two distinct teams with a designated home team.
///
/// Distinctness is enforced when a game enters a
/// [`Schedule`](super::Schedule), not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    /// Home team.
    pub home: Team,
    /// Away team.
    pub away: Team,
}

impl Game {
    /// Creates a game.
    pub fn new(home: Team, away: Team) -> Self {
        Self { home, away }
    }

    /// The unordered pair of teams.
    #[inline]
    pub fn pair(&self) -> TeamPair {
        TeamPair::new(self.home, self.away)
    }

    /// Both teams, home first.
    #[inline]
    pub fn teams(&self) -> [Team; 2] {
        [self.home, self.away]
    }

    /// Whether `team` plays in this game.
    #[inline]
    pub fn involves(&self, team: Team) -> bool {
        self.home == team || self.away == team
    }

    /// The slot `team` plays in, if it plays at all.
    pub fn slot_of(&self, team: Team) -> Option<Slot> {
        if self.home == team {
            Some(Slot::Home)
        } else if self.away == team {
            Some(Slot::Away)
        } else {
            None
        }
    }

    /// The same matchup with home and away exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            home: self.away,
            away: self.home,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v {}", self.home, self.away)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_of() {
        let g = Game::new(Team(3), Team(1));
        assert_eq!(g.slot_of(Team(3)), Some(Slot::Home));
        assert_eq!(g.slot_of(Team(1)), Some(Slot::Away));
        assert_eq!(g.slot_of(Team(2)), None);
        assert!(g.involves(Team(1)));
        assert!(!g.involves(Team(2)));
    }

    #[test]
    fn test_swapped_keeps_pair() {
        let g = Game::new(Team(3), Team(1));
        let s = g.swapped();
        assert_eq!(s.home, Team(1));
        assert_eq!(s.away, Team(3));
        assert_eq!(g.pair(), s.pair());
    }
}
