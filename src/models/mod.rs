//! Tournament domain models.
//!
//! Provides the data types shared by generation, validation and
//! evaluation. Teams are plain integer identities; a [`Schedule`] owns
//! its games exclusively and is never mutated after construction.
//!
//! # Vocabulary
//!
//! | Type | Meaning |
//! |------|---------|
//! | `Team` | Integer id in `[1, n]` |
//! | `Slot` | Home or away side of a game |
//! | `Game` | Ordered (home, away) pair of distinct teams |
//! | `Cell` | (week, period) coordinate, week in `[1, n-1]`, period in `[1, n/2]` |
//! | `Schedule` | All `n(n-1)/2` games on the week × period grid |
//! | `ObjectiveRecord` | Claimed fairness objective of an optimization run |

mod game;
mod objective;
mod schedule;
mod team;

pub use game::Game;
pub use objective::ObjectiveRecord;
pub use schedule::{Cell, Schedule, ScheduleTable};
pub use team::{Slot, Team, TeamPair};
