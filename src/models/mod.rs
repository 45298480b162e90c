//! Data structures for a match session: players, catalog, rounds, stats, match state.

mod catalog;
mod game_match;
mod player;
mod round;
mod stats;

pub use catalog::{Catalog, CatalogError, MapEntry};
pub use game_match::{
    ErrorKind, Match, MatchError, MatchId, MatchRules, MatchState, ReshuffleScope, MAX_PLAYERS,
};
pub use player::{Player, PlayerId};
pub use round::{Assignment, Lineup, RoundOutcome, RoundResolution, Scores, Side};
pub use stats::{MatchStats, PlayerStat};
