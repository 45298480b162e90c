//! Match business logic: setup, bans, lineups, rounds, stats.

pub mod fuzzy;

mod bans;
mod lineup;
mod rounds;
mod setup;
mod stats;

pub use bans::{
    ban_operators, suggest_bans, suggest_map_ban, suggest_operator_bans, BanPair, BanSuggestions,
};
pub use fuzzy::{FuzzyMatcher, WeightedRatio, MATCH_THRESHOLD};
pub use lineup::{compute_lineup, deal_lineup, operator_pool, reshuffle, swap_operator};
pub use rounds::{requires_overtime_side, resolve_round, start_side};
pub use setup::{create_match, set_map};
pub use stats::record_stat;
