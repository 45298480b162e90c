//! Tactical-shooter match tracker. The library holds the match state machine and lineup engine; `session` keeps one live match per workspace.

pub mod config;
pub mod logic;
pub mod models;
pub mod session;

pub use logic::{
    ban_operators, compute_lineup, create_match, deal_lineup, operator_pool, record_stat,
    requires_overtime_side, reshuffle, resolve_round, set_map, start_side, suggest_bans,
    suggest_map_ban, suggest_operator_bans, swap_operator, BanPair, BanSuggestions, FuzzyMatcher,
    WeightedRatio, MATCH_THRESHOLD,
};
pub use models::{
    Assignment, Catalog, CatalogError, ErrorKind, Lineup, MapEntry, Match, MatchError, MatchId,
    MatchRules, MatchState, MatchStats, Player, PlayerId, PlayerStat, ReshuffleScope,
    RoundOutcome, RoundResolution, Scores, Side, MAX_PLAYERS,
};
pub use session::{
    ledger_to_csv, LedgerEntry, MatchArchive, MemoryMatchArchive, MemorySessionStore,
    MemoryStatLedger, RegistryError, SessionRecord, SessionRegistry, SessionStore, StatLedger,
    StoreError, WorkspaceKey,
};
