//! Match aggregate: roster, map, bans, round counter, score, side, reshuffle budget.

use crate::models::player::{Player, PlayerId};
use crate::models::round::{Lineup, Scores, Side};
use crate::models::stats::{MatchStats, PlayerStat};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Durable identifier of a match (used for the completed-match archive).
pub type MatchId = Uuid;

/// A match never has more players than this.
pub const MAX_PLAYERS: usize = 5;

/// How a rejection should be understood by the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or unresolvable input.
    Validation,
    /// Operation not legal in the current phase.
    StateConflict,
    /// Referenced player or operator does not exist.
    NotFound,
    /// A persistence collaborator failed.
    Storage,
}

/// Errors that can occur during match operations. None of them leave a match half-mutated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchError {
    /// A match needs at least one player.
    NoPlayers,
    /// The roster would exceed `MAX_PLAYERS`.
    TooManyPlayers { max: usize, requested: usize },
    /// The player is already on the roster (or listed twice).
    DuplicatePlayer(PlayerId),
    /// The map name did not resolve to a catalog map.
    InvalidMap(String),
    /// The operator name did not resolve for the side being played.
    UnknownOperator(String),
    /// Rules are internally inconsistent.
    InvalidRules(String),
    /// Roster changes are only allowed before the first round.
    MatchAlreadyStarted,
    /// The match is over; only ending the session is possible.
    MatchFinished,
    /// No side has been declared yet.
    SideNotChosen,
    /// The first round has not started.
    RoundNotStarted,
    /// This round ties regulation, so the overtime starting side must be given.
    OvertimeSideRequired,
    /// All reshuffles are used up.
    ReshuffleLimitReached { limit: u32 },
    /// Removing these players would leave nobody in the match.
    CannotRemoveAllPlayers,
    /// Bans left fewer operators than players for the side.
    InsufficientOperators { needed: usize, available: usize },
    /// No lineup has been dealt for the current round.
    NoLineup,
    /// The player is not on the roster.
    PlayerNotInMatch(PlayerId),
    /// The all-time ledger could not be updated; nothing was recorded.
    LedgerUnavailable(String),
}

impl MatchError {
    pub fn kind(&self) -> ErrorKind {
        use MatchError::*;
        match self {
            NoPlayers | TooManyPlayers { .. } | DuplicatePlayer(_) | InvalidMap(_)
            | InvalidRules(_) => ErrorKind::Validation,
            UnknownOperator(_) | PlayerNotInMatch(_) => ErrorKind::NotFound,
            MatchAlreadyStarted | MatchFinished | SideNotChosen | RoundNotStarted
            | OvertimeSideRequired | ReshuffleLimitReached { .. } | CannotRemoveAllPlayers
            | InsufficientOperators { .. } | NoLineup => ErrorKind::StateConflict,
            LedgerUnavailable(_) => ErrorKind::Storage,
        }
    }

    /// Stable machine-readable code.
    pub fn reason(&self) -> &'static str {
        use MatchError::*;
        match self {
            NoPlayers => "no_players",
            TooManyPlayers { .. } => "too_many_players",
            DuplicatePlayer(_) => "duplicate_player",
            InvalidMap(_) => "invalid_map",
            UnknownOperator(_) => "unknown_operator",
            InvalidRules(_) => "invalid_rules",
            MatchAlreadyStarted => "match_already_started",
            MatchFinished => "match_finished",
            SideNotChosen => "side_not_chosen",
            RoundNotStarted => "round_not_started",
            OvertimeSideRequired => "overtime_side_required",
            ReshuffleLimitReached { .. } => "reshuffle_limit_reached",
            CannotRemoveAllPlayers => "cannot_remove_all_players",
            InsufficientOperators { .. } => "insufficient_operators",
            NoLineup => "no_lineup",
            PlayerNotInMatch(_) => "player_not_in_match",
            LedgerUnavailable(_) => "ledger_unavailable",
        }
    }
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::NoPlayers => write!(f, "A match needs at least one player"),
            MatchError::TooManyPlayers { max, requested } => {
                write!(f, "A match can only have up to {} players ({} requested)", max, requested)
            }
            MatchError::DuplicatePlayer(id) => write!(f, "Player {} is already in the match", id),
            MatchError::InvalidMap(name) => write!(f, "{} is not a valid map", name),
            MatchError::UnknownOperator(name) => write!(f, "{} is not a valid operator", name),
            MatchError::InvalidRules(msg) => write!(f, "Invalid match rules: {}", msg),
            MatchError::MatchAlreadyStarted => {
                write!(f, "Players cannot be changed once the match has started")
            }
            MatchError::MatchFinished => write!(f, "The match is over"),
            MatchError::SideNotChosen => write!(f, "Choose attack or defense first"),
            MatchError::RoundNotStarted => write!(f, "No round is in progress yet"),
            MatchError::OvertimeSideRequired => {
                write!(f, "This round starts overtime; specify the side you start overtime on")
            }
            MatchError::ReshuffleLimitReached { limit } => {
                write!(f, "You cannot reshuffle more than {} times", limit)
            }
            MatchError::CannotRemoveAllPlayers => {
                write!(f, "You cannot remove all players from the match")
            }
            MatchError::InsufficientOperators { needed, available } => write!(
                f,
                "Not enough unbanned operators: {} needed, {} available",
                needed, available
            ),
            MatchError::NoLineup => write!(f, "No lineup has been dealt for this round"),
            MatchError::PlayerNotInMatch(id) => write!(f, "Player {} is not in the match", id),
            MatchError::LedgerUnavailable(msg) => write!(f, "Stats could not be saved: {}", msg),
        }
    }
}

impl std::error::Error for MatchError {}

/// Current phase of the match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// Round 0: roster, map and bans can be edited; no side chosen.
    #[default]
    Setup,
    /// Round 1 or later with a declared side.
    RoundInProgress,
    /// Terminal.
    Finished,
}

/// Whether the reshuffle budget refills every round or lasts the whole match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReshuffleScope {
    #[default]
    Match,
    Round,
}

/// Win thresholds and budgets. Copied into each match at creation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRules {
    /// Round wins that end regulation.
    pub rounds_to_win: u32,
    /// Round wins that end overtime (>= `rounds_to_win`).
    pub overtime_rounds_to_win: u32,
    pub reshuffle_limit: u32,
    pub reshuffle_scope: ReshuffleScope,
    /// Swap sides automatically after every N-th regulation round; `None` leaves the side alone.
    pub side_switch_every: Option<u32>,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            rounds_to_win: 4,
            overtime_rounds_to_win: 4,
            reshuffle_limit: 2,
            reshuffle_scope: ReshuffleScope::Match,
            side_switch_every: None,
        }
    }
}

impl MatchRules {
    /// Rounds played before a tie forces overtime (6 with the default rules).
    pub fn regulation_rounds(&self) -> u32 {
        2 * self.rounds_to_win.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.rounds_to_win == 0 {
            return Err(MatchError::InvalidRules("rounds_to_win must be at least 1".into()));
        }
        if self.overtime_rounds_to_win < self.rounds_to_win {
            return Err(MatchError::InvalidRules(
                "overtime_rounds_to_win must not be below rounds_to_win".into(),
            ));
        }
        if self.side_switch_every == Some(0) {
            return Err(MatchError::InvalidRules("side_switch_every must be at least 1".into()));
        }
        Ok(())
    }
}

/// Full match state. Serialized as a flat record and round-trips without loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rules: MatchRules,
    /// Most recently added first; lineups follow this order.
    pub players: Vec<Player>,
    pub map: Option<String>,
    pub banned_operators: BTreeSet<String>,
    /// 0 before the first round; +1 per resolved round.
    pub curr_round: u32,
    pub playing_on_side: Option<Side>,
    pub scores: Scores,
    pub reshuffles: u32,
    /// Set once a regulation tie sent the match to overtime.
    pub overtime: bool,
    pub stats_this_match: MatchStats,
    pub last_lineup: Option<Lineup>,
    pub state: MatchState,
}

impl Match {
    /// Create a match in Setup with the given roster (1 to `MAX_PLAYERS`).
    pub fn new(players: Vec<Player>, rules: MatchRules) -> Result<Self, MatchError> {
        rules.validate()?;
        check_roster(&players)?;
        let m = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            finished_at: None,
            rules,
            players,
            map: None,
            banned_operators: BTreeSet::new(),
            curr_round: 0,
            playing_on_side: None,
            scores: Scores::default(),
            reshuffles: 0,
            overtime: false,
            stats_this_match: MatchStats::default(),
            last_lineup: None,
            state: MatchState::Setup,
        };
        log::info!("Created match {} with {} player(s)", m.id, m.players.len());
        Ok(m)
    }

    pub fn is_finished(&self) -> bool {
        self.state == MatchState::Finished
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn has_player(&self, id: &str) -> bool {
        self.player(id).is_some()
    }

    pub fn reshuffles_remaining(&self) -> u32 {
        self.rules.reshuffle_limit.saturating_sub(self.reshuffles)
    }

    /// Match-scoped counter (0 if never recorded).
    pub fn stat(&self, player_id: &str, stat: PlayerStat) -> u32 {
        self.stats_this_match.get(player_id, stat)
    }

    fn ensure_setup(&self) -> Result<(), MatchError> {
        if self.state != MatchState::Setup {
            return Err(MatchError::MatchAlreadyStarted);
        }
        Ok(())
    }

    /// Replace the whole roster (Setup only).
    pub fn set_players(&mut self, players: Vec<Player>) -> Result<(), MatchError> {
        self.ensure_setup()?;
        check_roster(&players)?;
        self.players = players;
        Ok(())
    }

    /// Add players in front of the current roster (Setup only). The cap is checked before anything changes.
    pub fn add_players(&mut self, players: Vec<Player>) -> Result<(), MatchError> {
        self.ensure_setup()?;
        if players.is_empty() {
            return Err(MatchError::NoPlayers);
        }
        if let Some(p) = players.iter().find(|p| self.has_player(&p.id)) {
            return Err(MatchError::DuplicatePlayer(p.id.clone()));
        }
        let mut roster = players;
        roster.extend(self.players.iter().cloned());
        check_roster(&roster)?;
        self.players = roster;
        Ok(())
    }

    /// Remove players by id (Setup only). Fails without changes if any id is unknown or the roster would empty.
    pub fn remove_players(&mut self, player_ids: &[PlayerId]) -> Result<(), MatchError> {
        self.ensure_setup()?;
        if let Some(id) = player_ids.iter().find(|id| !self.has_player(id)) {
            return Err(MatchError::PlayerNotInMatch(id.clone()));
        }
        let remaining: Vec<Player> = self
            .players
            .iter()
            .filter(|p| !player_ids.contains(&p.id))
            .cloned()
            .collect();
        if remaining.is_empty() {
            return Err(MatchError::CannotRemoveAllPlayers);
        }
        self.players = remaining;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a serialized match, rejecting records that break roster or rules invariants.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        use serde::de::Error;
        let m: Match = serde_json::from_str(json)?;
        m.rules.validate().map_err(serde_json::Error::custom)?;
        check_roster(&m.players).map_err(serde_json::Error::custom)?;
        Ok(m)
    }
}

fn check_roster(players: &[Player]) -> Result<(), MatchError> {
    if players.is_empty() {
        return Err(MatchError::NoPlayers);
    }
    if players.len() > MAX_PLAYERS {
        return Err(MatchError::TooManyPlayers {
            max: MAX_PLAYERS,
            requested: players.len(),
        });
    }
    for (i, p) in players.iter().enumerate() {
        if players[..i].iter().any(|q| q.id == p.id) {
            return Err(MatchError::DuplicatePlayer(p.id.clone()));
        }
    }
    Ok(())
}
