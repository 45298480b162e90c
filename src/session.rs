//! Session registry: at most one live match per workspace, plus the persistence collaborators
//! (live-session store, completed-match archive, all-time stat ledger) and in-memory versions of each.

use crate::logic::{create_match, BanSuggestions};
use crate::models::{
    Catalog, ErrorKind, Match, MatchError, MatchId, MatchRules, Player, PlayerId, PlayerStat,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Key of a chat workspace ("server").
pub type WorkspaceKey = String;

/// A persistence collaborator failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Storage error: {}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// What is persisted per workspace: the serialized live match and the caller's last rendering of it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub match_data: String,
    pub display_state: Option<serde_json::Value>,
}

/// Live-session persistence keyed by workspace.
pub trait SessionStore {
    fn load(&self, key: &str) -> Result<Option<SessionRecord>, StoreError>;
    fn save(&mut self, key: &str, record: SessionRecord) -> Result<(), StoreError>;
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Append-only store of completed matches, keyed by match id.
pub trait MatchArchive {
    /// Store a finished match; recording the same id again replaces it.
    fn record_completed(&mut self, id: MatchId, match_data: String) -> Result<(), StoreError>;
    fn get(&self, id: MatchId) -> Result<Option<String>, StoreError>;
    /// Returns whether anything was deleted.
    fn delete(&mut self, id: MatchId) -> Result<bool, StoreError>;
}

/// One all-time counter.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub player_id: PlayerId,
    pub stat: PlayerStat,
    pub count: u32,
}

/// All-time counters keyed by `(player, stat)`. Match deletion never touches them.
pub trait StatLedger {
    /// Adds one and returns the new all-time count.
    fn increment(&mut self, player_id: &str, stat: PlayerStat) -> Result<u32, StoreError>;
    fn get(&self, player_id: &str, stat: PlayerStat) -> Result<u32, StoreError>;
    fn entries(&self) -> Result<Vec<LedgerEntry>, StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    records: HashMap<WorkspaceKey, SessionRecord>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.records.get(key).cloned())
    }

    fn save(&mut self, key: &str, record: SessionRecord) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), record);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.records.remove(key);
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryMatchArchive {
    matches: BTreeMap<MatchId, String>,
}

impl MatchArchive for MemoryMatchArchive {
    fn record_completed(&mut self, id: MatchId, match_data: String) -> Result<(), StoreError> {
        self.matches.insert(id, match_data);
        Ok(())
    }

    fn get(&self, id: MatchId) -> Result<Option<String>, StoreError> {
        Ok(self.matches.get(&id).cloned())
    }

    fn delete(&mut self, id: MatchId) -> Result<bool, StoreError> {
        Ok(self.matches.remove(&id).is_some())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStatLedger {
    counts: BTreeMap<(PlayerId, PlayerStat), u32>,
}

impl StatLedger for MemoryStatLedger {
    fn increment(&mut self, player_id: &str, stat: PlayerStat) -> Result<u32, StoreError> {
        let count = self.counts.entry((player_id.to_string(), stat)).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    fn get(&self, player_id: &str, stat: PlayerStat) -> Result<u32, StoreError> {
        Ok(self
            .counts
            .get(&(player_id.to_string(), stat))
            .copied()
            .unwrap_or(0))
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .counts
            .iter()
            .map(|((player_id, stat), count)| LedgerEntry {
                player_id: player_id.clone(),
                stat: *stat,
                count: *count,
            })
            .collect())
    }
}

/// Render the ledger as CSV with a `player_id,stat,count` header.
pub fn ledger_to_csv<L: StatLedger + ?Sized>(ledger: &L) -> Result<String, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(["player_id", "stat", "count"])
        .map_err(|e| StoreError::new(format!("CSV export failed: {}", e)))?;
    for entry in ledger.entries()? {
        writer
            .serialize(&entry)
            .map_err(|e| StoreError::new(format!("CSV export failed: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::new(format!("CSV export failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| StoreError::new(format!("CSV export failed: {}", e)))
}

/// Errors surfaced by the registry.
#[derive(Debug)]
pub enum RegistryError {
    /// No live match for this workspace.
    NoActiveMatch,
    /// An unfinished match already exists for this workspace.
    MatchInProgress,
    Match(MatchError),
    Store(StoreError),
    /// The persisted match could not be read back.
    Corrupt(serde_json::Error),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::NoActiveMatch => ErrorKind::NotFound,
            RegistryError::MatchInProgress => ErrorKind::StateConflict,
            RegistryError::Match(e) => e.kind(),
            RegistryError::Store(_) | RegistryError::Corrupt(_) => ErrorKind::Storage,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            RegistryError::NoActiveMatch => "no_active_match",
            RegistryError::MatchInProgress => "match_in_progress",
            RegistryError::Match(e) => e.reason(),
            RegistryError::Store(_) => "storage_error",
            RegistryError::Corrupt(_) => "corrupt_session",
        }
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NoActiveMatch => write!(f, "No match in progress"),
            RegistryError::MatchInProgress => write!(f, "A match is already in progress"),
            RegistryError::Match(e) => write!(f, "{}", e),
            RegistryError::Store(e) => write!(f, "{}", e),
            RegistryError::Corrupt(e) => write!(f, "Stored match could not be read: {}", e),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<MatchError> for RegistryError {
    fn from(e: MatchError) -> Self {
        RegistryError::Match(e)
    }
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        RegistryError::Store(e)
    }
}

/// Owns the collaborators and enforces one live match per workspace.
///
/// Callers serialize access (one mutation completes before the next begins); the registry
/// itself does no locking.
#[derive(Debug)]
pub struct SessionRegistry<S = MemorySessionStore, A = MemoryMatchArchive, L = MemoryStatLedger> {
    store: S,
    archive: A,
    ledger: L,
    rules: MatchRules,
}

impl SessionRegistry {
    /// Registry backed entirely by memory.
    pub fn in_memory(rules: MatchRules) -> Self {
        Self::new(
            MemorySessionStore::default(),
            MemoryMatchArchive::default(),
            MemoryStatLedger::default(),
            rules,
        )
    }
}

impl<S: SessionStore, A: MatchArchive, L: StatLedger> SessionRegistry<S, A, L> {
    pub fn new(store: S, archive: A, ledger: L, rules: MatchRules) -> Self {
        Self {
            store,
            archive,
            ledger,
            rules,
        }
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    fn load_record(&self, key: &str) -> Result<Option<(SessionRecord, Match)>, RegistryError> {
        match self.store.load(key)? {
            Some(record) => {
                let game = Match::from_json(&record.match_data).map_err(RegistryError::Corrupt)?;
                Ok(Some((record, game)))
            }
            None => Ok(None),
        }
    }

    /// Persist `game`, and archive it when it is finished.
    fn commit(
        &mut self,
        key: &str,
        game: &Match,
        display_state: Option<serde_json::Value>,
    ) -> Result<(), RegistryError> {
        let match_data = game.to_json().map_err(RegistryError::Corrupt)?;
        if game.is_finished() {
            self.archive.record_completed(game.id, match_data.clone())?;
        }
        self.store.save(
            key,
            SessionRecord {
                match_data,
                display_state,
            },
        )?;
        Ok(())
    }

    /// Start a match unless an unfinished one exists; a finished one is replaced.
    pub fn create<R: Rng + ?Sized>(
        &mut self,
        key: &str,
        players: Vec<Player>,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<(Match, BanSuggestions), RegistryError> {
        match self.load_record(key) {
            Ok(Some((_, existing))) => {
                if !existing.is_finished() {
                    log::warn!("Workspace {} already has match {} in progress", key, existing.id);
                    return Err(RegistryError::MatchInProgress);
                }
                log::info!("Replacing finished match {} in workspace {}", existing.id, key);
            }
            Ok(None) => {}
            Err(RegistryError::Corrupt(e)) => {
                log::warn!("Replacing unreadable session in workspace {}: {}", key, e);
            }
            Err(e) => return Err(e),
        }
        let (game, suggestions) = create_match(players, self.rules, catalog, rng)?;
        self.commit(key, &game, None)?;
        Ok((game, suggestions))
    }

    pub fn get(&self, key: &str) -> Result<Match, RegistryError> {
        self.load_record(key)?
            .map(|(_, game)| game)
            .ok_or(RegistryError::NoActiveMatch)
    }

    /// Run one operation against the live match. Only a successful operation is persisted.
    pub fn update<T, F>(&mut self, key: &str, op: F) -> Result<(Match, T), RegistryError>
    where
        F: FnOnce(&mut Match, &mut L) -> Result<T, MatchError>,
    {
        let (record, mut game) = self.load_record(key)?.ok_or(RegistryError::NoActiveMatch)?;
        let out = op(&mut game, &mut self.ledger).map_err(|e| {
            log::warn!("Rejected operation in workspace {}: {}", key, e);
            RegistryError::Match(e)
        })?;
        self.commit(key, &game, record.display_state)?;
        Ok((game, out))
    }

    /// End the session. With `delete_history` the archived copy is removed too; all-time stats stay.
    ///
    /// The record is deleted even if it cannot be read back; the ended match is then `None`.
    pub fn end(&mut self, key: &str, delete_history: bool) -> Result<Option<Match>, RegistryError> {
        let record = self.store.load(key)?.ok_or(RegistryError::NoActiveMatch)?;
        self.store.delete(key)?;
        let game = match Match::from_json(&record.match_data) {
            Ok(game) => game,
            Err(e) => {
                log::warn!("Discarded unreadable session in workspace {}: {}", key, e);
                return Ok(None);
            }
        };
        if delete_history {
            let removed = self.archive.delete(game.id)?;
            log::info!("Deleted history of match {} (found: {})", game.id, removed);
        }
        log::info!("Ended session for workspace {}", key);
        Ok(Some(game))
    }

    /// Replace the live match with a fresh one, keeping the roster unless `players` is given.
    pub fn another<R: Rng + ?Sized>(
        &mut self,
        key: &str,
        players: Option<Vec<Player>>,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<(Match, BanSuggestions), RegistryError> {
        let (_, previous) = self.load_record(key)?.ok_or(RegistryError::NoActiveMatch)?;
        let players = players.unwrap_or_else(|| previous.players.clone());
        let (game, suggestions) = create_match(players, self.rules, catalog, rng)?;
        self.commit(key, &game, None)?;
        log::info!("Match {} replaced by {} in workspace {}", previous.id, game.id, key);
        Ok((game, suggestions))
    }

    pub fn display_state(&self, key: &str) -> Result<Option<serde_json::Value>, RegistryError> {
        let (record, _) = self.load_record(key)?.ok_or(RegistryError::NoActiveMatch)?;
        Ok(record.display_state)
    }

    pub fn set_display_state(
        &mut self,
        key: &str,
        display_state: serde_json::Value,
    ) -> Result<(), RegistryError> {
        let (mut record, _) = self.load_record(key)?.ok_or(RegistryError::NoActiveMatch)?;
        record.display_state = Some(display_state);
        self.store.save(key, record)?;
        Ok(())
    }
}
