//! Per-player statistic names and the match-scoped counters.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A countable achievement.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStat {
    /// Killed the whole enemy team alone in one round.
    Aces,
    /// Interrogated an opponent as Caveira.
    Interrogations,
}

impl PlayerStat {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerStat::Aces => "aces",
            PlayerStat::Interrogations => "interrogations",
        }
    }
}

impl std::fmt::Display for PlayerStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayerStat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ace" | "aces" => Ok(PlayerStat::Aces),
            "interrogation" | "interrogations" => Ok(PlayerStat::Interrogations),
            other => Err(format!("Unknown stat: {}", other)),
        }
    }
}

/// Counters scoped to one match; discarded with it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchStats(BTreeMap<PlayerId, BTreeMap<PlayerStat, u32>>);

impl MatchStats {
    /// Defaults to 0 when nothing was recorded.
    pub fn get(&self, player_id: &str, stat: PlayerStat) -> u32 {
        self.0
            .get(player_id)
            .and_then(|stats| stats.get(&stat))
            .copied()
            .unwrap_or(0)
    }

    /// Adds one and returns the new count.
    pub(crate) fn increment(&mut self, player_id: &str, stat: PlayerStat) -> u32 {
        let count = self
            .0
            .entry(player_id.to_string())
            .or_default()
            .entry(stat)
            .or_insert(0);
        *count += 1;
        *count
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
