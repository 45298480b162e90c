//! Player identity as supplied by the chat platform.

use serde::{Deserialize, Serialize};

/// Opaque, externally supplied identity of a player (never generated here).
pub type PlayerId = String;

/// A player in a match.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// How the player is shown in lineups (e.g. a chat mention).
    pub display_handle: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, display_handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_handle: display_handle.into(),
        }
    }
}
