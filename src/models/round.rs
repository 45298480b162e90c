//! Side, RoundOutcome, Scores, and the per-round Lineup.

use crate::models::player::Player;
use serde::{Deserialize, Serialize};

/// Which side "we" play in a round. Deserializes from any alias `FromStr` accepts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Side {
    Attack,
    Defense,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Attack => Side::Defense,
            Side::Defense => Side::Attack,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Attack => "attack",
            Side::Defense => "defense",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    /// Accepts the chat aliases as well ("atk", "def", "defend").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" | "atk" => Ok(Side::Attack),
            "defense" | "defence" | "defend" | "def" => Ok(Side::Defense),
            other => Err(format!("Unknown side: {}", other)),
        }
    }
}

impl TryFrom<String> for Side {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Result of a round from "our" point of view.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Won,
    Lost,
}

/// Round wins: blue is us, red is the opponent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub blue: u32,
    pub red: u32,
}

impl Scores {
    /// Scores as they would be after `outcome`.
    pub fn after(self, outcome: RoundOutcome) -> Scores {
        match outcome {
            RoundOutcome::Won => Scores {
                blue: self.blue + 1,
                ..self
            },
            RoundOutcome::Lost => Scores {
                red: self.red + 1,
                ..self
            },
        }
    }

    /// Score of the team that does not profit from `outcome`.
    pub fn opponent_of(self, outcome: RoundOutcome) -> u32 {
        match outcome {
            RoundOutcome::Won => self.red,
            RoundOutcome::Lost => self.blue,
        }
    }

    pub fn leader(self) -> u32 {
        self.blue.max(self.red)
    }
}

/// One player's operator for the round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub player: Player,
    pub operator: String,
}

/// Operators dealt for the current round.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    /// In roster order.
    pub assignments: Vec<Assignment>,
    /// Unassigned operators of the round's pool, available through swaps.
    pub backups: Vec<String>,
    /// Site to defend; attack rounds never carry one.
    pub site: Option<String>,
}

impl Lineup {
    pub fn operator_of(&self, player_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.player.id == player_id)
            .map(|a| a.operator.as_str())
    }

    /// Every operator in the lineup, assigned first.
    pub fn operators(&self) -> impl Iterator<Item = &str> {
        self.assignments
            .iter()
            .map(|a| a.operator.as_str())
            .chain(self.backups.iter().map(String::as_str))
    }
}

/// What the caller should do after a round was resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundResolution {
    /// Deal a lineup for the next round.
    Continue,
    /// The match is finished.
    MatchOver,
}

impl RoundResolution {
    pub fn continues(self) -> bool {
        self == RoundResolution::Continue
    }
}
