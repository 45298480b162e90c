//! Server configuration from environment variables.
//!
//! HOST, PORT, ROUNDS_TO_WIN, OVERTIME_ROUNDS_TO_WIN, RESHUFFLE_LIMIT, RESHUFFLE_SCOPE
//! (`match` | `round`) and SIDE_SWITCH_EVERY. Unset variables fall back to defaults.

use crate::models::{MatchRules, ReshuffleScope};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    InvalidValue { var: &'static str, value: String },
    /// The rules parsed but contradict each other.
    InvalidRules(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { var, value } => {
                write!(f, "Invalid value for {}: {:?}", var, value)
            }
            ConfigError::InvalidRules(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rules: MatchRules,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rules: MatchRules::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = MatchRules::default();
        let rules = MatchRules {
            rounds_to_win: parse_or(&lookup, "ROUNDS_TO_WIN", defaults.rounds_to_win)?,
            overtime_rounds_to_win: parse_or(
                &lookup,
                "OVERTIME_ROUNDS_TO_WIN",
                defaults.overtime_rounds_to_win,
            )?,
            reshuffle_limit: parse_or(&lookup, "RESHUFFLE_LIMIT", defaults.reshuffle_limit)?,
            reshuffle_scope: match lookup("RESHUFFLE_SCOPE") {
                None => defaults.reshuffle_scope,
                Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                    "match" => ReshuffleScope::Match,
                    "round" => ReshuffleScope::Round,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            var: "RESHUFFLE_SCOPE",
                            value: v,
                        })
                    }
                },
            },
            side_switch_every: match lookup("SIDE_SWITCH_EVERY") {
                None => defaults.side_switch_every,
                Some(v) => Some(v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    var: "SIDE_SWITCH_EVERY",
                    value: v.clone(),
                })?),
            },
        };
        rules
            .validate()
            .map_err(|e| ConfigError::InvalidRules(e.to_string()))?;
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(default_host),
            port: parse_or(&lookup, "PORT", default_port())?,
            rules,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
