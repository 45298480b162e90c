//! Ban suggestions and applying ban/unban requests.

use crate::logic::fuzzy::{self, FuzzyMatcher};
use crate::models::{Catalog, Match, MatchError, Side};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A primary suggestion plus a fallback in case the primary is banned by the other team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BanPair {
    pub primary: String,
    pub fallback: String,
}

/// Advisory bans shown when a match is created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BanSuggestions {
    pub map: String,
    pub attack: BanPair,
    pub defense: BanPair,
}

/// One map drawn uniformly from the catalog. Does not touch any match.
pub fn suggest_map_ban<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> String {
    catalog
        .maps
        .choose(rng)
        .map(|m| m.name.clone())
        .unwrap_or_default()
}

/// Two distinct operators per side, drawn uniformly.
pub fn suggest_operator_bans<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> (BanPair, BanPair) {
    (
        draw_pair(catalog.operators(Side::Attack), rng),
        draw_pair(catalog.operators(Side::Defense), rng),
    )
}

pub fn suggest_bans<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> BanSuggestions {
    let map = suggest_map_ban(catalog, rng);
    let (attack, defense) = suggest_operator_bans(catalog, rng);
    BanSuggestions { map, attack, defense }
}

fn draw_pair<R: Rng + ?Sized>(operators: &[String], rng: &mut R) -> BanPair {
    let drawn: Vec<&String> = operators.choose_multiple(rng, 2).collect();
    let primary = drawn.first().map(|s| s.to_string()).unwrap_or_default();
    // A one-operator roster can only suggest itself twice.
    let fallback = drawn.get(1).map(|s| s.to_string()).unwrap_or_else(|| primary.clone());
    BanPair { primary, fallback }
}

/// Ban (`applying`) or unban every whitespace-separated name in `text`.
///
/// Returns, per token and in input order, the operator it resolved to or `None`. Banning an
/// already banned operator (or unbanning one that is not banned) still reports the resolution.
pub fn ban_operators<M: FuzzyMatcher + ?Sized>(
    game: &mut Match,
    catalog: &Catalog,
    matcher: &M,
    text: &str,
    applying: bool,
) -> Result<Vec<Option<String>>, MatchError> {
    if game.is_finished() {
        return Err(MatchError::MatchFinished);
    }
    let operators = catalog.all_operators();
    let resolved: Vec<Option<String>> = text
        .split_whitespace()
        .map(|token| fuzzy::resolve(matcher, token, &operators))
        .collect();
    for op in resolved.iter().flatten() {
        if applying {
            game.banned_operators.insert(op.clone());
        } else {
            game.banned_operators.remove(op);
        }
    }
    log::debug!(
        "{} {:?} in match {}; now banned: {:?}",
        if applying { "Banned" } else { "Unbanned" },
        resolved,
        game.id,
        game.banned_operators
    );
    Ok(resolved)
}
