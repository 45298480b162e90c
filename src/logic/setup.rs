//! Setup phase: creating a match and choosing the map.

use crate::logic::bans::{suggest_bans, BanSuggestions};
use crate::logic::fuzzy::{self, FuzzyMatcher};
use crate::models::{Catalog, Match, MatchError, MatchRules, Player};
use rand::Rng;

/// Create a match for `players` together with the ban suggestions shown at creation.
pub fn create_match<R: Rng + ?Sized>(
    players: Vec<Player>,
    rules: MatchRules,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<(Match, BanSuggestions), MatchError> {
    let game = Match::new(players, rules)?;
    Ok((game, suggest_bans(catalog, rng)))
}

/// Set the map by exact or fuzzy (case-insensitive) name. Allowed until the match is finished.
///
/// Returns the catalog name that was set; on failure the previous map is kept.
pub fn set_map<M: FuzzyMatcher + ?Sized>(
    game: &mut Match,
    catalog: &Catalog,
    matcher: &M,
    name: &str,
) -> Result<String, MatchError> {
    if game.is_finished() {
        return Err(MatchError::MatchFinished);
    }
    let maps = catalog.map_names();
    let resolved = maps
        .iter()
        .find(|m| m.eq_ignore_ascii_case(name.trim()))
        .cloned()
        .or_else(|| fuzzy::resolve(matcher, name, &maps))
        .ok_or_else(|| MatchError::InvalidMap(name.to_string()))?;
    game.map = Some(resolved.clone());
    Ok(resolved)
}
