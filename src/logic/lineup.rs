//! Lineup engine: random operator assignment, bounded reshuffles, and single-player swaps.

use crate::logic::fuzzy::{self, FuzzyMatcher};
use crate::models::{Assignment, Catalog, Lineup, Match, MatchError, Player, Side};
use rand::seq::SliceRandom;
use rand::Rng;

/// Operators of `side` that are not banned in this match, in catalog order.
pub fn operator_pool(game: &Match, catalog: &Catalog, side: Side) -> Vec<String> {
    catalog
        .operators(side)
        .iter()
        .filter(|op| !game.banned_operators.contains(*op))
        .cloned()
        .collect()
}

/// Deal distinct operators from `pool` to `players` (roster order); the rest become backups.
///
/// Defense lineups also carry a site drawn from `sites`.
pub fn compute_lineup<R: Rng + ?Sized>(
    players: &[Player],
    mut pool: Vec<String>,
    side: Side,
    sites: &[String],
    rng: &mut R,
) -> Result<Lineup, MatchError> {
    if pool.len() < players.len() {
        return Err(MatchError::InsufficientOperators {
            needed: players.len(),
            available: pool.len(),
        });
    }
    pool.shuffle(rng);
    let backups = pool.split_off(players.len());
    let assignments = players
        .iter()
        .cloned()
        .zip(pool)
        .map(|(player, operator)| Assignment { player, operator })
        .collect();
    let site = match side {
        Side::Attack => None,
        Side::Defense => sites.choose(rng).cloned(),
    };
    Ok(Lineup {
        assignments,
        backups,
        site,
    })
}

fn ensure_round_in_progress(game: &Match) -> Result<Side, MatchError> {
    if game.is_finished() {
        return Err(MatchError::MatchFinished);
    }
    if game.curr_round == 0 {
        return Err(MatchError::RoundNotStarted);
    }
    game.playing_on_side.ok_or(MatchError::SideNotChosen)
}

fn fresh_lineup<R: Rng + ?Sized>(
    game: &Match,
    catalog: &Catalog,
    side: Side,
    rng: &mut R,
) -> Result<Lineup, MatchError> {
    compute_lineup(
        &game.players,
        operator_pool(game, catalog, side),
        side,
        catalog.sites_for(game.map.as_deref()),
        rng,
    )
}

/// Deal the lineup for the round in progress and remember it on the match.
pub fn deal_lineup<'a, R: Rng + ?Sized>(
    game: &'a mut Match,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<&'a Lineup, MatchError> {
    let side = ensure_round_in_progress(game)?;
    let lineup = fresh_lineup(game, catalog, side, rng)?;
    log::debug!("Round {} lineup for match {}: {:?}", game.curr_round, game.id, lineup);
    Ok(game.last_lineup.insert(lineup))
}

/// Re-deal the current round, spending one reshuffle. The budget is untouched if dealing fails.
pub fn reshuffle<'a, R: Rng + ?Sized>(
    game: &'a mut Match,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<&'a Lineup, MatchError> {
    let side = ensure_round_in_progress(game)?;
    if game.reshuffles >= game.rules.reshuffle_limit {
        return Err(MatchError::ReshuffleLimitReached {
            limit: game.rules.reshuffle_limit,
        });
    }
    let lineup = fresh_lineup(game, catalog, side, rng)?;
    game.reshuffles += 1;
    log::debug!(
        "Reshuffled match {} ({} remaining)",
        game.id,
        game.reshuffles_remaining()
    );
    Ok(game.last_lineup.insert(lineup))
}

/// Give `player_id` the operator named by `operator`.
///
/// A backup operator is exchanged with the player's current one; an operator held by a teammate
/// is traded between the two. Asking for the operator already held changes nothing.
pub fn swap_operator<'a, M: FuzzyMatcher + ?Sized>(
    game: &'a mut Match,
    catalog: &Catalog,
    matcher: &M,
    player_id: &str,
    operator: &str,
) -> Result<&'a Lineup, MatchError> {
    let side = ensure_round_in_progress(game)?;
    if !game.has_player(player_id) {
        return Err(MatchError::PlayerNotInMatch(player_id.to_string()));
    }
    let pool = operator_pool(game, catalog, side);
    let desired = fuzzy::resolve(matcher, operator, &pool)
        .ok_or_else(|| MatchError::UnknownOperator(operator.to_string()))?;

    let mut lineup = game.last_lineup.clone().ok_or(MatchError::NoLineup)?;
    let target = lineup
        .assignments
        .iter()
        .position(|a| a.player.id == player_id)
        .ok_or(MatchError::NoLineup)?;
    let current = lineup.assignments[target].operator.clone();
    if current == desired {
        return game.last_lineup.as_ref().ok_or(MatchError::NoLineup);
    }

    if let Some(other) = lineup.assignments.iter().position(|a| a.operator == desired) {
        lineup.assignments[other].operator = current;
    } else if let Some(slot) = lineup.backups.iter().position(|op| *op == desired) {
        lineup.backups[slot] = current;
    } else {
        // Unbanned after the lineup was dealt.
        lineup.backups.push(current);
    }
    lineup.assignments[target].operator = desired;
    log::debug!("Swapped operator for {} in match {}", player_id, game.id);
    Ok(game.last_lineup.insert(lineup))
}
