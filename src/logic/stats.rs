//! Recording player achievements into the match and the all-time ledger together.

use crate::models::{Match, MatchError, PlayerStat};
use crate::session::StatLedger;

/// Count `stat` for a rostered player, in this match and all-time, as one step.
///
/// The ledger is written first; if it fails the match counter is left alone, so the two never
/// drift apart. Returns the match-scoped count.
pub fn record_stat<L: StatLedger + ?Sized>(
    game: &mut Match,
    ledger: &mut L,
    player_id: &str,
    stat: PlayerStat,
) -> Result<u32, MatchError> {
    if !game.has_player(player_id) {
        return Err(MatchError::PlayerNotInMatch(player_id.to_string()));
    }
    let all_time = ledger
        .increment(player_id, stat)
        .map_err(|e| MatchError::LedgerUnavailable(e.to_string()))?;
    let count = game.stats_this_match.increment(player_id, stat);
    log::info!(
        "Recorded {} for {} in match {} (match: {}, all-time: {})",
        stat,
        player_id,
        game.id,
        count,
        all_time
    );
    Ok(count)
}
