//! Round flow: declaring the side and resolving round outcomes, including the overtime boundary.

use crate::models::{
    Match, MatchError, MatchState, ReshuffleScope, RoundOutcome, RoundResolution, Side,
};
use chrono::Utc;

/// Declare the side for the current round. From Setup this starts round 1.
pub fn start_side(game: &mut Match, side: Side) -> Result<(), MatchError> {
    if game.is_finished() {
        return Err(MatchError::MatchFinished);
    }
    game.playing_on_side = Some(side);
    if game.curr_round == 0 {
        game.curr_round = 1;
        game.state = MatchState::RoundInProgress;
        log::info!("Match {} started on {}", game.id, side);
    }
    Ok(())
}

/// True if resolving `outcome` now would tie regulation and send the match to overtime.
pub fn requires_overtime_side(game: &Match, outcome: RoundOutcome) -> bool {
    !game.overtime
        && game.curr_round == game.rules.regulation_rounds()
        && game.scores.opponent_of(outcome) == game.rules.rounds_to_win - 1
}

/// Apply a round outcome. `overtime_side` is mandatory when the round ties regulation.
///
/// Returns whether the match continues. Rejections leave the match untouched.
pub fn resolve_round(
    game: &mut Match,
    outcome: RoundOutcome,
    overtime_side: Option<Side>,
) -> Result<RoundResolution, MatchError> {
    if game.is_finished() {
        return Err(MatchError::MatchFinished);
    }
    let side = game.playing_on_side.ok_or(MatchError::SideNotChosen)?;
    let entering_overtime = requires_overtime_side(game, outcome);
    if entering_overtime && overtime_side.is_none() {
        return Err(MatchError::OvertimeSideRequired);
    }

    let resolved_round = game.curr_round;
    game.scores = game.scores.after(outcome);
    game.curr_round += 1;
    game.last_lineup = None;
    if game.rules.reshuffle_scope == ReshuffleScope::Round {
        game.reshuffles = 0;
    }
    if entering_overtime {
        game.overtime = true;
    }

    let target = if game.overtime {
        game.rules.overtime_rounds_to_win
    } else {
        game.rules.rounds_to_win
    };
    if game.scores.leader() >= target {
        game.state = MatchState::Finished;
        game.finished_at = Some(Utc::now());
        log::info!(
            "Match {} finished {}:{} after {} round(s)",
            game.id,
            game.scores.blue,
            game.scores.red,
            resolved_round
        );
        return Ok(RoundResolution::MatchOver);
    }

    game.playing_on_side = Some(match overtime_side {
        Some(ot) => ot,
        None => match game.rules.side_switch_every {
            Some(n) if !game.overtime && resolved_round % n == 0 => side.opposite(),
            _ => side,
        },
    });
    log::info!(
        "Match {} round {} {:?}; score {}:{}",
        game.id,
        resolved_round,
        outcome,
        game.scores.blue,
        game.scores.red
    );
    Ok(RoundResolution::Continue)
}
