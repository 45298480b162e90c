//! Integration tests for match creation and roster management.

use rainbow_match_web::{
    start_side, ErrorKind, Match, MatchError, MatchRules, MatchState, Player, Side, MAX_PLAYERS,
};

fn players(ids: &[&str]) -> Vec<Player> {
    ids.iter().map(|id| Player::new(*id, format!("<@{id}>"))).collect()
}

fn ids(game: &Match) -> Vec<&str> {
    game.players.iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn create_initializes_everything_to_zero() {
    let game = Match::new(players(&["a", "b"]), MatchRules::default()).unwrap();
    assert_eq!(game.state, MatchState::Setup);
    assert_eq!(game.curr_round, 0);
    assert_eq!(game.playing_on_side, None);
    assert_eq!((game.scores.blue, game.scores.red), (0, 0));
    assert_eq!(game.reshuffles, 0);
    assert!(game.banned_operators.is_empty());
    assert!(game.map.is_none());
    assert!(game.stats_this_match.is_empty());
    assert!(game.last_lineup.is_none());
}

#[test]
fn create_rejects_empty_and_oversized_rosters() {
    assert_eq!(
        Match::new(Vec::new(), MatchRules::default()).unwrap_err(),
        MatchError::NoPlayers
    );
    let err = Match::new(players(&["1", "2", "3", "4", "5", "6"]), MatchRules::default()).unwrap_err();
    assert_eq!(err, MatchError::TooManyPlayers { max: MAX_PLAYERS, requested: 6 });
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn create_rejects_duplicate_players() {
    assert!(matches!(
        Match::new(players(&["a", "a"]), MatchRules::default()),
        Err(MatchError::DuplicatePlayer(id)) if id == "a"
    ));
}

#[test]
fn add_players_puts_newcomers_first() {
    let mut game = Match::new(players(&["a", "b"]), MatchRules::default()).unwrap();
    game.add_players(players(&["c", "d"])).unwrap();
    assert_eq!(ids(&game), vec!["c", "d", "a", "b"]);
}

#[test]
fn add_players_never_exceeds_the_cap() {
    for size in 1..=MAX_PLAYERS {
        let roster: Vec<String> = (0..size).map(|i| format!("p{i}")).collect();
        let roster: Vec<&str> = roster.iter().map(String::as_str).collect();
        let mut game = Match::new(players(&roster), MatchRules::default()).unwrap();
        let free = MAX_PLAYERS - size;
        let extra: Vec<String> = (0..=free).map(|i| format!("x{i}")).collect();
        let extra: Vec<&str> = extra.iter().map(String::as_str).collect();

        let before = game.players.clone();
        let err = game.add_players(players(&extra)).unwrap_err();
        assert!(matches!(err, MatchError::TooManyPlayers { .. }));
        assert_eq!(game.players, before);

        if free > 0 {
            game.add_players(players(&extra[..free])).unwrap();
            assert_eq!(game.players.len(), MAX_PLAYERS);
        }
    }
}

#[test]
fn add_rejects_player_already_in_match() {
    let mut game = Match::new(players(&["a", "b"]), MatchRules::default()).unwrap();
    assert!(matches!(
        game.add_players(players(&["c", "a"])),
        Err(MatchError::DuplicatePlayer(id)) if id == "a"
    ));
    assert_eq!(ids(&game), vec!["a", "b"]);
}

#[test]
fn removing_the_whole_roster_fails_and_changes_nothing() {
    let mut game = Match::new(players(&["a", "b", "c"]), MatchRules::default()).unwrap();
    let all: Vec<String> = game.players.iter().map(|p| p.id.clone()).collect();
    let err = game.remove_players(&all).unwrap_err();
    assert_eq!(err, MatchError::CannotRemoveAllPlayers);
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert_eq!(ids(&game), vec!["a", "b", "c"]);
}

#[test]
fn remove_keeps_order_of_the_rest() {
    let mut game = Match::new(players(&["a", "b", "c"]), MatchRules::default()).unwrap();
    game.remove_players(&["b".to_string()]).unwrap();
    assert_eq!(ids(&game), vec!["a", "c"]);
}

#[test]
fn remove_unknown_player_is_not_found() {
    let mut game = Match::new(players(&["a", "b"]), MatchRules::default()).unwrap();
    let err = game.remove_players(&["a".to_string(), "zz".to_string()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ids(&game), vec!["a", "b"]);
}

#[test]
fn roster_is_frozen_once_the_match_started() {
    let mut game = Match::new(players(&["a", "b"]), MatchRules::default()).unwrap();
    start_side(&mut game, Side::Attack).unwrap();

    assert_eq!(game.add_players(players(&["c"])), Err(MatchError::MatchAlreadyStarted));
    assert_eq!(game.set_players(players(&["c"])), Err(MatchError::MatchAlreadyStarted));
    assert_eq!(
        game.remove_players(&["a".to_string()]),
        Err(MatchError::MatchAlreadyStarted)
    );
    assert_eq!(ids(&game), vec!["a", "b"]);
}

#[test]
fn set_players_replaces_roster_in_setup() {
    let mut game = Match::new(players(&["a"]), MatchRules::default()).unwrap();
    game.set_players(players(&["x", "y"])).unwrap();
    assert_eq!(ids(&game), vec!["x", "y"]);
    assert_eq!(game.set_players(Vec::new()), Err(MatchError::NoPlayers));
    assert_eq!(ids(&game), vec!["x", "y"]);
}

#[test]
fn invalid_rules_are_rejected_at_creation() {
    let rules = MatchRules {
        overtime_rounds_to_win: 2,
        ..MatchRules::default()
    };
    assert!(matches!(
        Match::new(players(&["a"]), rules),
        Err(MatchError::InvalidRules(_))
    ));
}
