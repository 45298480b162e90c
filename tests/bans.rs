//! Integration tests for map selection, operator bans and ban suggestions.

use rainbow_match_web::{
    ban_operators, create_match, resolve_round, set_map, start_side, suggest_bans, Catalog,
    ErrorKind, Match, MatchError, MatchRules, Player, RoundOutcome, Side, WeightedRatio,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn new_match() -> Match {
    Match::new(vec![Player::new("a", "<@a>")], MatchRules::default()).unwrap()
}

fn finished() -> Match {
    let mut game = new_match();
    start_side(&mut game, Side::Attack).unwrap();
    for _ in 0..4 {
        resolve_round(&mut game, RoundOutcome::Won, None).unwrap();
    }
    assert!(game.is_finished());
    game
}

#[test]
fn ban_reports_each_token_in_order() {
    let catalog = Catalog::builtin();
    let mut game = new_match();
    let resolved =
        ban_operators(&mut game, catalog, &WeightedRatio, "Caveira Jager xyzzyq", true).unwrap();
    assert_eq!(
        resolved,
        vec![Some("Caveira".to_string()), Some("Jager".to_string()), None]
    );
    assert_eq!(game.banned_operators.len(), 2);
    assert!(game.banned_operators.contains("Caveira"));
    assert!(game.banned_operators.contains("Jager"));
}

#[test]
fn ban_tolerates_typos_and_partial_names() {
    let catalog = Catalog::builtin();
    let mut game = new_match();
    let resolved = ban_operators(&mut game, catalog, &WeightedRatio, "cav thermit", true).unwrap();
    assert_eq!(
        resolved,
        vec![Some("Caveira".to_string()), Some("Thermite".to_string())]
    );
}

#[test]
fn banning_twice_keeps_one_entry() {
    let catalog = Catalog::builtin();
    let mut game = new_match();
    ban_operators(&mut game, catalog, &WeightedRatio, "Ash", true).unwrap();
    let again = ban_operators(&mut game, catalog, &WeightedRatio, "ash", true).unwrap();
    assert_eq!(again, vec![Some("Ash".to_string())]);
    assert_eq!(game.banned_operators.len(), 1);
}

#[test]
fn unban_removes_and_reports_even_when_not_banned() {
    let catalog = Catalog::builtin();
    let mut game = new_match();
    ban_operators(&mut game, catalog, &WeightedRatio, "Caveira Jager", true).unwrap();

    let resolved = ban_operators(&mut game, catalog, &WeightedRatio, "Jager Smoke", false).unwrap();
    assert_eq!(
        resolved,
        vec![Some("Jager".to_string()), Some("Smoke".to_string())]
    );
    assert_eq!(
        game.banned_operators.iter().cloned().collect::<Vec<_>>(),
        vec!["Caveira".to_string()]
    );
}

#[test]
fn bans_are_closed_once_the_match_is_over() {
    let catalog = Catalog::builtin();
    let mut game = finished();
    let before = game.clone();
    let err = ban_operators(&mut game, catalog, &WeightedRatio, "Ash", true).unwrap_err();
    assert_eq!(err, MatchError::MatchFinished);
    assert_eq!(game, before);
}

#[test]
fn suggestions_are_distinct_catalog_entries() {
    let catalog = Catalog::builtin();
    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let s = suggest_bans(catalog, &mut rng);
        assert!(catalog.map(&s.map).is_some());
        assert!(catalog.attackers.contains(&s.attack.primary));
        assert!(catalog.attackers.contains(&s.attack.fallback));
        assert_ne!(s.attack.primary, s.attack.fallback);
        assert!(catalog.defenders.contains(&s.defense.primary));
        assert!(catalog.defenders.contains(&s.defense.fallback));
        assert_ne!(s.defense.primary, s.defense.fallback);
    }
}

#[test]
fn creating_a_match_suggests_without_banning() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(11);
    let (game, suggestions) = create_match(
        vec![Player::new("a", "<@a>")],
        MatchRules::default(),
        catalog,
        &mut rng,
    )
    .unwrap();
    assert!(game.banned_operators.is_empty());
    assert!(game.map.is_none());
    assert!(catalog.map(&suggestions.map).is_some());
}

#[test]
fn map_resolves_exactly_or_fuzzily() {
    let catalog = Catalog::builtin();
    let mut game = new_match();
    assert_eq!(set_map(&mut game, catalog, &WeightedRatio, "oregn").unwrap(), "Oregon");
    assert_eq!(
        set_map(&mut game, catalog, &WeightedRatio, "KAFE DOSTOYEVSKY").unwrap(),
        "Kafe Dostoyevsky"
    );
    assert_eq!(
        set_map(&mut game, catalog, &WeightedRatio, "kafe").unwrap(),
        "Kafe Dostoyevsky"
    );
    assert_eq!(
        set_map(&mut game, catalog, &WeightedRatio, "dostoyevsky kafe").unwrap(),
        "Kafe Dostoyevsky"
    );
    assert_eq!(game.map.as_deref(), Some("Kafe Dostoyevsky"));
}

#[test]
fn unknown_map_keeps_the_previous_one() {
    let catalog = Catalog::builtin();
    let mut game = new_match();
    set_map(&mut game, catalog, &WeightedRatio, "Oregon").unwrap();
    let err = set_map(&mut game, catalog, &WeightedRatio, "Narnia").unwrap_err();
    assert_eq!(err, MatchError::InvalidMap("Narnia".to_string()));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(game.map.as_deref(), Some("Oregon"));
}

#[test]
fn map_can_change_mid_match_but_not_after() {
    let catalog = Catalog::builtin();
    let mut game = new_match();
    start_side(&mut game, Side::Defense).unwrap();
    set_map(&mut game, catalog, &WeightedRatio, "Villa").unwrap();
    assert_eq!(game.map.as_deref(), Some("Villa"));

    let mut over = finished();
    assert_eq!(
        set_map(&mut over, catalog, &WeightedRatio, "Villa").unwrap_err(),
        MatchError::MatchFinished
    );
}
