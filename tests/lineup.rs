//! Integration tests for dealing lineups, reshuffles and swaps.

use rainbow_match_web::{
    compute_lineup, deal_lineup, operator_pool, reshuffle, set_map, start_side, swap_operator,
    Catalog, ErrorKind, Lineup, Match, MatchError, MatchRules, Player, Side, WeightedRatio,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn roster(n: usize) -> Vec<Player> {
    (0..n).map(|i| Player::new(format!("p{i}"), format!("<@p{i}>"))).collect()
}

fn started(n: usize, side: Side) -> Match {
    let mut game = Match::new(roster(n), MatchRules::default()).unwrap();
    start_side(&mut game, side).unwrap();
    game
}

fn sorted(ops: impl Iterator<Item = impl Into<String>>) -> Vec<String> {
    let mut v: Vec<String> = ops.map(Into::into).collect();
    v.sort();
    v
}

fn assert_partitions_pool(lineup: &Lineup, pool: &[String]) {
    let assigned: HashSet<&str> = lineup.assignments.iter().map(|a| a.operator.as_str()).collect();
    assert_eq!(assigned.len(), lineup.assignments.len(), "operator assigned twice");
    assert_eq!(sorted(lineup.operators()), sorted(pool.iter().cloned()));
}

#[test]
fn lineup_assigns_distinct_operators_and_keeps_the_rest_as_backups() {
    let catalog = Catalog::builtin();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let players = roster(5);
        let pool = catalog.attackers.clone();
        let lineup = compute_lineup(&players, pool.clone(), Side::Attack, &[], &mut rng).unwrap();
        assert_eq!(lineup.assignments.len(), 5);
        assert_eq!(lineup.backups.len(), pool.len() - 5);
        assert_partitions_pool(&lineup, &pool);
        let order: Vec<&Player> = lineup.assignments.iter().map(|a| &a.player).collect();
        assert_eq!(order, players.iter().collect::<Vec<_>>());
    }
}

#[test]
fn pool_excludes_bans_of_that_side_only() {
    let catalog = Catalog::builtin();
    let mut game = started(2, Side::Attack);
    game.banned_operators.insert("Thermite".to_string());
    game.banned_operators.insert("Jager".to_string());
    let attack = operator_pool(&game, catalog, Side::Attack);
    let defense = operator_pool(&game, catalog, Side::Defense);
    assert!(!attack.contains(&"Thermite".to_string()));
    assert!(!defense.contains(&"Jager".to_string()));
    assert_eq!(attack.len(), catalog.attackers.len() - 1);
    assert_eq!(defense.len(), catalog.defenders.len() - 1);
}

#[test]
fn too_many_bans_is_reported_and_nothing_is_dealt() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(1);
    let mut game = started(2, Side::Defense);
    game.banned_operators.extend(catalog.defenders.iter().skip(1).cloned());
    let err = deal_lineup(&mut game, catalog, &mut rng).unwrap_err();
    assert_eq!(err, MatchError::InsufficientOperators { needed: 2, available: 1 });
    assert!(game.last_lineup.is_none());
}

#[test]
fn defense_lineups_carry_a_site_of_the_current_map() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(2);
    let mut game = started(3, Side::Defense);

    let site = deal_lineup(&mut game, catalog, &mut rng).unwrap().site.clone().unwrap();
    assert!(catalog.generic_sites.contains(&site));

    set_map(&mut game, catalog, &WeightedRatio, "oregon").unwrap();
    let site = deal_lineup(&mut game, catalog, &mut rng).unwrap().site.clone().unwrap();
    assert!(catalog.map("Oregon").unwrap().sites.contains(&site));
}

#[test]
fn lineup_needs_a_started_round() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(3);
    let mut game = Match::new(roster(2), MatchRules::default()).unwrap();
    assert_eq!(
        deal_lineup(&mut game, catalog, &mut rng).unwrap_err(),
        MatchError::RoundNotStarted
    );
    assert_eq!(
        reshuffle(&mut game, catalog, &mut rng).unwrap_err(),
        MatchError::RoundNotStarted
    );
    assert_eq!(game.reshuffles, 0);
}

#[test]
fn third_reshuffle_is_rejected() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(4);
    let mut game = started(4, Side::Attack);
    deal_lineup(&mut game, catalog, &mut rng).unwrap();
    let pool = operator_pool(&game, catalog, Side::Attack);

    for used in 1..=2 {
        let lineup = reshuffle(&mut game, catalog, &mut rng).unwrap().clone();
        assert_partitions_pool(&lineup, &pool);
        assert_eq!(game.reshuffles, used);
    }
    let before = game.clone();
    let err = reshuffle(&mut game, catalog, &mut rng).unwrap_err();
    assert_eq!(err, MatchError::ReshuffleLimitReached { limit: 2 });
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert_eq!(game, before);
}

#[test]
fn swapping_to_a_backup_returns_the_old_operator_to_the_backups() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(5);
    let mut game = started(3, Side::Attack);
    let lineup = deal_lineup(&mut game, catalog, &mut rng).unwrap().clone();
    let backup = lineup.backups[0].clone();
    let old = lineup.operator_of("p1").unwrap().to_string();

    let after = swap_operator(&mut game, catalog, &WeightedRatio, "p1", &backup.to_lowercase())
        .unwrap()
        .clone();
    assert_eq!(after.operator_of("p1"), Some(backup.as_str()));
    assert!(after.backups.contains(&old));
    assert!(!after.backups.contains(&backup));
    assert_eq!(after.operator_of("p0"), lineup.operator_of("p0"));
    assert_partitions_pool(&after, &operator_pool(&game, catalog, Side::Attack));
}

#[test]
fn swapping_to_a_teammates_operator_trades_them() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(6);
    let mut game = started(2, Side::Defense);
    let lineup = deal_lineup(&mut game, catalog, &mut rng).unwrap().clone();
    let mine = lineup.operator_of("p0").unwrap().to_string();
    let theirs = lineup.operator_of("p1").unwrap().to_string();

    let after = swap_operator(&mut game, catalog, &WeightedRatio, "p0", &theirs)
        .unwrap()
        .clone();
    assert_eq!(after.operator_of("p0"), Some(theirs.as_str()));
    assert_eq!(after.operator_of("p1"), Some(mine.as_str()));
    assert_eq!(after.backups, lineup.backups);
    assert_eq!(after.site, lineup.site);
}

#[test]
fn swapping_to_own_operator_is_a_no_op() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(7);
    let mut game = started(2, Side::Attack);
    let lineup = deal_lineup(&mut game, catalog, &mut rng).unwrap().clone();
    let mine = lineup.operator_of("p0").unwrap().to_string();
    let after = swap_operator(&mut game, catalog, &WeightedRatio, "p0", &mine)
        .unwrap()
        .clone();
    assert_eq!(after, lineup);
}

#[test]
fn swap_rejections_leave_the_lineup_alone() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(8);
    let mut game = started(2, Side::Attack);
    deal_lineup(&mut game, catalog, &mut rng).unwrap();
    let before = game.clone();

    let err = swap_operator(&mut game, catalog, &WeightedRatio, "p0", "zzzzzz").unwrap_err();
    assert_eq!(err, MatchError::UnknownOperator("zzzzzz".to_string()));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = swap_operator(&mut game, catalog, &WeightedRatio, "ghost", "Ash").unwrap_err();
    assert_eq!(err, MatchError::PlayerNotInMatch("ghost".to_string()));
    assert_eq!(game, before);
}

#[test]
fn swap_needs_an_ongoing_round() {
    let catalog = Catalog::builtin();
    let mut game = Match::new(roster(1), MatchRules::default()).unwrap();
    assert_eq!(
        swap_operator(&mut game, catalog, &WeightedRatio, "p0", "Ash").unwrap_err(),
        MatchError::RoundNotStarted
    );
}
