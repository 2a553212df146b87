use crate::domain::scoring::{recalculate, round_score};
use crate::domain::test_fixtures::{make_game, player};

#[test]
fn zero_bid_branches_are_distinct() {
    // Clean zero scores nothing; a missed zero earns per trick, no penalty.
    assert_eq!(round_score(0, 0, 0, 5, false), 0);
    assert_eq!(round_score(0, 0, 1, 10, false), 1);
    assert_eq!(round_score(0, 0, 2, 5, false), 2);
}

#[test]
fn made_bid_pays_three_per_bid_plus_overtricks() {
    assert_eq!(round_score(3, 0, 3, 10, false), 9);
    assert_eq!(round_score(2, 0, 4, 10, false), 8);
    assert_eq!(round_score(5, 0, 7, 10, false), 17);
    assert_eq!(round_score(1, 0, 1, 1, false), 3);
}

#[test]
fn missed_bid_costs_flat_three_per_bid() {
    assert_eq!(round_score(3, 0, 2, 10, false), -9);
    assert_eq!(round_score(3, 0, 0, 10, false), -9);
    assert_eq!(round_score(1, 0, 0, 5, false), -3);
}

#[test]
fn board_is_all_or_nothing() {
    // Level 1 on a 6-card hand: +-36.
    assert_eq!(round_score(6, 1, 6, 6, false), 36);
    assert_eq!(round_score(6, 1, 5, 6, false), -36);
    // One trick short is as bad as none.
    assert_eq!(round_score(6, 1, 0, 6, false), -36);
}

#[test]
fn board_levels_scale_linearly() {
    for level in 1..=5u8 {
        let expected = 6 * level as i32 * 5;
        assert_eq!(round_score(5, level, 5, 5, false), expected);
        assert_eq!(round_score(5, level, 4, 5, false), -expected);
    }
    assert_eq!(round_score(10, 5, 10, 10, false), 300);
}

#[test]
fn rainbow_bonus_is_additive_on_the_rainbow_hand() {
    assert_eq!(round_score(2, 0, 2, 4, true), 14);
    assert_eq!(round_score(0, 0, 0, 4, true), 8);
    // On top of a board, win or lose.
    assert_eq!(round_score(4, 1, 4, 4, true), 32);
    assert_eq!(round_score(4, 1, 3, 4, true), -16);
    assert_eq!(round_score(4, 2, 4, 4, true), 56);
}

#[test]
fn rainbow_bonus_ignored_off_the_rainbow_hand() {
    assert_eq!(round_score(2, 0, 2, 5, true), 6);
    assert_eq!(round_score(2, 0, 2, 4, false), 6);
}

#[test]
fn recalculate_chains_cumulative_totals_in_round_order() {
    let mut game = make_game(0);

    // Round 0 (10 cards): p0 makes 3 exactly, p1 misses 2.
    game.rounds[0].apply_bid(player(0), 3, 0).unwrap();
    game.rounds[0].apply_tricks(player(0), 3).unwrap();
    game.rounds[0].apply_bid(player(1), 2, 0).unwrap();
    game.rounds[0].apply_tricks(player(1), 1).unwrap();

    // Round 1 (9 cards): p0 takes one overtrick on a bid of 2.
    game.rounds[1].apply_bid(player(0), 2, 0).unwrap();
    game.rounds[1].apply_tricks(player(0), 3).unwrap();

    recalculate(&mut game);

    assert_eq!(game.rounds[0].player_round(player(0)).unwrap().score, 9);
    assert_eq!(game.rounds[0].player_round(player(1)).unwrap().score, -6);
    assert_eq!(game.rounds[1].player_round(player(0)).unwrap().score, 7);
    assert_eq!(
        game.rounds[1].player_round(player(0)).unwrap().cumulative_score,
        16
    );
    assert_eq!(
        game.rounds[1].player_round(player(1)).unwrap().cumulative_score,
        -6
    );
}

#[test]
fn recalculate_is_idempotent() {
    let mut game = make_game(2);
    game.rounds[0].apply_bid(player(3), 4, 0).unwrap();
    game.rounds[0].apply_tricks(player(3), 4).unwrap();
    game.rounds[5].apply_bid(player(1), 2, 1).unwrap();
    game.rounds[5].apply_tricks(player(1), 5).unwrap();

    recalculate(&mut game);
    let first = game.clone();
    recalculate(&mut game);
    assert_eq!(game, first);
}
