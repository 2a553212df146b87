use uuid::Uuid;

use crate::domain::rules::{dealer_seat_for_round, ROUND_HAND_SIZES, SEATS, TOTAL_ROUNDS};
use crate::domain::state::Game;
use crate::domain::test_fixtures::{make_game, player, players};
use crate::errors::domain::{DomainError, ValidationKind};

#[test]
fn new_game_is_fully_formed() {
    let game = make_game(1);
    assert_eq!(game.rounds.len(), TOTAL_ROUNDS);
    assert_eq!(game.current_round_index, 0);
    for (ri, round) in game.rounds.iter().enumerate() {
        assert_eq!(round.round_index as usize, ri);
        assert_eq!(round.hand_size, ROUND_HAND_SIZES[ri]);
        assert_eq!(round.player_rounds.len(), SEATS);
        assert!(!round.bids_entered);
        assert!(!round.is_complete);
        for pr in &round.player_rounds {
            assert_eq!((pr.bid, pr.board_level, pr.tricks_taken), (0, 0, 0));
            assert!(!pr.rainbow && !pr.jobo);
        }
    }
}

#[test]
fn dealer_rotates_one_seat_per_round_for_every_start() {
    for start in 0..SEATS as u8 {
        let game = make_game(start);
        for (ri, round) in game.rounds.iter().enumerate() {
            let expected_seat = dealer_seat_for_round(start as usize, ri);
            assert_eq!(round.dealer_player_id, game.player_ids[expected_seat]);
        }
    }
}

#[test]
fn game_requires_exactly_the_seat_count() {
    let err = Game::new(
        Uuid::from_u128(7),
        players()[..SEATS - 1].to_vec(),
        0,
        player(0),
        time::macros::datetime!(2025-06-01 12:00 UTC),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::SeatCount, _)
    ));
}

#[test]
fn game_rejects_duplicate_seating() {
    let mut ids = players();
    ids[1] = ids[0];
    let err = Game::new(
        Uuid::from_u128(8),
        ids,
        0,
        player(0),
        time::macros::datetime!(2025-06-01 12:00 UTC),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::SeatCount, _)
    ));
}

#[test]
fn declaring_a_board_clears_every_other_board() {
    let mut game = make_game(0);
    let round = &mut game.rounds[0];

    round.set_board(player(0), 2).unwrap();
    assert_eq!(round.player_round(player(0)).unwrap().board_level, 2);

    round.set_board(player(1), 1).unwrap();
    assert_eq!(round.player_round(player(0)).unwrap().board_level, 0);
    assert_eq!(round.player_round(player(1)).unwrap().board_level, 1);
}

#[test]
fn lowering_a_board_to_zero_leaves_others_alone() {
    let mut game = make_game(0);
    let round = &mut game.rounds[0];

    round.set_board(player(2), 3).unwrap();
    round.set_board(player(2), 0).unwrap();
    assert_eq!(round.player_round(player(2)).unwrap().board_level, 0);
    // Nobody else was touched on the way down.
    for pr in &round.player_rounds {
        assert_eq!(pr.board_level, 0);
    }
}

#[test]
fn board_level_above_maximum_is_rejected() {
    let mut game = make_game(0);
    let err = game.rounds[0].set_board(player(0), 6).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidBid, _)
    ));
}

#[test]
fn out_of_range_inputs_fail_fast() {
    let mut game = make_game(0);
    // Round 9 is the 1-card hand.
    assert!(game.rounds[9].apply_bid(player(0), 2, 0).is_err());
    assert!(game.rounds[9].apply_tricks(player(0), 2).is_err());
    assert!(game.rounds[0].apply_bid(Uuid::from_u128(999), 1, 0).is_err());
}

#[test]
fn completed_round_absorbs_all_mutations() {
    let mut game = make_game(0);
    let round = &mut game.rounds[0];
    round.apply_bid(player(0), 3, 0).unwrap();
    round.is_complete = true;

    round.apply_bid(player(0), 5, 0).unwrap();
    round.apply_tricks(player(0), 4).unwrap();
    round.apply_rainbow(player(0), true).unwrap();
    round.apply_jobo(player(0), true).unwrap();
    round.set_board(player(1), 2).unwrap();

    let pr = round.player_round(player(0)).unwrap();
    assert_eq!(pr.bid, 3);
    assert_eq!(pr.tricks_taken, 0);
    assert!(!pr.rainbow && !pr.jobo);
    assert_eq!(round.player_round(player(1)).unwrap().board_level, 0);
}
