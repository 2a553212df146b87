use proptest::prelude::*;

use crate::domain::rules::{RAINBOW_BONUS, RAINBOW_HAND_SIZE};
use crate::domain::scoring::{recalculate, round_score};
use crate::domain::test_fixtures::{make_game, player};

proptest! {
    #[test]
    fn board_make_and_miss_are_symmetric(
        level in 1u8..=5,
        hand_size in 1u8..=10,
        short in 1u8..=10,
    ) {
        let expected = 6 * level as i32 * hand_size as i32;
        prop_assert_eq!(round_score(hand_size, level, hand_size, hand_size, false), expected);
        let taken = hand_size.saturating_sub(short);
        prop_assume!(taken < hand_size);
        prop_assert_eq!(round_score(hand_size, level, taken, hand_size, false), -expected);
    }

    #[test]
    fn made_bids_pay_three_per_bid_plus_overtricks(
        hand_size in 1u8..=10,
        bid in 1u8..=10,
        over in 0u8..=10,
    ) {
        prop_assume!(bid <= hand_size);
        let taken = bid + over;
        prop_assume!(taken <= hand_size);
        prop_assert_eq!(
            round_score(bid, 0, taken, hand_size, false),
            3 * bid as i32 + over as i32
        );
    }

    #[test]
    fn missed_bids_cost_flat_three_per_bid(
        hand_size in 1u8..=10,
        bid in 1u8..=10,
        taken in 0u8..=10,
    ) {
        prop_assume!(bid <= hand_size && taken < bid);
        prop_assert_eq!(round_score(bid, 0, taken, hand_size, false), -(3 * bid as i32));
    }

    #[test]
    fn zero_bids_earn_per_trick_taken(hand_size in 1u8..=10, taken in 0u8..=10) {
        prop_assume!(taken <= hand_size);
        prop_assert_eq!(round_score(0, 0, taken, hand_size, false), taken as i32);
    }

    #[test]
    fn rainbow_adds_exactly_the_bonus_on_its_hand(
        bid in 0u8..=4,
        level in 0u8..=5,
        taken in 0u8..=4,
    ) {
        let with = round_score(bid, level, taken, RAINBOW_HAND_SIZE, true);
        let without = round_score(bid, level, taken, RAINBOW_HAND_SIZE, false);
        prop_assert_eq!(with, without + RAINBOW_BONUS);
    }

    #[test]
    fn rainbow_is_inert_on_other_hands(
        bid in 0u8..=10,
        level in 0u8..=5,
        taken in 0u8..=10,
        hand_size in 1u8..=10,
    ) {
        prop_assume!(hand_size != RAINBOW_HAND_SIZE);
        prop_assume!(bid <= hand_size && taken <= hand_size);
        prop_assert_eq!(
            round_score(bid, level, taken, hand_size, true),
            round_score(bid, level, taken, hand_size, false)
        );
    }

    #[test]
    fn recalculation_never_drifts(
        entries in proptest::collection::vec((0usize..20, 0u128..5, 0u8..=10, 0u8..=5, 0u8..=10), 0..40)
    ) {
        let mut game = make_game(0);
        for (ri, p, bid, level, taken) in entries {
            let hand = game.rounds[ri].hand_size;
            let _ = game.rounds[ri].apply_bid(player(p), bid.min(hand), level);
            let _ = game.rounds[ri].apply_tricks(player(p), taken.min(hand));
        }
        recalculate(&mut game);
        let first = game.clone();
        recalculate(&mut game);
        prop_assert_eq!(game, first);
    }
}
