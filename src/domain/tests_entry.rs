use crate::domain::entry::{EntryFlow, EntryPhase, EntrySignal};
use crate::domain::state::{Game, Suit};
use crate::domain::test_fixtures::{make_game, player};

/// Round 0 of a dealer-0 game: 10 cards, bid order 1,2,3,4,0.
fn open_round_zero(game: &Game) -> EntryFlow {
    EntryFlow::open(game, 0).unwrap()
}

fn enter_all_bids(flow: &mut EntryFlow, bids: &[u8]) -> EntrySignal {
    let mut last = EntrySignal::Continue;
    for &b in bids {
        last = flow.enter_bid(b).unwrap();
    }
    last
}

/// Commit bids through the round so a fresh flow starts at trick entry.
fn commit_bids_directly(game: &mut Game, round_index: u8, suit: Suit, bids: &[(u128, u8, u8)]) {
    let round = game.round_mut(round_index).unwrap();
    round.trump_suit = Some(suit);
    for &(p, bid, level) in bids {
        round.apply_bid(player(p), bid, level).unwrap();
    }
    round.bids_entered = true;
}

#[test]
fn bid_session_walks_dealer_relative_order_and_commits() {
    let game = make_game(0);
    let mut flow = open_round_zero(&game);
    assert_eq!(flow.phase(), EntryPhase::Trump);

    assert_eq!(flow.select_suit(Suit::Spades).unwrap(), EntrySignal::Continue);
    assert_eq!(flow.phase(), EntryPhase::Bids { step: 0 });
    // Left of dealer bids first.
    assert_eq!(flow.current_player(), Some(player(1)));

    let signal = enter_all_bids(&mut flow, &[2, 1, 3, 2, 1]);
    let commit = match signal {
        EntrySignal::CommitBids(c) => c,
        other => panic!("expected bids commit, got {other:?}"),
    };
    assert_eq!(commit.trump_suit, Suit::Spades);
    let expected: Vec<(u128, u8)> = vec![(1, 2), (2, 1), (3, 3), (4, 2), (0, 1)];
    for (entry, (p, bid)) in commit.bids.iter().zip(expected) {
        assert_eq!(entry.player_id, player(p));
        assert_eq!(entry.bid, bid);
        assert_eq!(entry.board_level, 0);
    }
    // Bidding is unconstrained: totals need not match the hand size.
    assert_eq!(flow.bid_total(), 9);
}

#[test]
fn bid_rejects_more_than_the_hand() {
    let game = make_game(0);
    let mut flow = open_round_zero(&game);
    flow.select_suit(Suit::Hearts).unwrap();
    assert!(flow.enter_bid(11).is_err());
    // The step did not advance.
    assert_eq!(flow.phase(), EntryPhase::Bids { step: 0 });
}

#[test]
fn board_declarations_escalate_over_earlier_players() {
    let game = make_game(0);
    let mut flow = open_round_zero(&game);
    flow.select_suit(Suit::Clubs).unwrap();

    flow.enter_bid(4).unwrap();
    assert_eq!(flow.next_board_level(), 1);
    flow.declare_board().unwrap();
    // A later board sits one tier above the standing one.
    assert_eq!(flow.next_board_level(), 2);
    flow.declare_board().unwrap();
    flow.enter_bid(0).unwrap();
    let commit = match flow.declare_board().unwrap() {
        EntrySignal::CommitBids(c) => c,
        other => panic!("expected bids commit, got {other:?}"),
    };

    let levels: Vec<u8> = commit.bids.iter().map(|b| b.board_level).collect();
    assert_eq!(levels, vec![0, 1, 2, 0, 3]);
    // A board is an implicit bid of the whole hand.
    assert_eq!(commit.bids[1].bid, 10);
}

#[test]
fn board_level_caps_at_five() {
    // Round 3 has 7 cards; every player boards.
    let game = make_game(0);
    let mut flow = EntryFlow::open(&game, 3).unwrap();
    flow.select_suit(Suit::Diamonds).unwrap();
    let mut last = EntrySignal::Continue;
    for _ in 0..5 {
        last = flow.declare_board().unwrap();
    }
    let commit = match last {
        EntrySignal::CommitBids(c) => c,
        other => panic!("expected bids commit, got {other:?}"),
    };
    let levels: Vec<u8> = commit.bids.iter().map(|b| b.board_level).collect();
    assert_eq!(levels, vec![1, 2, 3, 4, 5]);
}

#[test]
fn back_walks_bids_and_reentry_overwrites() {
    let game = make_game(0);
    let mut flow = open_round_zero(&game);
    flow.select_suit(Suit::Hearts).unwrap();
    flow.enter_bid(3).unwrap();
    flow.declare_board().unwrap();
    assert_eq!(flow.phase(), EntryPhase::Bids { step: 2 });

    // Step back to the board declarer and replace with a numeric bid.
    flow.back();
    assert_eq!(flow.phase(), EntryPhase::Bids { step: 1 });
    flow.enter_bid(2).unwrap();
    assert_eq!(flow.bid_total(), 5);

    // Back through step 0 lands on trump for a plain hand.
    flow.back();
    flow.back();
    assert_eq!(flow.phase(), EntryPhase::Bids { step: 0 });
    let signal = flow.back();
    assert_eq!(signal, EntrySignal::Continue);
    assert_eq!(flow.phase(), EntryPhase::Trump);
}

#[test]
fn rainbow_hand_visits_declaration_screens() {
    let game = make_game(0);
    // Round 6 is the 4-card hand.
    let mut flow = EntryFlow::open(&game, 6).unwrap();
    flow.select_suit(Suit::Spades).unwrap();
    assert_eq!(flow.phase(), EntryPhase::Rainbow);

    flow.toggle_rainbow(player(2)).unwrap();
    assert!(flow.rainbow(player(2)));
    flow.confirm_rainbows().unwrap();
    assert_eq!(flow.phase(), EntryPhase::Jobo);

    // JoBo on the same player knocks the rainbow off.
    flow.toggle_jobo(player(2)).unwrap();
    assert!(flow.jobo(player(2)));
    assert!(!flow.rainbow(player(2)));
    flow.toggle_jobo(player(4)).unwrap();
    flow.confirm_jobos().unwrap();
    assert_eq!(flow.phase(), EntryPhase::Bids { step: 0 });

    let commit = match enter_all_bids(&mut flow, &[1, 1, 0, 1, 1]) {
        EntrySignal::CommitBids(c) => c,
        other => panic!("expected bids commit, got {other:?}"),
    };
    assert!(commit.jobos.contains(&(player(2), true)));
    assert!(commit.jobos.contains(&(player(4), true)));
    assert!(commit.rainbows.iter().all(|&(_, flag)| !flag));
}

#[test]
fn back_navigation_covers_declaration_screens() {
    let game = make_game(0);
    let mut flow = EntryFlow::open(&game, 6).unwrap();
    flow.select_suit(Suit::Hearts).unwrap();
    flow.confirm_rainbows().unwrap();
    flow.confirm_jobos().unwrap();
    assert_eq!(flow.phase(), EntryPhase::Bids { step: 0 });

    flow.back();
    assert_eq!(flow.phase(), EntryPhase::Jobo);
    flow.back();
    assert_eq!(flow.phase(), EntryPhase::Rainbow);
    flow.back();
    assert_eq!(flow.phase(), EntryPhase::Trump);
}

#[test]
fn declaration_toggles_outside_their_screen_are_rejected() {
    let game = make_game(0);
    let mut flow = open_round_zero(&game);
    // Non-rainbow hand: no declaration phase at all.
    flow.select_suit(Suit::Spades).unwrap();
    assert!(flow.toggle_rainbow(player(0)).is_err());
    assert!(flow.confirm_rainbows().is_err());
}

#[test]
fn reopening_a_bid_round_starts_at_tricks() {
    let mut game = make_game(0);
    commit_bids_directly(
        &mut game,
        0,
        Suit::Spades,
        &[(1, 2, 0), (2, 1, 0), (3, 3, 0), (4, 2, 0), (0, 1, 0)],
    );

    let flow = EntryFlow::open(&game, 0).unwrap();
    assert_eq!(flow.phase(), EntryPhase::Tricks { step: 0 });
    assert_eq!(flow.trump_suit(), Some(Suit::Spades));

    // Highest effective bid reports first; ties break toward the seat
    // closer to left-of-dealer in the bid rotation.
    let order = flow.trick_order_players();
    assert_eq!(
        order,
        vec![player(3), player(1), player(4), player(2), player(0)]
    );
    assert_eq!(flow.current_player(), Some(player(3)));
}

#[test]
fn board_leads_trick_entry_regardless_of_position() {
    let mut game = make_game(0);
    // Seat 0 (the dealer, last in bid order) declares a board.
    commit_bids_directly(
        &mut game,
        0,
        Suit::Hearts,
        &[(1, 9, 0), (2, 1, 0), (3, 3, 0), (4, 2, 0), (0, 10, 2)],
    );

    let flow = EntryFlow::open(&game, 0).unwrap();
    assert_eq!(flow.trick_order_players()[0], player(0));
}

#[test]
fn trick_totals_must_match_the_hand() {
    let mut game = make_game(0);
    commit_bids_directly(
        &mut game,
        0,
        Suit::Spades,
        &[(1, 2, 0), (2, 1, 0), (3, 3, 0), (4, 2, 0), (0, 1, 0)],
    );
    let mut flow = EntryFlow::open(&game, 0).unwrap();

    // 2+1+3+2+1 = 9 on a 10-card hand: rejected into the error state.
    for &t in &[2, 1, 3, 2] {
        assert_eq!(flow.enter_tricks(t).unwrap(), EntrySignal::Continue);
    }
    assert_eq!(flow.enter_tricks(1).unwrap(), EntrySignal::Continue);
    assert_eq!(flow.phase(), EntryPhase::TricksError);
    assert_eq!(flow.tricks_total(), 9);

    // Back returns to the last player for correction.
    flow.back();
    assert_eq!(flow.phase(), EntryPhase::Tricks { step: 4 });
    let commit = match flow.enter_tricks(2).unwrap() {
        EntrySignal::CommitTricks(c) => c,
        other => panic!("expected tricks commit, got {other:?}"),
    };
    let total: u8 = commit.tricks.iter().map(|&(_, t)| t).sum();
    assert_eq!(total, 10);
    // Payload follows the trick-entry rotation.
    assert_eq!(commit.tricks[0].0, player(3));
}

#[test]
fn back_from_first_trick_step_closes_the_flow() {
    let mut game = make_game(0);
    commit_bids_directly(&mut game, 0, Suit::Clubs, &[(1, 2, 0)]);
    let mut flow = EntryFlow::open(&game, 0).unwrap();
    assert_eq!(flow.back(), EntrySignal::Closed);
}

#[test]
fn tricks_above_hand_size_are_rejected() {
    let mut game = make_game(0);
    commit_bids_directly(&mut game, 9, Suit::Clubs, &[(0, 1, 0)]);
    let mut flow = EntryFlow::open(&game, 9).unwrap();
    assert!(flow.enter_tricks(2).is_err());
}

#[test]
fn open_rejects_completed_rounds_and_bad_indexes() {
    let mut game = make_game(0);
    game.rounds[0].is_complete = true;
    assert!(EntryFlow::open(&game, 0).is_err());
    assert!(EntryFlow::open(&game, 20).is_err());
}
