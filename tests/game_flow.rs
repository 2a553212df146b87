//! End-to-end tests driving the lifecycle controller through the entry flow
//! against the in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use back_alley::domain::rules::{ROUND_HAND_SIZES, SEATS, TOTAL_ROUNDS};
use back_alley::{
    EntryPhase, EntrySignal, GameFlowService, GameStatus, GameStore, MemoryStore, PlayerId,
    PlayerProfile, StaticRoster, Suit, TricksCommit,
};
use uuid::Uuid;

fn players() -> Vec<PlayerId> {
    (1..=SEATS as u128).map(Uuid::from_u128).collect()
}

fn service() -> (Arc<MemoryStore>, GameFlowService) {
    let store = Arc::new(MemoryStore::new());
    let svc = GameFlowService::new(store.clone());
    (store, svc)
}

/// Drive one round end to end: trump + bids through a flow session, then
/// tricks through a second session. `tricks` are consumed in the flow's
/// trick-entry order.
fn play_round(svc: &GameFlowService, round_index: u8, bids: &[u8], tricks: &[u8]) {
    let mut flow = svc.open_entry(round_index).expect("open bid session");
    flow.select_suit(Suit::Spades).unwrap();
    if flow.phase() == EntryPhase::Rainbow {
        flow.confirm_rainbows().unwrap();
        flow.confirm_jobos().unwrap();
    }
    let mut signal = EntrySignal::Continue;
    for &b in bids {
        signal = flow.enter_bid(b).unwrap();
    }
    let commit = match signal {
        EntrySignal::CommitBids(c) => c,
        other => panic!("expected bids commit, got {other:?}"),
    };
    svc.apply_bids_commit(round_index, &commit).unwrap();

    let mut flow = svc.open_entry(round_index).expect("open tricks session");
    assert_eq!(flow.phase(), EntryPhase::Tricks { step: 0 });
    let mut signal = EntrySignal::Continue;
    for &t in tricks {
        signal = flow.enter_tricks(t).unwrap();
    }
    let commit = match signal {
        EntrySignal::CommitTricks(c) => c,
        other => panic!("expected tricks commit, got {other:?}"),
    };
    svc.apply_tricks_commit(round_index, &commit).unwrap();
}

/// A bid/trick pattern whose totals always match the hand size: one player
/// takes everything.
fn sweep_round(svc: &GameFlowService, round_index: u8) {
    let hand = ROUND_HAND_SIZES[round_index as usize];
    let mut bids = vec![0u8; SEATS];
    bids[0] = hand;
    let mut tricks = vec![0u8; SEATS];
    tricks[0] = hand;
    play_round(svc, round_index, &bids, &tricks);
}

#[tokio::test]
async fn round_zero_plays_through_and_advances() {
    let (_store, svc) = service();
    let ids = players();
    svc.create_game(ids.clone(), 0, ids[0]).await.unwrap();

    play_round(&svc, 0, &[2, 1, 3, 2, 1], &[3, 2, 2, 2, 1]);

    let game = svc.game().unwrap();
    assert!(game.rounds[0].is_complete);
    assert!(game.rounds[0].bids_entered);
    assert_eq!(game.current_round_index, 1);
    assert_eq!(game.status, GameStatus::InProgress);
    assert_eq!(game.rounds[0].tricks_total(), 10);

    // Seat 3 bid the table high of 3 and made it exactly.
    let top = game.rounds[0].player_round(ids[3]).unwrap();
    assert_eq!(top.bid, 3);
    assert_eq!(top.score, 9);
}

#[tokio::test]
async fn tricks_commit_with_bad_total_is_rejected() {
    let (_store, svc) = service();
    let ids = players();
    svc.create_game(ids.clone(), 0, ids[0]).await.unwrap();

    let forged = TricksCommit {
        tricks: ids.iter().map(|&p| (p, 1)).collect(), // sums to 5, hand is 10
    };
    let err = svc.apply_tricks_commit(0, &forged).unwrap_err();
    assert!(err.to_string().contains("TricksTotalMismatch"));
    assert!(!svc.game().unwrap().rounds[0].is_complete);
}

#[tokio::test]
async fn completed_rounds_ignore_late_mutations() {
    let (_store, svc) = service();
    let ids = players();
    svc.create_game(ids.clone(), 0, ids[0]).await.unwrap();
    sweep_round(&svc, 0);

    let before = svc.game().unwrap();
    svc.set_bid(0, ids[1], 5, 0).unwrap();
    svc.set_tricks(0, ids[1], 5).unwrap();
    svc.set_trump_suit(0, Suit::Hearts).unwrap();
    assert_eq!(svc.game().unwrap(), before);
}

#[tokio::test]
async fn finishing_the_last_round_completes_the_game() {
    let (_store, svc) = service();
    let ids = players();
    svc.create_game(ids.clone(), 2, ids[0]).await.unwrap();

    for ri in 0..TOTAL_ROUNDS as u8 {
        sweep_round(&svc, ri);
    }

    let game = svc.game().unwrap();
    assert_eq!(game.status, GameStatus::Completed);
    assert!(game.completed_at.is_some());
    assert_eq!(game.current_round_index, (TOTAL_ROUNDS - 1) as u8);

    // Each round the sweeper (left of the rotating dealer) earns 3 per
    // trick bid and nobody else scores, so the table total is fixed.
    let expected: i32 = ROUND_HAND_SIZES.iter().map(|&h| 3 * h as i32).sum();
    let last = game.rounds.last().unwrap();
    let table_total: i32 = last.player_rounds.iter().map(|pr| pr.cumulative_score).sum();
    assert_eq!(table_total, expected);

    // Completion is idempotent.
    let stamped = game.completed_at;
    svc.complete_round((TOTAL_ROUNDS - 1) as u8).unwrap();
    assert_eq!(svc.game().unwrap().completed_at, stamped);
}

#[tokio::test]
async fn flushed_state_reloads_identically() {
    let (store, svc) = service();
    let ids = players();
    let id = svc.create_game(ids.clone(), 1, ids[0]).await.unwrap();
    play_round(&svc, 0, &[2, 2, 2, 2, 3], &[2, 2, 2, 2, 2]);
    svc.flush_now().await.unwrap();

    let reloaded = GameFlowService::new(store);
    assert!(reloaded.load_game(id).await.unwrap());
    assert_eq!(reloaded.game().unwrap(), svc.game().unwrap());
}

#[tokio::test]
async fn deferred_save_waits_for_the_debounce_window() {
    let (store, svc) = service();
    let ids = players();
    let id = svc.create_game(ids.clone(), 0, ids[0]).await.unwrap();

    svc.set_trump_suit(0, Suit::Clubs).unwrap();
    assert!(svc.has_pending_saves());
    let raw = store.load_game(id).await.unwrap().unwrap();
    assert_eq!(raw.rounds[0].trump_suit, None);

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    assert!(!svc.has_pending_saves());
    let raw = store.load_game(id).await.unwrap().unwrap();
    assert_eq!(raw.rounds[0].trump_suit, Some(Suit::Clubs));
}

#[tokio::test]
async fn subscribers_observe_every_applied_mutation() {
    let (_store, svc) = service();
    let ids = players();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_cb = seen.clone();
    let sub = svc.subscribe(move |snap| {
        seen_cb.fetch_add(1, Ordering::SeqCst);
        assert_eq!(snap.rounds.len(), TOTAL_ROUNDS);
    });

    svc.create_game(ids.clone(), 0, ids[0]).await.unwrap();
    svc.set_trump_suit(0, Suit::Hearts).unwrap();
    let after_two = seen.load(Ordering::SeqCst);
    assert_eq!(after_two, 2);

    assert!(svc.unsubscribe(sub));
    svc.set_trump_suit(0, Suit::Spades).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), after_two);
}

#[tokio::test]
async fn standings_rank_by_latest_completed_round() {
    let (_store, svc) = service();
    let ids = players();
    svc.create_game(ids.clone(), 0, ids[0]).await.unwrap();
    // Seat 1 bids 4 and takes everything... everyone else misses.
    play_round(&svc, 0, &[4, 2, 2, 1, 1], &[10, 0, 0, 0, 0]);

    let snap = svc.snapshot().unwrap();
    assert_eq!(snap.game.standings[0].player_id, ids[1]);
    assert_eq!(snap.game.standings[0].total, 3 * 4 + 6);
}

#[tokio::test]
async fn roster_provider_supplies_display_names() {
    let store = Arc::new(MemoryStore::new());
    let ids = players();
    let names = ["Ada", "Ben", "Cal", "Dee", "Eli"];
    let roster = Arc::new(StaticRoster::new(
        ids.iter()
            .zip(names)
            .map(|(&id, name)| PlayerProfile {
                id,
                display_name: name.to_string(),
            })
            .collect(),
    ));
    let svc = GameFlowService::with_roster(store, roster);
    svc.create_game(ids.clone(), 0, ids[0]).await.unwrap();

    let profiles = svc.player_roster().await.unwrap();
    assert_eq!(profiles.len(), SEATS);
    assert_eq!(profiles[0].display_name, "Ada");
    assert_eq!(profiles[0].id, ids[0]);
}

#[tokio::test]
async fn legacy_records_load_through_normalization() {
    let (store, svc) = service();
    let ids = players();
    let id = Uuid::from_u128(0xCAFE);
    let id_strings: Vec<String> = ids.iter().map(|p| p.to_string()).collect();

    // Oldest record shape: `bid_type` instead of `board_level`, no `jobo`,
    // no `bids_entered`.
    store.insert_raw(
        id,
        serde_json::json!({
            "id": id.to_string(),
            "created_by": id_strings[0],
            "created_at": serde_json::to_value(time::macros::datetime!(2024-01-10 18:30 UTC)).unwrap(),
            "status": "in_progress",
            "player_ids": id_strings,
            "starting_dealer_index": 0,
            "current_round_index": 1,
            "rounds": [{
                "round_index": 0,
                "hand_size": 6,
                "trump_suit": "hearts",
                "dealer_player_id": ids[0].to_string(),
                "is_complete": true,
                "player_rounds": ids.iter().enumerate().map(|(i, p)| serde_json::json!({
                    "player_id": p.to_string(),
                    "bid": if i == 0 { 6 } else { 0 },
                    "bid_type": if i == 0 { serde_json::json!("board") } else { serde_json::Value::Null },
                    "tricks_taken": if i == 0 { 6 } else { 0 },
                    "rainbow": false,
                })).collect::<Vec<_>>(),
            }],
        }),
    );

    assert!(svc.load_game(id).await.unwrap());
    let game = svc.game().unwrap();
    let pr = game.rounds[0].player_round(ids[0]).unwrap();
    assert_eq!(pr.board_level, 1);
    assert_eq!(pr.score, 36);
    assert!(!pr.jobo);
    // bids_entered was derived from the round being complete.
    assert!(game.rounds[0].bids_entered);
}

#[tokio::test]
async fn abandoning_deletes_the_whole_aggregate() {
    let (store, svc) = service();
    let ids = players();
    let id = svc.create_game(ids.clone(), 0, ids[0]).await.unwrap();
    assert!(store.contains(id));

    svc.abandon_game().await.unwrap();
    assert!(!store.contains(id));
    assert!(svc.game().is_none());
    assert!(!svc.load_game(id).await.unwrap());
}
