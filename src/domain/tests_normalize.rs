use serde_json::json;
use uuid::Uuid;

use crate::domain::normalize::{normalize, to_raw, RawGameRecord};
use crate::domain::state::{GameStatus, Suit};
use crate::domain::test_fixtures::{make_game, player};

fn player_json(n: u128) -> String {
    player(n).to_string()
}

/// A record in the oldest shape still in the wild: `bid_type` instead of
/// `board_level`, no `jobo`, no `bids_entered`.
fn legacy_record() -> serde_json::Value {
    let players: Vec<String> = (0..5).map(player_json).collect();
    let rounds: Vec<serde_json::Value> = (0..20)
        .map(|ri| {
            let hand_size = crate::domain::rules::ROUND_HAND_SIZES[ri];
            json!({
                "round_index": ri,
                "hand_size": hand_size,
                "trump_suit": if ri == 0 { json!("spades") } else { serde_json::Value::Null },
                "dealer_player_id": players[ri % 5],
                "is_complete": ri == 0,
                "player_rounds": players.iter().enumerate().map(|(i, p)| json!({
                    "player_id": p,
                    "bid": if ri == 0 { 2 } else { 0 },
                    "bid_type": if ri == 0 && i == 0 { json!("board") } else { serde_json::Value::Null },
                    "tricks_taken": if ri == 0 && i == 0 { hand_size } else { 0 },
                    "rainbow": false,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "id": Uuid::from_u128(0xFEED).to_string(),
        "created_by": players[0],
        "created_at": serde_json::to_value(time::macros::datetime!(2024-03-01 09:00 UTC)).unwrap(),
        "status": "in_progress",
        "player_ids": players,
        "starting_dealer_index": 0,
        "current_round_index": 1,
        "rounds": rounds,
    })
}

#[test]
fn legacy_bid_type_maps_to_board_level_one() {
    let raw: RawGameRecord = serde_json::from_value(legacy_record()).unwrap();
    let game = normalize(raw).unwrap();

    let pr = game.rounds[0].player_round(player(0)).unwrap();
    assert_eq!(pr.board_level, 1);
    // Board made on a 10-card hand, rescored at load time.
    assert_eq!(pr.score, 60);
    // Everyone predates jobo; it defaults off.
    assert!(game.rounds.iter().all(|r| r
        .player_rounds
        .iter()
        .all(|pr| !pr.jobo)));
}

#[test]
fn missing_bids_entered_is_derived_from_progress() {
    let raw: RawGameRecord = serde_json::from_value(legacy_record()).unwrap();
    let game = normalize(raw).unwrap();

    // Complete round: bids were necessarily entered.
    assert!(game.rounds[0].bids_entered);
    // Untouched rounds stay unbid.
    assert!(!game.rounds[1].bids_entered);
}

#[test]
fn normalize_realigns_player_records_to_seating() {
    let mut value = legacy_record();
    // Drop one player's record from round 1; it must come back zeroed.
    let removed = value["rounds"][1]["player_rounds"]
        .as_array_mut()
        .unwrap()
        .remove(2);
    assert_eq!(removed["player_id"], player_json(2));

    let raw: RawGameRecord = serde_json::from_value(value).unwrap();
    let game = normalize(raw).unwrap();
    let pr = game.rounds[1].player_round(player(2)).unwrap();
    assert_eq!((pr.bid, pr.board_level, pr.tricks_taken), (0, 0, 0));
}

#[test]
fn normalize_rejects_wrong_seat_count() {
    let mut value = legacy_record();
    value["player_ids"].as_array_mut().unwrap().pop();
    let raw: RawGameRecord = serde_json::from_value(value).unwrap();
    assert!(normalize(raw).is_err());
}

#[test]
fn live_games_round_trip_through_raw_records() {
    let mut game = make_game(3);
    game.rounds[0].trump_suit = Some(Suit::Diamonds);
    game.rounds[0].apply_bid(player(1), 4, 0).unwrap();
    game.rounds[0].apply_tricks(player(1), 4).unwrap();
    game.rounds[0].bids_entered = true;
    crate::domain::scoring::recalculate(&mut game);

    let raw = to_raw(&game);
    let restored = normalize(raw).unwrap();
    assert_eq!(restored, game);
    assert_eq!(restored.status, GameStatus::InProgress);
}
