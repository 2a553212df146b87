//! Versioned load adapter: raw stored records to the canonical aggregate.
//!
//! Stored games have drifted over time: early records carried a string
//! `bid_type` instead of `board_level`, predate the `jobo` flag, and have no
//! `bids_entered` marker. All defaulting happens here, once, at load time.
//! Past this function every field is mandatory and optionality is gone.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::rules::SEATS;
use crate::domain::scoring::recalculate;
use crate::domain::state::{Game, GameStatus, PlayerRound, Round, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

/// Raw persisted shape of a game, as handed back by a store. Field
/// optionality mirrors the oldest record version still in the wild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGameRecord {
    pub id: Uuid,
    pub created_by: Uuid,
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub completed_at: Option<OffsetDateTime>,
    pub status: GameStatus,
    pub player_ids: Vec<Uuid>,
    pub starting_dealer_index: u8,
    pub current_round_index: u8,
    pub rounds: Vec<RawRound>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRound {
    pub round_index: u8,
    pub hand_size: u8,
    #[serde(default)]
    pub trump_suit: Option<Suit>,
    pub dealer_player_id: Uuid,
    /// Absent on records written before bid/trick entry were split.
    #[serde(default)]
    pub bids_entered: Option<bool>,
    #[serde(default)]
    pub is_complete: bool,
    pub player_rounds: Vec<RawPlayerRound>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlayerRound {
    pub player_id: Uuid,
    #[serde(default)]
    pub bid: u8,
    /// Absent on legacy records that carried `bid_type` instead.
    #[serde(default)]
    pub board_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_type: Option<String>,
    #[serde(default)]
    pub tricks_taken: u8,
    #[serde(default)]
    pub rainbow: bool,
    #[serde(default)]
    pub jobo: Option<bool>,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub cumulative_score: i32,
}

/// Canonical form of a raw record. Rounds are reordered by index, player
/// records aligned to the seating order (missing ones default to zeroed),
/// legacy fields mapped forward, and every derived score recomputed.
pub fn normalize(raw: RawGameRecord) -> Result<Game, DomainError> {
    if raw.player_ids.len() != SEATS {
        return Err(DomainError::validation(
            ValidationKind::SeatCount,
            format!("record seats {} != required {SEATS}", raw.player_ids.len()),
        ));
    }

    let mut raw_rounds = raw.rounds;
    raw_rounds.sort_by_key(|r| r.round_index);

    let rounds = raw_rounds
        .into_iter()
        .map(|r| {
            let bids_entered = r
                .bids_entered
                .unwrap_or(r.is_complete || r.trump_suit.is_some());
            let player_rounds = raw
                .player_ids
                .iter()
                .map(|&pid| {
                    match r.player_rounds.iter().find(|pr| pr.player_id == pid) {
                        Some(pr) => PlayerRound {
                            player_id: pid,
                            bid: pr.bid,
                            board_level: normalize_board_level(pr),
                            tricks_taken: pr.tricks_taken,
                            rainbow: pr.rainbow,
                            jobo: pr.jobo.unwrap_or(false),
                            // derived fields are rebuilt below
                            score: 0,
                            cumulative_score: 0,
                        },
                        None => PlayerRound::zeroed(pid),
                    }
                })
                .collect();
            Round {
                round_index: r.round_index,
                hand_size: r.hand_size,
                trump_suit: r.trump_suit,
                dealer_player_id: r.dealer_player_id,
                player_rounds,
                bids_entered,
                is_complete: r.is_complete,
            }
        })
        .collect();

    let mut game = Game {
        id: raw.id,
        created_by: raw.created_by,
        created_at: raw.created_at,
        completed_at: raw.completed_at,
        status: raw.status,
        player_ids: raw.player_ids,
        starting_dealer_index: raw.starting_dealer_index,
        rounds,
        current_round_index: raw.current_round_index,
    };
    recalculate(&mut game);
    Ok(game)
}

/// Full raw shape of a live game, for stores that persist whole records.
pub fn to_raw(game: &Game) -> RawGameRecord {
    RawGameRecord {
        id: game.id,
        created_by: game.created_by,
        created_at: game.created_at,
        completed_at: game.completed_at,
        status: game.status,
        player_ids: game.player_ids.clone(),
        starting_dealer_index: game.starting_dealer_index,
        current_round_index: game.current_round_index,
        rounds: game
            .rounds
            .iter()
            .map(|r| RawRound {
                round_index: r.round_index,
                hand_size: r.hand_size,
                trump_suit: r.trump_suit,
                dealer_player_id: r.dealer_player_id,
                bids_entered: Some(r.bids_entered),
                is_complete: r.is_complete,
                player_rounds: r
                    .player_rounds
                    .iter()
                    .map(|pr| RawPlayerRound {
                        player_id: pr.player_id,
                        bid: pr.bid,
                        board_level: Some(pr.board_level),
                        bid_type: None,
                        tricks_taken: pr.tricks_taken,
                        rainbow: pr.rainbow,
                        jobo: Some(pr.jobo),
                        score: pr.score,
                        cumulative_score: pr.cumulative_score,
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn normalize_board_level(pr: &RawPlayerRound) -> u8 {
    match pr.board_level {
        Some(level) => level,
        None => match pr.bid_type.as_deref() {
            Some("board") => 1,
            _ => 0,
        },
    }
}
