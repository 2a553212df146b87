//! Public snapshot API for observing game state without exposing internals.
//!
//! Emitted to subscribers after every applied mutation; UI layers render
//! from this instead of reaching into the aggregate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::state::{Game, GameStatus, PlayerId, Suit};

/// Game-level header present in all snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHeader {
    pub id: Uuid,
    pub status: GameStatus,
    pub current_round_index: u8,
    pub player_ids: Vec<PlayerId>,
    /// Running totals through the latest completed round, best first.
    pub standings: Vec<StandingEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub player_id: PlayerId,
    pub total: i32,
}

/// Top-level snapshot combining header and the full round grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game: GameHeader,
    pub rounds: Vec<RoundView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub round_index: u8,
    pub hand_size: u8,
    pub trump_suit: Option<Suit>,
    pub dealer_player_id: PlayerId,
    pub bids_entered: bool,
    pub is_complete: bool,
    pub players: Vec<PlayerRoundView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRoundView {
    pub player_id: PlayerId,
    pub bid: u8,
    pub board_level: u8,
    pub tricks_taken: u8,
    pub rainbow: bool,
    pub jobo: bool,
    pub score: i32,
    pub cumulative_score: i32,
}

/// Produce an immutable snapshot of the current game state. Never panics.
pub fn snapshot(game: &Game) -> GameSnapshot {
    GameSnapshot {
        game: GameHeader {
            id: game.id,
            status: game.status,
            current_round_index: game.current_round_index,
            player_ids: game.player_ids.clone(),
            standings: compute_standings(game),
        },
        rounds: game.rounds.iter().map(build_round_view).collect(),
    }
}

fn build_round_view(round: &crate::domain::state::Round) -> RoundView {
    RoundView {
        round_index: round.round_index,
        hand_size: round.hand_size,
        trump_suit: round.trump_suit,
        dealer_player_id: round.dealer_player_id,
        bids_entered: round.bids_entered,
        is_complete: round.is_complete,
        players: round
            .player_rounds
            .iter()
            .map(|pr| PlayerRoundView {
                player_id: pr.player_id,
                bid: pr.bid,
                board_level: pr.board_level,
                tricks_taken: pr.tricks_taken,
                rainbow: pr.rainbow,
                jobo: pr.jobo,
                score: pr.score,
                cumulative_score: pr.cumulative_score,
            })
            .collect(),
    }
}

/// Totals come from the latest completed round; before any round completes
/// everyone stands at zero. Ties keep seating order.
fn compute_standings(game: &Game) -> Vec<StandingEntry> {
    let last_complete = game.rounds.iter().rev().find(|r| r.is_complete);
    let mut standings: Vec<StandingEntry> = game
        .player_ids
        .iter()
        .map(|&pid| StandingEntry {
            player_id: pid,
            total: last_complete
                .and_then(|r| r.player_round(pid))
                .map(|pr| pr.cumulative_score)
                .unwrap_or(0),
        })
        .collect();
    standings.sort_by(|a, b| b.total.cmp(&a.total));
    standings
}
