//! Persistence boundary. The core owns the aggregate and hands stores
//! serializable deltas; storage format is the store's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::normalize::RawGameRecord;
use crate::domain::state::{Game, GameStatus, Round, Suit};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game {0} not found")]
    NotFound(Uuid),
    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store backend: {0}")]
    Backend(String),
}

/// Full current state of one round, written on every flush. Writes are
/// last-state-wins, never diffs: a skipped intermediate state is harmless
/// because each flush carries an already-consistent whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundDelta {
    pub round_index: u8,
    pub trump_suit: Option<Suit>,
    pub bids_entered: bool,
    pub is_complete: bool,
    pub players: Vec<PlayerRoundDelta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRoundDelta {
    pub player_id: Uuid,
    pub bid: u8,
    pub board_level: u8,
    pub tricks_taken: u8,
    pub rainbow: bool,
    pub jobo: bool,
    pub score: i32,
    pub cumulative_score: i32,
}

impl RoundDelta {
    pub fn from_round(round: &Round) -> Self {
        Self {
            round_index: round.round_index,
            trump_suit: round.trump_suit,
            bids_entered: round.bids_entered,
            is_complete: round.is_complete,
            players: round
                .player_rounds
                .iter()
                .map(|pr| PlayerRoundDelta {
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
}

/// Game-level header fields written alongside round deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDelta {
    pub status: GameStatus,
    pub current_round_index: u8,
    #[serde(default)]
    pub completed_at: Option<OffsetDateTime>,
}

impl StatusDelta {
    pub fn from_game(game: &Game) -> Self {
        Self {
            status: game.status,
            current_round_index: game.current_round_index,
            completed_at: game.completed_at,
        }
    }
}

/// Narrow save interface the lifecycle controller talks to.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn load_game(&self, id: Uuid) -> Result<Option<RawGameRecord>, StoreError>;
    async fn create_game(&self, game: &Game) -> Result<(), StoreError>;
    async fn save_round_delta(&self, game_id: Uuid, delta: RoundDelta) -> Result<(), StoreError>;
    async fn save_game_status(&self, game_id: Uuid, delta: StatusDelta) -> Result<(), StoreError>;
    /// Deletion removes the whole aggregate; games are never partially
    /// deleted.
    async fn delete_game(&self, id: Uuid) -> Result<(), StoreError>;
}
