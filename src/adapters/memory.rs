//! In-process store and roster implementations.
//!
//! `MemoryStore` keeps raw JSON records, so loads run through the same
//! normalization path a real store would exercise.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::adapters::roster::{PlayerProfile, RosterProvider};
use crate::adapters::store::{GameStore, RoundDelta, StatusDelta, StoreError};
use crate::domain::normalize::{to_raw, RawGameRecord, RawPlayerRound, RawRound};
use crate::domain::state::Game;

#[derive(Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<Uuid, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw record directly, bypassing the typed API. Lets tests
    /// exercise legacy record shapes.
    pub fn insert_raw(&self, id: Uuid, record: serde_json::Value) {
        self.games.write().insert(id, record);
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.games.read().contains_key(&id)
    }

    fn read_record(&self, id: Uuid) -> Result<RawGameRecord, StoreError> {
        let games = self.games.read();
        let value = games.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(serde_json::from_value(value.clone())?)
    }

    fn write_record(&self, id: Uuid, record: &RawGameRecord) -> Result<(), StoreError> {
        let value = serde_json::to_value(record)?;
        self.games.write().insert(id, value);
        Ok(())
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn load_game(&self, id: Uuid) -> Result<Option<RawGameRecord>, StoreError> {
        let games = self.games.read();
        match games.get(&id) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn create_game(&self, game: &Game) -> Result<(), StoreError> {
        self.write_record(game.id, &to_raw(game))
    }

    async fn save_round_delta(&self, game_id: Uuid, delta: RoundDelta) -> Result<(), StoreError> {
        let mut record = self.read_record(game_id)?;
        let round = record
            .rounds
            .iter_mut()
            .find(|r| r.round_index == delta.round_index)
            .ok_or_else(|| {
                StoreError::Backend(format!(
                    "round {} missing from stored game {game_id}",
                    delta.round_index
                ))
            })?;
        apply_round_delta(round, &delta);
        self.write_record(game_id, &record)
    }

    async fn save_game_status(&self, game_id: Uuid, delta: StatusDelta) -> Result<(), StoreError> {
        let mut record = self.read_record(game_id)?;
        record.status = delta.status;
        record.current_round_index = delta.current_round_index;
        record.completed_at = delta.completed_at;
        self.write_record(game_id, &record)
    }

    async fn delete_game(&self, id: Uuid) -> Result<(), StoreError> {
        self.games.write().remove(&id);
        Ok(())
    }
}

fn apply_round_delta(round: &mut RawRound, delta: &RoundDelta) {
    round.trump_suit = delta.trump_suit;
    round.bids_entered = Some(delta.bids_entered);
    round.is_complete = delta.is_complete;
    round.player_rounds = delta
        .players
        .iter()
        .map(|p| RawPlayerRound {
            player_id: p.player_id,
            bid: p.bid,
            board_level: Some(p.board_level),
            bid_type: None,
            tricks_taken: p.tricks_taken,
            rainbow: p.rainbow,
            jobo: Some(p.jobo),
            score: p.score,
            cumulative_score: p.cumulative_score,
        })
        .collect();
}

/// Fixed roster for tests and local play.
pub struct StaticRoster {
    players: Vec<PlayerProfile>,
}

impl StaticRoster {
    pub fn new(players: Vec<PlayerProfile>) -> Self {
        Self { players }
    }
}

#[async_trait]
impl RosterProvider for StaticRoster {
    async fn roster(&self, _game_id: Uuid) -> Result<Vec<PlayerProfile>, StoreError> {
        Ok(self.players.clone())
    }
}
