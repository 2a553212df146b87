//! Roster boundary: who is seated in a game, and what to call them.
//!
//! The core treats player ids as opaque stable identifiers; display names
//! live with whatever profile system the embedder runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapters::store::StoreError;
use crate::domain::state::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub display_name: String,
}

#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// Seated players for a game, ordered by seat position.
    async fn roster(&self, game_id: Uuid) -> Result<Vec<PlayerProfile>, StoreError>;
}
