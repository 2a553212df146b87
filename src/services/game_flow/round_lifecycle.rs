use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use super::GameFlowService;
use crate::domain::normalize::normalize;
use crate::domain::scoring::recalculate;
use crate::domain::state::{Game, GameStatus, PlayerId};
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

impl GameFlowService {
    /// Create a fully-formed game: every round pre-built from the schedule,
    /// persisted once, then held as the active state.
    pub async fn create_game(
        &self,
        player_ids: Vec<PlayerId>,
        starting_dealer_index: u8,
        created_by: PlayerId,
    ) -> Result<Uuid, DomainError> {
        let game = Game::new(
            Uuid::new_v4(),
            player_ids,
            starting_dealer_index,
            created_by,
            OffsetDateTime::now_utc(),
        )?;
        let id = game.id;
        self.store
            .create_game(&game)
            .await
            .map_err(|err| DomainError::infra(InfraErrorKind::SaveFailed, err.to_string()))?;
        info!(game_id = %id, "game created");
        *self.game.write() = Some(game);
        self.notify();
        Ok(id)
    }

    /// Load a stored game through the normalization adapter. Returns false
    /// when the store has no such game.
    pub async fn load_game(&self, id: Uuid) -> Result<bool, DomainError> {
        let raw = self
            .store
            .load_game(id)
            .await
            .map_err(|err| DomainError::infra(InfraErrorKind::LoadFailed, err.to_string()))?;
        let Some(raw) = raw else {
            return Ok(false);
        };
        let game = normalize(raw)?;
        info!(game_id = %id, "game loaded");
        *self.game.write() = Some(game);
        self.notify();
        Ok(true)
    }

    /// Lock the round and advance the game, or finish it on the last round.
    /// Re-invoking on an already-complete round is harmless.
    pub fn complete_round(&self, round_index: u8) -> Result<(), DomainError> {
        {
            let mut guard = self.game.write();
            let game = guard.as_mut().ok_or_else(Self::no_active_game)?;
            let last_round = game.is_last_round(round_index);
            let round = game.round_mut(round_index).ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Round,
                    format!("round {round_index} out of range"),
                )
            })?;
            if round.is_complete {
                return Ok(());
            }
            round.is_complete = true;
            recalculate(game);
            if last_round {
                game.status = GameStatus::Completed;
                game.completed_at = Some(OffsetDateTime::now_utc());
                info!(game_id = %game.id, "game completed");
            } else {
                game.current_round_index = round_index + 1;
                debug!(round = round_index, "round completed, advancing");
            }
        }
        self.save_queue.mark_round_dirty(round_index);
        self.save_queue.mark_status_dirty();
        self.notify();
        Ok(())
    }

    /// Delete the whole aggregate and clear the active state. The delete is
    /// awaited, not deferred: a failure leaves the game active.
    pub async fn abandon_game(&self) -> Result<(), DomainError> {
        let id = self.game.read().as_ref().map(|g| g.id);
        let Some(id) = id else {
            return Ok(());
        };
        self.store
            .delete_game(id)
            .await
            .map_err(|err| DomainError::infra(InfraErrorKind::SaveFailed, err.to_string()))?;
        *self.game.write() = None;
        info!(game_id = %id, "game abandoned");
        Ok(())
    }
}
