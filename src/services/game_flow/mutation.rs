use tracing::debug;

use super::GameFlowService;
use crate::domain::entry::{BidEntry, BidsCommit, TricksCommit};
use crate::domain::scoring::recalculate;
use crate::domain::state::{PlayerId, Round, Suit};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

impl GameFlowService {
    /// Run one mutation against a not-yet-complete round, then recalculate
    /// scores, mark the round dirty, and notify subscribers. Mutations
    /// against a completed round are absorbed silently.
    fn mutate_round(
        &self,
        round_index: u8,
        mutate: impl FnOnce(&mut Round) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        {
            let mut guard = self.game.write();
            let game = guard.as_mut().ok_or_else(Self::no_active_game)?;
            let round = game.round_mut(round_index).ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Round,
                    format!("round {round_index} out of range"),
                )
            })?;
            if round.is_complete {
                debug!(round = round_index, "mutation ignored: round complete");
                return Ok(());
            }
            mutate(round)?;
            recalculate(game);
        }
        self.save_queue.mark_round_dirty(round_index);
        self.notify();
        Ok(())
    }

    pub fn set_trump_suit(&self, round_index: u8, suit: Suit) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| {
            round.trump_suit = Some(suit);
            Ok(())
        })
    }

    /// Record one player's bid and board level. Declaring a board clears
    /// every other standing board in the round.
    pub fn set_bid(
        &self,
        round_index: u8,
        player_id: PlayerId,
        bid: u8,
        board_level: u8,
    ) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| round.apply_bid(player_id, bid, board_level))
    }

    pub fn set_tricks(
        &self,
        round_index: u8,
        player_id: PlayerId,
        tricks: u8,
    ) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| round.apply_tricks(player_id, tricks))
    }

    pub fn set_rainbow(
        &self,
        round_index: u8,
        player_id: PlayerId,
        rainbow: bool,
    ) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| round.apply_rainbow(player_id, rainbow))
    }

    pub fn set_jobo(
        &self,
        round_index: u8,
        player_id: PlayerId,
        jobo: bool,
    ) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| round.apply_jobo(player_id, jobo))
    }

    /// Commit trump and every player's bid in one step and mark the round
    /// as bid.
    pub fn set_bids_for_round(
        &self,
        round_index: u8,
        trump_suit: Suit,
        bids: &[BidEntry],
    ) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| {
            round.trump_suit = Some(trump_suit);
            for entry in bids {
                round.apply_bid(entry.player_id, entry.bid, entry.board_level)?;
            }
            round.bids_entered = true;
            Ok(())
        })
    }

    pub fn set_tricks_for_round(
        &self,
        round_index: u8,
        tricks: &[(PlayerId, u8)],
    ) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| {
            for &(player_id, taken) in tricks {
                round.apply_tricks(player_id, taken)?;
            }
            Ok(())
        })
    }

    pub fn set_rainbows_for_round(
        &self,
        round_index: u8,
        rainbows: &[(PlayerId, bool)],
    ) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| {
            for &(player_id, flag) in rainbows {
                round.apply_rainbow(player_id, flag)?;
            }
            Ok(())
        })
    }

    pub fn set_jobos_for_round(
        &self,
        round_index: u8,
        jobos: &[(PlayerId, bool)],
    ) -> Result<(), DomainError> {
        self.mutate_round(round_index, |round| {
            for &(player_id, flag) in jobos {
                round.apply_jobo(player_id, flag)?;
            }
            Ok(())
        })
    }

    /// Apply a bids commit from the entry flow: trump, bids, and both
    /// declaration maps.
    pub fn apply_bids_commit(
        &self,
        round_index: u8,
        commit: &BidsCommit,
    ) -> Result<(), DomainError> {
        self.set_bids_for_round(round_index, commit.trump_suit, &commit.bids)?;
        self.set_rainbows_for_round(round_index, &commit.rainbows)?;
        self.set_jobos_for_round(round_index, &commit.jobos)
    }

    /// Apply a tricks commit and lock the round. The trick-total gate is
    /// re-validated here so no caller can complete a round with a bad
    /// total, whatever path produced the payload.
    pub fn apply_tricks_commit(
        &self,
        round_index: u8,
        commit: &TricksCommit,
    ) -> Result<(), DomainError> {
        let hand_size = {
            let guard = self.game.read();
            let game = guard.as_ref().ok_or_else(Self::no_active_game)?;
            game.round(round_index)
                .ok_or_else(|| {
                    DomainError::not_found(
                        NotFoundKind::Round,
                        format!("round {round_index} out of range"),
                    )
                })?
                .hand_size
        };
        let total: u32 = commit.tricks.iter().map(|&(_, t)| t as u32).sum();
        if total != hand_size as u32 {
            return Err(DomainError::validation(
                ValidationKind::TricksTotalMismatch,
                format!("tricks total {total} != hand size {hand_size}"),
            ));
        }
        self.set_tricks_for_round(round_index, &commit.tricks)?;
        self.complete_round(round_index)
    }
}
