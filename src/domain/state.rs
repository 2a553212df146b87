//! Core aggregate types: Game, Round, PlayerRound.
//!
//! A Game is created fully-formed: every round is pre-built from the
//! hand-size schedule with zeroed player records, then filled in strictly
//! in order by the entry flow. Completed rounds are frozen: every mutator
//! on them is a silent no-op so late or duplicate calls are absorbed.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::rules::{dealer_seat_for_round, MAX_BOARD_LEVEL, ROUND_HAND_SIZES, SEATS};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

pub type PlayerId = Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn as_str(&self) -> &'static str {
        match self {
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
            Suit::Spades => "spades",
        }
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hearts" => Ok(Suit::Hearts),
            "diamonds" => Ok(Suit::Diamonds),
            "clubs" => Ok(Suit::Clubs),
            "spades" => Ok(Suit::Spades),
            other => Err(DomainError::validation(
                ValidationKind::InvalidSuit,
                format!("unknown suit: {other}"),
            )),
        }
    }
}

/// Monotonic lifecycle status; a game never moves backwards.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Setup,
    InProgress,
    Completed,
}

/// One player's record for one round. `score` and `cumulative_score` are
/// derived fields; the recalculation pass rewrites them after any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRound {
    pub player_id: PlayerId,
    /// Meaningful only when `board_level == 0`.
    pub bid: u8,
    /// 0 = normal bid, 1..=5 = board tiers.
    pub board_level: u8,
    pub tricks_taken: u8,
    /// Only meaningful on hands of the rainbow size.
    pub rainbow: bool,
    pub jobo: bool,
    pub score: i32,
    pub cumulative_score: i32,
}

impl PlayerRound {
    pub fn zeroed(player_id: PlayerId) -> Self {
        Self {
            player_id,
            bid: 0,
            board_level: 0,
            tricks_taken: 0,
            rainbow: false,
            jobo: false,
            score: 0,
            cumulative_score: 0,
        }
    }
}

/// One hand of play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub round_index: u8,
    pub hand_size: u8,
    pub trump_suit: Option<Suit>,
    pub dealer_player_id: PlayerId,
    /// One entry per seated player, unique by player id, in seating order.
    pub player_rounds: Vec<PlayerRound>,
    /// Whether trump and all bids have been committed.
    pub bids_entered: bool,
    /// Whether tricks have been committed and the round is locked.
    pub is_complete: bool,
}

impl Round {
    pub fn player_round(&self, player_id: PlayerId) -> Option<&PlayerRound> {
        self.player_rounds.iter().find(|pr| pr.player_id == player_id)
    }

    pub fn player_round_mut(&mut self, player_id: PlayerId) -> Option<&mut PlayerRound> {
        self.player_rounds
            .iter_mut()
            .find(|pr| pr.player_id == player_id)
    }

    pub fn tricks_total(&self) -> u8 {
        self.player_rounds.iter().map(|pr| pr.tricks_taken).sum()
    }

    /// Set a player's board level. Raising any board above 0 clears every
    /// other standing board in the round; lowering back to 0 touches nobody
    /// else. Enforced here, at the point of mutation, because callers may
    /// toggle repeatedly before a commit.
    pub fn set_board(&mut self, player_id: PlayerId, level: u8) -> Result<(), DomainError> {
        if self.is_complete {
            return Ok(());
        }
        if level > MAX_BOARD_LEVEL {
            return Err(DomainError::validation(
                ValidationKind::InvalidBid,
                format!("board level {level} exceeds maximum {MAX_BOARD_LEVEL}"),
            ));
        }
        {
            let pr = self.player_round_mut(player_id).ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Player, format!("player {player_id}"))
            })?;
            pr.board_level = level;
        }
        if level > 0 {
            for other in &mut self.player_rounds {
                if other.player_id != player_id {
                    other.board_level = 0;
                }
            }
        }
        Ok(())
    }

    /// Record a player's bid and board level in one step.
    pub fn apply_bid(
        &mut self,
        player_id: PlayerId,
        bid: u8,
        board_level: u8,
    ) -> Result<(), DomainError> {
        if self.is_complete {
            return Ok(());
        }
        if bid > self.hand_size {
            return Err(DomainError::validation(
                ValidationKind::InvalidBid,
                format!("bid {bid} exceeds hand size {}", self.hand_size),
            ));
        }
        {
            let pr = self.player_round_mut(player_id).ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Player, format!("player {player_id}"))
            })?;
            pr.bid = bid;
        }
        self.set_board(player_id, board_level)
    }

    pub fn apply_tricks(&mut self, player_id: PlayerId, tricks: u8) -> Result<(), DomainError> {
        if self.is_complete {
            return Ok(());
        }
        if tricks > self.hand_size {
            return Err(DomainError::validation(
                ValidationKind::InvalidTricks,
                format!("tricks {tricks} exceeds hand size {}", self.hand_size),
            ));
        }
        let pr = self.player_round_mut(player_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Player, format!("player {player_id}"))
        })?;
        pr.tricks_taken = tricks;
        Ok(())
    }

    pub fn apply_rainbow(&mut self, player_id: PlayerId, rainbow: bool) -> Result<(), DomainError> {
        if self.is_complete {
            return Ok(());
        }
        let pr = self.player_round_mut(player_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Player, format!("player {player_id}"))
        })?;
        pr.rainbow = rainbow;
        Ok(())
    }

    pub fn apply_jobo(&mut self, player_id: PlayerId, jobo: bool) -> Result<(), DomainError> {
        if self.is_complete {
            return Ok(());
        }
        let pr = self.player_round_mut(player_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Player, format!("player {player_id}"))
        })?;
        pr.jobo = jobo;
        Ok(())
    }
}

/// One complete match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub created_by: PlayerId,
    pub created_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
    pub status: GameStatus,
    /// Fixed ordered seating, immutable after creation.
    pub player_ids: Vec<PlayerId>,
    pub starting_dealer_index: u8,
    /// Full fixed-length round sequence, pre-created at game creation.
    pub rounds: Vec<Round>,
    pub current_round_index: u8,
}

impl Game {
    /// Build a fully-formed game: every round pre-created from the schedule
    /// with zeroed player records and a rotated dealer.
    pub fn new(
        id: Uuid,
        player_ids: Vec<PlayerId>,
        starting_dealer_index: u8,
        created_by: PlayerId,
        created_at: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        if player_ids.len() != SEATS {
            return Err(DomainError::validation(
                ValidationKind::SeatCount,
                format!("expected {SEATS} players, got {}", player_ids.len()),
            ));
        }
        let unique: HashSet<&PlayerId> = player_ids.iter().collect();
        if unique.len() != player_ids.len() {
            return Err(DomainError::validation(
                ValidationKind::SeatCount,
                "duplicate player in seating",
            ));
        }
        if (starting_dealer_index as usize) >= SEATS {
            return Err(DomainError::validation(
                ValidationKind::SeatCount,
                format!("starting dealer index {starting_dealer_index} out of range"),
            ));
        }

        let rounds = ROUND_HAND_SIZES
            .iter()
            .enumerate()
            .map(|(ri, &hand_size)| {
                let dealer_seat = dealer_seat_for_round(starting_dealer_index as usize, ri);
                Round {
                    round_index: ri as u8,
                    hand_size,
                    trump_suit: None,
                    dealer_player_id: player_ids[dealer_seat],
                    player_rounds: player_ids.iter().map(|&pid| PlayerRound::zeroed(pid)).collect(),
                    bids_entered: false,
                    is_complete: false,
                }
            })
            .collect();

        Ok(Self {
            id,
            created_by,
            created_at,
            completed_at: None,
            status: GameStatus::InProgress,
            player_ids,
            starting_dealer_index,
            rounds,
            current_round_index: 0,
        })
    }

    pub fn round(&self, round_index: u8) -> Option<&Round> {
        self.rounds.get(round_index as usize)
    }

    pub fn round_mut(&mut self, round_index: u8) -> Option<&mut Round> {
        self.rounds.get_mut(round_index as usize)
    }

    /// Seat position of a player in the fixed seating order.
    pub fn seat_of(&self, player_id: PlayerId) -> Option<usize> {
        self.player_ids.iter().position(|&pid| pid == player_id)
    }

    pub fn is_last_round(&self, round_index: u8) -> bool {
        round_index as usize + 1 == self.rounds.len()
    }
}
