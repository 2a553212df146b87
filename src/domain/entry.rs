//! Per-round entry flow: trump, declarations, bids, tricks.
//!
//! The flow walks each seated player through a fixed sequence of sub-steps
//! and hands a single atomic commit back to the caller. Nothing here touches
//! the Game aggregate: the caller applies the commit payload through the
//! lifecycle controller and drops the flow.
//!
//! One flow instance covers one entry session. A round whose bids are not
//! yet committed runs trump -> declarations -> bids and ends with a bids
//! commit; re-opening the round afterwards starts directly at trick entry,
//! seeded with the committed bids. Bids committed through a session are
//! immutable within it; correcting one means closing and re-entering.

use crate::domain::rules::{
    bid_order, effective_bid, is_rainbow_hand, valid_bid_range, MAX_BOARD_LEVEL,
};
use crate::domain::state::{Game, PlayerId, Suit};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

/// Where the flow currently sits. Commit hand-off is signalled through
/// [`EntrySignal`], never stored as a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    Trump,
    /// Batch rainbow toggles, only visited on rainbow-size hands.
    Rainbow,
    /// Batch JoBo toggles, only visited on rainbow-size hands.
    Jobo,
    Bids { step: usize },
    Tricks { step: usize },
    /// Dead end reached when trick totals mismatch; `back` returns to the
    /// last tricks step for correction.
    TricksError,
}

/// Result of a flow action. A commit or close ends the session; the flow
/// should be dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum EntrySignal {
    Continue,
    CommitBids(BidsCommit),
    CommitTricks(TricksCommit),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidEntry {
    pub player_id: PlayerId,
    pub bid: u8,
    pub board_level: u8,
}

/// Everything collected by a bidding session, keyed by player id.
#[derive(Debug, Clone, PartialEq)]
pub struct BidsCommit {
    pub trump_suit: Suit,
    /// In bid order (left of dealer first).
    pub bids: Vec<BidEntry>,
    /// In seating order, every seat present.
    pub rainbows: Vec<(PlayerId, bool)>,
    pub jobos: Vec<(PlayerId, bool)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TricksCommit {
    /// In trick-entry order.
    pub tricks: Vec<(PlayerId, u8)>,
}

#[derive(Debug, Clone)]
pub struct EntryFlow {
    round_index: u8,
    hand_size: u8,
    rainbow_hand: bool,
    /// Player ids by seat position.
    player_ids: Vec<PlayerId>,
    /// Seat indexes in bidding rotation (left of dealer first).
    order: Vec<usize>,
    /// Seat indexes in trick-entry rotation; empty until bids are known.
    trick_order: Vec<usize>,
    phase: EntryPhase,
    suit: Option<Suit>,
    /// `(bid, board_level)` per bid-order position.
    bids: Vec<Option<(u8, u8)>>,
    /// Trick counts per trick-order position.
    tricks: Vec<Option<u8>>,
    /// Declaration toggles by seat position.
    rainbows: Vec<bool>,
    jobos: Vec<bool>,
}

impl EntryFlow {
    /// Open an entry flow for a round. Starts at trump selection, or
    /// directly at trick entry when bids are already committed.
    pub fn open(game: &Game, round_index: u8) -> Result<Self, DomainError> {
        let round = game.round(round_index).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Round, format!("round {round_index} out of range"))
        })?;
        if round.is_complete {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("round {round_index} is already complete"),
            ));
        }
        let dealer_seat = game.seat_of(round.dealer_player_id).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Player,
                format!("dealer {} is not seated", round.dealer_player_id),
            )
        })?;

        let seats = game.player_ids.len();
        let mut flow = Self {
            round_index,
            hand_size: round.hand_size,
            rainbow_hand: is_rainbow_hand(round.hand_size),
            player_ids: game.player_ids.clone(),
            order: bid_order(dealer_seat).to_vec(),
            trick_order: Vec::new(),
            phase: EntryPhase::Trump,
            suit: None,
            bids: vec![None; seats],
            tricks: vec![None; seats],
            rainbows: vec![false; seats],
            jobos: vec![false; seats],
        };

        if round.bids_entered {
            for (k, &seat) in flow.order.clone().iter().enumerate() {
                let pid = flow.player_ids[seat];
                let pr = round.player_round(pid).ok_or_else(|| {
                    DomainError::not_found(
                        NotFoundKind::Player,
                        format!("player {pid} missing from round {round_index}"),
                    )
                })?;
                flow.bids[k] = Some((pr.bid, pr.board_level));
            }
            flow.suit = round.trump_suit;
            flow.trick_order = flow.compute_trick_order();
            flow.phase = EntryPhase::Tricks { step: 0 };
        }

        Ok(flow)
    }

    pub fn round_index(&self) -> u8 {
        self.round_index
    }

    pub fn hand_size(&self) -> u8 {
        self.hand_size
    }

    pub fn phase(&self) -> EntryPhase {
        self.phase
    }

    pub fn trump_suit(&self) -> Option<Suit> {
        self.suit
    }

    /// Player expected to act on the current bid or trick step.
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            EntryPhase::Bids { step } => self.order.get(step).map(|&s| self.player_ids[s]),
            EntryPhase::Tricks { step } => self.trick_order.get(step).map(|&s| self.player_ids[s]),
            _ => None,
        }
    }

    /// Sum of effective bids entered so far (board counts as the hand).
    pub fn bid_total(&self) -> u8 {
        self.bids
            .iter()
            .flatten()
            .map(|&(bid, level)| effective_bid(bid, level, self.hand_size))
            .sum()
    }

    /// Sum of trick counts entered so far.
    pub fn tricks_total(&self) -> u8 {
        self.tricks.iter().flatten().copied().sum()
    }

    /// Board level the current bidder would declare at: one above the
    /// highest board already declared earlier in the rotation, capped.
    pub fn next_board_level(&self) -> u8 {
        match self.phase {
            EntryPhase::Bids { step } => (self.max_board_before(step) + 1).min(MAX_BOARD_LEVEL),
            _ => 0,
        }
    }

    pub fn rainbow(&self, player_id: PlayerId) -> bool {
        self.seat_of(player_id)
            .map(|s| self.rainbows[s])
            .unwrap_or(false)
    }

    pub fn jobo(&self, player_id: PlayerId) -> bool {
        self.seat_of(player_id)
            .map(|s| self.jobos[s])
            .unwrap_or(false)
    }

    /// Trick-entry rotation as player ids. Empty until bids are known.
    pub fn trick_order_players(&self) -> Vec<PlayerId> {
        self.trick_order.iter().map(|&s| self.player_ids[s]).collect()
    }

    /// Pick trump and move on to declarations (rainbow hands) or bids.
    pub fn select_suit(&mut self, suit: Suit) -> Result<EntrySignal, DomainError> {
        if self.phase != EntryPhase::Trump {
            return Err(self.phase_mismatch("trump selection"));
        }
        self.suit = Some(suit);
        self.phase = if self.rainbow_hand {
            EntryPhase::Rainbow
        } else {
            EntryPhase::Bids { step: 0 }
        };
        Ok(EntrySignal::Continue)
    }

    /// Toggle a player's rainbow declaration. Turning it on drops the same
    /// player's JoBo: the two are mutually exclusive at entry time.
    pub fn toggle_rainbow(&mut self, player_id: PlayerId) -> Result<(), DomainError> {
        if self.phase != EntryPhase::Rainbow {
            return Err(self.phase_mismatch("rainbow declarations"));
        }
        let seat = self.require_seat(player_id)?;
        self.rainbows[seat] = !self.rainbows[seat];
        if self.rainbows[seat] {
            self.jobos[seat] = false;
        }
        Ok(())
    }

    pub fn confirm_rainbows(&mut self) -> Result<EntrySignal, DomainError> {
        if self.phase != EntryPhase::Rainbow {
            return Err(self.phase_mismatch("rainbow declarations"));
        }
        self.phase = EntryPhase::Jobo;
        Ok(EntrySignal::Continue)
    }

    pub fn toggle_jobo(&mut self, player_id: PlayerId) -> Result<(), DomainError> {
        if self.phase != EntryPhase::Jobo {
            return Err(self.phase_mismatch("JoBo declarations"));
        }
        let seat = self.require_seat(player_id)?;
        self.jobos[seat] = !self.jobos[seat];
        if self.jobos[seat] {
            self.rainbows[seat] = false;
        }
        Ok(())
    }

    pub fn confirm_jobos(&mut self) -> Result<EntrySignal, DomainError> {
        if self.phase != EntryPhase::Jobo {
            return Err(self.phase_mismatch("JoBo declarations"));
        }
        self.phase = EntryPhase::Bids { step: 0 };
        Ok(EntrySignal::Continue)
    }

    /// Record a normal numeric bid for the current player and advance.
    /// Re-entering a step after `back` overwrites, which is also how a
    /// board is un-declared.
    pub fn enter_bid(&mut self, bid: u8) -> Result<EntrySignal, DomainError> {
        let step = match self.phase {
            EntryPhase::Bids { step } => step,
            _ => return Err(self.phase_mismatch("bid entry")),
        };
        if !valid_bid_range(self.hand_size).contains(&bid) {
            return Err(DomainError::validation(
                ValidationKind::InvalidBid,
                format!("bid {bid} exceeds hand size {}", self.hand_size),
            ));
        }
        self.bids[step] = Some((bid, 0));
        Ok(self.advance_bid_step(step))
    }

    /// Declare a board for the current player: an implicit bid of the whole
    /// hand, one tier above the highest board declared earlier in the
    /// rotation, capped at the maximum level.
    pub fn declare_board(&mut self) -> Result<EntrySignal, DomainError> {
        let step = match self.phase {
            EntryPhase::Bids { step } => step,
            _ => return Err(self.phase_mismatch("bid entry")),
        };
        let level = (self.max_board_before(step) + 1).min(MAX_BOARD_LEVEL);
        self.bids[step] = Some((self.hand_size, level));
        Ok(self.advance_bid_step(step))
    }

    /// Record the current player's trick count and advance. Past the last
    /// player the totals are checked: a mismatch with the hand size routes
    /// to the error state instead of committing.
    pub fn enter_tricks(&mut self, tricks: u8) -> Result<EntrySignal, DomainError> {
        let step = match self.phase {
            EntryPhase::Tricks { step } => step,
            _ => return Err(self.phase_mismatch("trick entry")),
        };
        if tricks > self.hand_size {
            return Err(DomainError::validation(
                ValidationKind::InvalidTricks,
                format!("tricks {tricks} exceeds hand size {}", self.hand_size),
            ));
        }
        self.tricks[step] = Some(tricks);
        if step + 1 >= self.trick_order.len() {
            if self.tricks_total() != self.hand_size {
                self.phase = EntryPhase::TricksError;
                return Ok(EntrySignal::Continue);
            }
            return Ok(EntrySignal::CommitTricks(self.build_tricks_commit()));
        }
        self.phase = EntryPhase::Tricks { step: step + 1 };
        Ok(EntrySignal::Continue)
    }

    /// Reverse one step. Every forward step has a reverse except trick
    /// entry's first step, which closes the whole session: once bids are
    /// committed there is no way back into bidding from within the flow.
    pub fn back(&mut self) -> EntrySignal {
        match self.phase {
            EntryPhase::Trump => EntrySignal::Closed,
            EntryPhase::Rainbow => {
                self.phase = EntryPhase::Trump;
                EntrySignal::Continue
            }
            EntryPhase::Jobo => {
                self.phase = EntryPhase::Rainbow;
                EntrySignal::Continue
            }
            EntryPhase::Bids { step: 0 } => {
                self.phase = if self.rainbow_hand {
                    EntryPhase::Jobo
                } else {
                    EntryPhase::Trump
                };
                EntrySignal::Continue
            }
            EntryPhase::Bids { step } => {
                self.phase = EntryPhase::Bids { step: step - 1 };
                EntrySignal::Continue
            }
            EntryPhase::Tricks { step: 0 } => EntrySignal::Closed,
            EntryPhase::Tricks { step } => {
                self.phase = EntryPhase::Tricks { step: step - 1 };
                EntrySignal::Continue
            }
            EntryPhase::TricksError => {
                self.phase = EntryPhase::Tricks {
                    step: self.trick_order.len().saturating_sub(1),
                };
                EntrySignal::Continue
            }
        }
    }

    fn advance_bid_step(&mut self, step: usize) -> EntrySignal {
        if step + 1 >= self.order.len() {
            EntrySignal::CommitBids(self.build_bids_commit())
        } else {
            self.phase = EntryPhase::Bids { step: step + 1 };
            EntrySignal::Continue
        }
    }

    fn build_bids_commit(&self) -> BidsCommit {
        let bids = self
            .order
            .iter()
            .enumerate()
            .map(|(k, &seat)| {
                let (bid, board_level) = self.bids[k].unwrap_or((0, 0));
                BidEntry {
                    player_id: self.player_ids[seat],
                    bid,
                    board_level,
                }
            })
            .collect();
        let rainbows = self
            .player_ids
            .iter()
            .zip(&self.rainbows)
            .map(|(&pid, &flag)| (pid, flag))
            .collect();
        let jobos = self
            .player_ids
            .iter()
            .zip(&self.jobos)
            .map(|(&pid, &flag)| (pid, flag))
            .collect();
        BidsCommit {
            // suit is always set by the time the last bid lands
            trump_suit: self.suit.unwrap_or(Suit::Hearts),
            bids,
            rainbows,
            jobos,
        }
    }

    fn build_tricks_commit(&self) -> TricksCommit {
        TricksCommit {
            tricks: self
                .trick_order
                .iter()
                .enumerate()
                .map(|(k, &seat)| (self.player_ids[seat], self.tricks[k].unwrap_or(0)))
                .collect(),
        }
    }

    /// Trick-entry rotation: highest effective bid reports first; ties go
    /// to whoever bids earlier in the dealer-relative rotation.
    fn compute_trick_order(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = (0..self.order.len()).collect();
        positions.sort_by(|&a, &b| {
            self.effective_bid_at(b)
                .cmp(&self.effective_bid_at(a))
                .then(a.cmp(&b))
        });
        positions.iter().map(|&k| self.order[k]).collect()
    }

    fn effective_bid_at(&self, bid_position: usize) -> u8 {
        let (bid, level) = self.bids[bid_position].unwrap_or((0, 0));
        effective_bid(bid, level, self.hand_size)
    }

    fn max_board_before(&self, step: usize) -> u8 {
        self.bids[..step]
            .iter()
            .flatten()
            .map(|&(_, level)| level)
            .max()
            .unwrap_or(0)
    }

    fn seat_of(&self, player_id: PlayerId) -> Option<usize> {
        self.player_ids.iter().position(|&pid| pid == player_id)
    }

    fn require_seat(&self, player_id: PlayerId) -> Result<usize, DomainError> {
        self.seat_of(player_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Player, format!("player {player_id}"))
        })
    }

    fn phase_mismatch(&self, expected: &str) -> DomainError {
        DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("flow is not at {expected} (phase: {:?})", self.phase),
        )
    }
}
