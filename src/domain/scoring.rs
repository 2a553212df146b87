//! Round scoring and the whole-game recalculation pass.

use crate::domain::rules::{board_multiplier, RAINBOW_BONUS, RAINBOW_HAND_SIZE};
use crate::domain::state::Game;

/// Score one player's round.
///
/// - Board (level > 0): all-or-nothing. Taking every trick pays
///   `6 * level * hand_size`; anything less costs the same amount.
/// - Zero bid: a clean zero scores 0; a missed zero earns one point per
///   trick taken rather than a penalty.
/// - Normal bid: making it pays 3 per bid trick plus 1 per overtrick;
///   missing it costs a flat `3 * bid` however far short.
/// - A rainbow declaration on the rainbow hand size adds a flat bonus on
///   top of any outcome, win or lose.
///
/// Pure and total over its documented domain; out-of-range input is
/// rejected upstream at the entry boundary.
pub fn round_score(bid: u8, board_level: u8, tricks_taken: u8, hand_size: u8, rainbow: bool) -> i32 {
    let mut score = if board_level > 0 {
        let mult = board_multiplier(board_level);
        if tricks_taken == hand_size {
            mult * hand_size as i32
        } else {
            -mult * hand_size as i32
        }
    } else if bid == 0 {
        if tricks_taken == 0 {
            0
        } else {
            tricks_taken as i32
        }
    } else if tricks_taken >= bid {
        3 * bid as i32 + (tricks_taken - bid) as i32
    } else {
        -3 * bid as i32
    };

    if rainbow && hand_size == RAINBOW_HAND_SIZE {
        score += RAINBOW_BONUS;
    }

    score
}

/// Recompute every derived `score` and `cumulative_score` across the whole
/// game, in round order. Round 0 starts each player's running total; later
/// rounds chain on the prior round's cumulative (a player record missing
/// there counts as 0). A full pass on every mutation keeps the
/// aggregate consistent; both dimensions are small fixed constants.
pub fn recalculate(game: &mut Game) {
    for ri in 0..game.rounds.len() {
        let carry: Vec<(crate::domain::state::PlayerId, i32)> = if ri == 0 {
            Vec::new()
        } else {
            game.rounds[ri - 1]
                .player_rounds
                .iter()
                .map(|pr| (pr.player_id, pr.cumulative_score))
                .collect()
        };
        let hand_size = game.rounds[ri].hand_size;
        for pr in game.rounds[ri].player_rounds.iter_mut() {
            pr.score = round_score(pr.bid, pr.board_level, pr.tricks_taken, hand_size, pr.rainbow);
            let prev = carry
                .iter()
                .find(|(pid, _)| *pid == pr.player_id)
                .map(|&(_, c)| c)
                .unwrap_or(0);
            pr.cumulative_score = prev + pr.score;
        }
    }
}
