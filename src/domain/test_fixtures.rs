//! Shared fixtures for domain tests.

use time::macros::datetime;
use uuid::Uuid;

use crate::domain::rules::SEATS;
use crate::domain::state::{Game, PlayerId};

pub fn player(n: u128) -> PlayerId {
    Uuid::from_u128(n + 1)
}

pub fn players() -> Vec<PlayerId> {
    (0..SEATS as u128).map(player).collect()
}

pub fn make_game(starting_dealer_index: u8) -> Game {
    Game::new(
        Uuid::from_u128(0xBAC0),
        players(),
        starting_dealer_index,
        player(0),
        datetime!(2025-06-01 12:00 UTC),
    )
    .expect("fixture game must build")
}
