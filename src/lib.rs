#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod services;
pub mod telemetry;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use adapters::memory::{MemoryStore, StaticRoster};
pub use adapters::roster::{PlayerProfile, RosterProvider};
pub use adapters::store::{GameStore, RoundDelta, StatusDelta, StoreError};
pub use domain::entry::{BidEntry, BidsCommit, EntryFlow, EntryPhase, EntrySignal, TricksCommit};
pub use domain::normalize::{normalize, RawGameRecord};
pub use domain::scoring::{recalculate, round_score};
pub use domain::snapshot::{snapshot, GameSnapshot};
pub use domain::state::{Game, GameStatus, PlayerId, PlayerRound, Round, Suit};
pub use errors::domain::DomainError;
pub use services::game_flow::{GameFlowService, SubscriptionId};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::init();
}
