//! External collaborators the core depends on, specified as traits.

pub mod memory;
pub mod roster;
pub mod store;

pub use memory::{MemoryStore, StaticRoster};
pub use roster::{PlayerProfile, RosterProvider};
pub use store::{GameStore, PlayerRoundDelta, RoundDelta, StatusDelta, StoreError};
