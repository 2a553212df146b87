//! Service layer: lifecycle orchestration and deferred persistence.

pub mod game_flow;
pub mod save_queue;

pub use game_flow::{GameFlowService, SubscriptionId};
pub use save_queue::SaveQueue;
