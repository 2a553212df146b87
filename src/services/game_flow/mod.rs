//! Game flow orchestration: the single mutation surface over the aggregate.
//!
//! The service owns the active game as an explicit state container. Every
//! mutator applies synchronously in memory, recomputes derived scores,
//! defers persistence to the save queue, and emits a fresh snapshot to
//! subscribers. One game is active per service at a time; the embedder is
//! expected to run one entry flow against it at a time.

mod mutation;
mod round_lifecycle;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::adapters::roster::{PlayerProfile, RosterProvider};
use crate::adapters::store::GameStore;
use crate::domain::entry::EntryFlow;
use crate::domain::snapshot::{snapshot, GameSnapshot};
use crate::domain::state::Game;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};
use crate::services::save_queue::SaveQueue;

pub type SubscriptionId = u64;

type SnapshotCallback = Box<dyn Fn(Arc<GameSnapshot>) + Send + Sync>;

pub struct GameFlowService {
    store: Arc<dyn GameStore>,
    roster: Option<Arc<dyn RosterProvider>>,
    game: Arc<RwLock<Option<Game>>>,
    save_queue: SaveQueue,
    subscribers: Mutex<HashMap<SubscriptionId, SnapshotCallback>>,
    next_subscription: AtomicU64,
}

impl GameFlowService {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        let game = Arc::new(RwLock::new(None));
        let save_queue = SaveQueue::new(Arc::clone(&store), Arc::clone(&game));
        Self {
            store,
            roster: None,
            game,
            save_queue,
            subscribers: Mutex::new(HashMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn with_roster(store: Arc<dyn GameStore>, roster: Arc<dyn RosterProvider>) -> Self {
        let mut svc = Self::new(store);
        svc.roster = Some(roster);
        svc
    }

    /// Seated players of the active game with their display names. Without
    /// a roster provider the profiles carry the ids alone.
    pub async fn player_roster(&self) -> Result<Vec<PlayerProfile>, DomainError> {
        let (game_id, player_ids) = {
            let guard = self.game.read();
            let game = guard.as_ref().ok_or_else(Self::no_active_game)?;
            (game.id, game.player_ids.clone())
        };
        let Some(provider) = &self.roster else {
            return Ok(player_ids
                .into_iter()
                .map(|id| PlayerProfile {
                    id,
                    display_name: id.to_string(),
                })
                .collect());
        };
        let profiles = provider
            .roster(game_id)
            .await
            .map_err(|err| DomainError::infra(InfraErrorKind::LoadFailed, err.to_string()))?;
        Ok(profiles)
    }

    /// Register a callback invoked with a fresh snapshot after every
    /// applied mutation. Callbacks must not call back into the
    /// subscription API.
    pub fn subscribe(
        &self,
        callback: impl Fn(Arc<GameSnapshot>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().insert(id, Box::new(callback));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.lock().remove(&id).is_some()
    }

    /// Snapshot of the active game, if any.
    pub fn snapshot(&self) -> Option<GameSnapshot> {
        self.game.read().as_ref().map(snapshot)
    }

    /// Clone of the active game for inspection.
    pub fn game(&self) -> Option<Game> {
        self.game.read().clone()
    }

    /// Open an entry flow against the active game.
    pub fn open_entry(&self, round_index: u8) -> Result<EntryFlow, DomainError> {
        let guard = self.game.read();
        let game = guard.as_ref().ok_or_else(Self::no_active_game)?;
        EntryFlow::open(game, round_index)
    }

    /// Await an immediate flush of all pending writes, surfacing store
    /// failures to the caller. Local state is never rolled back.
    pub async fn flush_now(&self) -> Result<(), DomainError> {
        self.save_queue
            .flush_now()
            .await
            .map_err(|err| DomainError::infra(InfraErrorKind::SaveFailed, err.to_string()))
    }

    pub fn has_pending_saves(&self) -> bool {
        self.save_queue.has_pending()
    }

    fn notify(&self) {
        let snap = match self.snapshot() {
            Some(s) => Arc::new(s),
            None => return,
        };
        let subscribers = self.subscribers.lock();
        for callback in subscribers.values() {
            callback(Arc::clone(&snap));
        }
    }

    fn no_active_game() -> DomainError {
        DomainError::not_found(NotFoundKind::Game, "no active game")
    }
}
