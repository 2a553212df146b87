//! Outbound write queue: optimistic local state, debounced remote flush.
//!
//! In-memory state is authoritative; persistence trails behind it. Each
//! mutation marks its round dirty and re-arms a single delayed flush, so
//! rapid successive mutations coalesce into one write of the final state.
//! A failed deferred flush keeps the dirty marks and logs; it never rolls
//! back local state.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::adapters::store::{GameStore, RoundDelta, StatusDelta, StoreError};
use crate::domain::rules::SAVE_DEBOUNCE;
use crate::domain::state::Game;

pub struct SaveQueue {
    store: Arc<dyn GameStore>,
    game: Arc<RwLock<Option<Game>>>,
    pending: Arc<Mutex<Pending>>,
}

#[derive(Default)]
struct Pending {
    dirty_rounds: BTreeSet<u8>,
    status_dirty: bool,
    timer: Option<CancellationToken>,
}

impl SaveQueue {
    pub fn new(store: Arc<dyn GameStore>, game: Arc<RwLock<Option<Game>>>) -> Self {
        Self {
            store,
            game,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Mark a round dirty and re-arm the debounce timer.
    pub fn mark_round_dirty(&self, round_index: u8) {
        let mut pending = self.pending.lock();
        pending.dirty_rounds.insert(round_index);
        self.arm(&mut pending);
    }

    /// Mark the game-status header dirty and re-arm the debounce timer.
    pub fn mark_status_dirty(&self) {
        let mut pending = self.pending.lock();
        pending.status_dirty = true;
        self.arm(&mut pending);
    }

    pub fn has_pending(&self) -> bool {
        let pending = self.pending.lock();
        !pending.dirty_rounds.is_empty() || pending.status_dirty
    }

    /// Flush immediately, surfacing the store error to the caller. Cancels
    /// any armed timer first.
    pub async fn flush_now(&self) -> Result<(), StoreError> {
        if let Some(timer) = self.pending.lock().timer.take() {
            timer.cancel();
        }
        flush(&self.store, &self.game, &self.pending).await
    }

    fn arm(&self, pending: &mut Pending) {
        if let Some(timer) = pending.timer.take() {
            timer.cancel();
        }
        // Outside a runtime the work stays pending for an explicit flush.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let token = CancellationToken::new();
        pending.timer = Some(token.clone());

        let store = Arc::clone(&self.store);
        let game = Arc::clone(&self.game);
        let queue = Arc::clone(&self.pending);
        handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(SAVE_DEBOUNCE) => {
                    if let Err(err) = flush(&store, &game, &queue).await {
                        warn!(%err, "deferred save failed; keeping local state");
                    }
                }
            }
        });
    }
}

async fn flush(
    store: &Arc<dyn GameStore>,
    game: &Arc<RwLock<Option<Game>>>,
    pending: &Arc<Mutex<Pending>>,
) -> Result<(), StoreError> {
    let (dirty_rounds, status_dirty) = {
        let mut p = pending.lock();
        p.timer = None;
        (
            std::mem::take(&mut p.dirty_rounds),
            std::mem::replace(&mut p.status_dirty, false),
        )
    };
    if dirty_rounds.is_empty() && !status_dirty {
        return Ok(());
    }

    // Each delta carries the full current round state, so flushing only the
    // latest state within the window is safe.
    let payload = {
        let guard = game.read();
        guard.as_ref().map(|g| {
            (
                g.id,
                dirty_rounds
                    .iter()
                    .filter_map(|&ri| g.round(ri).map(RoundDelta::from_round))
                    .collect::<Vec<_>>(),
                StatusDelta::from_game(g),
            )
        })
    };
    let Some((game_id, round_deltas, status_delta)) = payload else {
        return Ok(());
    };

    let result = write_all(
        store,
        game_id,
        &round_deltas,
        status_dirty.then_some(status_delta),
    )
    .await;
    if result.is_err() {
        // Re-mark so the next mutation's flush retries.
        let mut p = pending.lock();
        p.dirty_rounds.extend(dirty_rounds.iter().copied());
        p.status_dirty |= status_dirty;
    } else {
        debug!(%game_id, rounds = round_deltas.len(), "state flushed");
    }
    result
}

async fn write_all(
    store: &Arc<dyn GameStore>,
    game_id: uuid::Uuid,
    round_deltas: &[RoundDelta],
    status_delta: Option<StatusDelta>,
) -> Result<(), StoreError> {
    for delta in round_deltas {
        store.save_round_delta(game_id, delta.clone()).await?;
    }
    if let Some(delta) = status_delta {
        store.save_game_status(game_id, delta).await?;
    }
    Ok(())
}
