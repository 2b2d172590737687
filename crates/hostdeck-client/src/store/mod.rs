//! Application state store
//!
//! [`Store`] holds the current [`StoreState`] snapshot. Handlers change it only by
//! committing a [`Mutation`]; every commit swaps in a new snapshot and then
//! notifies all listeners outside the state lock. Commits are serialized, so
//! listeners observe events in version order and, once commits settle, the
//! last event a listener saw carries the snapshot the store holds.

pub mod listener;
pub mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{ReentrantMutex, RwLock};
use tracing::trace;

use crate::action::ActionKind;

pub use self::listener::{FnStoreListener, StoreEvent, StoreListener};
pub use self::state::{Mutation, RequestFailure, StoreState};

/// Handle returned by [`Store::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Store {
    /// Held across swap and notification; reentrant so a listener may commit.
    commit_lock: ReentrantMutex<()>,
    state: RwLock<Arc<StoreState>>,
    version: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionId, Arc<dyn StoreListener>)>>,
    next_listener_id: AtomicU64,
    sequence: AtomicU64,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(StoreState::new())
    }

    /// Create a store starting from the given state.
    pub fn with_state(state: StoreState) -> Self {
        Self {
            commit_lock: ReentrantMutex::new(()),
            state: RwLock::new(Arc::new(state)),
            version: AtomicU64::new(0),
            listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            sequence: AtomicU64::new(0),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<StoreState> {
        self.state.read().clone()
    }

    /// Apply a mutation and notify listeners.
    pub fn commit(&self, action: ActionKind, mutation: Mutation) -> Arc<StoreState> {
        trace!("{}: {}", action, mutation.name());

        let _commit = self.commit_lock.lock();
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = {
            let mut guard = self.state.write();
            let next = Arc::new(guard.as_ref().clone().apply(mutation));
            *guard = next.clone();
            next
        };

        let event = StoreEvent {
            action,
            version,
            snapshot: snapshot.clone(),
        };
        let listeners: Vec<Arc<dyn StoreListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener.on_change(&event);
        }

        snapshot
    }

    pub fn subscribe(&self, listener: Arc<dyn StoreListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// Number of commits applied so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Next request sequence number; strictly increasing, starting at 1.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
