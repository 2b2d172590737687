//! Store listener trait and change event

use std::sync::Arc;

use crate::action::ActionKind;

use super::state::StoreState;

/// Delivered to listeners after every committed mutation.
#[derive(Clone, Debug)]
pub struct StoreEvent {
    /// Action whose handler committed the change
    pub action: ActionKind,
    /// Commit counter of the store; strictly increasing across events
    pub version: u64,
    /// State after the change
    pub snapshot: Arc<StoreState>,
}

/// Trait for observing store changes, e.g. to re-render a view.
pub trait StoreListener: Send + Sync + 'static {
    fn on_change(&self, event: &StoreEvent);
}

/// A simple listener that invokes a closure.
pub struct FnStoreListener<F>
where
    F: Fn(&StoreEvent) + Send + Sync + 'static,
{
    f: F,
}

impl<F> FnStoreListener<F>
where
    F: Fn(&StoreEvent) + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> StoreListener for FnStoreListener<F>
where
    F: Fn(&StoreEvent) + Send + Sync + 'static,
{
    fn on_change(&self, event: &StoreEvent) {
        (self.f)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_fn_store_listener() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let listener = FnStoreListener::new(move |event: &StoreEvent| {
            assert_eq!(event.action, ActionKind::ClearError);
            called_clone.store(true, Ordering::SeqCst);
        });

        listener.on_change(&StoreEvent {
            action: ActionKind::ClearError,
            version: 1,
            snapshot: Arc::new(StoreState::new()),
        });

        assert!(called.load(Ordering::SeqCst));
    }
}
