// Explicit observer lists for change notification

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by `observe`, used to unsubscribe.
///
/// Ids are unique across every list in the process, so removing an id from
/// the wrong list is a harmless no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Callback<A> = Box<dyn FnMut(&A)>;

/// Ordered list of callbacks notified synchronously with `&A`
pub struct ObserverList<A> {
    observers: Vec<(ObserverId, Callback<A>)>,
}

impl<A> ObserverList<A> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Register a callback. Callbacks run in registration order.
    pub fn observe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&A) + 'static,
    {
        let id = ObserverId::next();
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered (including
    /// when it was already removed).
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer, _)| *observer != id);
        self.observers.len() != before
    }

    /// Invoke every callback with `args`
    pub fn notify(&mut self, args: &A) {
        for (_, callback) in &mut self.observers {
            callback(args);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }
}

impl<A> Default for ObserverList<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for ObserverList<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}
