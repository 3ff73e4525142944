//! # Registered callbacks with their registration position.
//!
//! Each entry remembers the channel position at which it was added. The dispatch loop
//! only hands a value at position `p` to entries with `since <= p`, so a callback never
//! receives a value emitted before it was registered, even if that value had not been
//! dispatched yet.
//!
//! ## Rules
//! - Identity is the `Arc` allocation; a second `insert` of the same callback is ignored.
//! - Relays (see [`Registry::forward_to`](crate::Registry::forward_to)) are dispatched like
//!   any callback but are not counted by `len` and survive `clear`.
//! - The lock is never held while callbacks run (dispatch works on a snapshot).

use std::sync::Arc;

use parking_lot::RwLock;

use crate::callbacks::CallbackRef;

struct Entry<T> {
    callback: CallbackRef<T>,
    since: u64,
    relay: bool,
}

/// Ordered set of callbacks shared by a registry handle and its dispatch loop.
pub(crate) struct CallbackList<T> {
    entries: RwLock<Vec<Entry<T>>>,
}

/// Compares callbacks by allocation, ignoring vtables.
pub(crate) fn same_callback<T>(a: &CallbackRef<T>, b: &CallbackRef<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl<T> CallbackList<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Appends `callback`, eligible for values at positions `>= since`.
    ///
    /// Returns `false` if it is already registered.
    pub(crate) fn insert(&self, callback: CallbackRef<T>, since: u64) -> bool {
        self.push(callback, since, false)
    }

    /// Like [`insert`](Self::insert), for registry-owned wiring.
    pub(crate) fn insert_relay(&self, callback: CallbackRef<T>, since: u64) -> bool {
        self.push(callback, since, true)
    }

    fn push(&self, callback: CallbackRef<T>, since: u64, relay: bool) -> bool {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| same_callback(&e.callback, &callback)) {
            return false;
        }
        entries.push(Entry {
            callback,
            since,
            relay,
        });
        true
    }

    /// Removes `callback`; returns `false` if it was not registered.
    pub(crate) fn remove(&self, callback: &CallbackRef<T>) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !same_callback(&e.callback, callback));
        entries.len() != before
    }

    pub(crate) fn contains(&self, callback: &CallbackRef<T>) -> bool {
        self.entries
            .read()
            .iter()
            .any(|e| same_callback(&e.callback, callback))
    }

    /// Callbacks eligible for the value at `position`, in registration order.
    pub(crate) fn snapshot_at(&self, position: u64) -> Vec<CallbackRef<T>> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.since <= position)
            .map(|e| Arc::clone(&e.callback))
            .collect()
    }

    /// Number of user callbacks; relays are not counted.
    pub(crate) fn len(&self) -> usize {
        self.entries.read().iter().filter(|e| !e.relay).count()
    }

    /// Removes every user callback, keeping relays.
    pub(crate) fn clear(&self) {
        self.entries.write().retain(|e| e.relay);
    }
}
