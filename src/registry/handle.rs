//! # Registry: callback registration over a broadcast channel.
//!
//! [`Registry`] attaches one cursor to its channel at construction and spawns the
//! dispatch loop on it. `on`/`off` edit the callback list the loop snapshots per value.
//!
//! ## Architecture
//! ```text
//! emit(v) ──► Channel ──► Cursor ──► dispatch loop ──► cb1(&v), cb2(&v), ...
//!                  │                      ▲
//!                  └─► observe()          └── on(cb) / off(&cb)
//! ```
//!
//! ## Rules
//! - The loop starts in the constructor; values emitted right after construction are
//!   dispatched even if the loop task has not been polled yet.
//! - A callback receives values emitted after its `on` call, and nothing emitted after
//!   its `off` call has been dispatched to it.
//! - `close()` stops dispatching after the values already emitted; `shutdown()` also
//!   waits for the loop and, up to [`RegistryConfig::grace`], for spawned callback futures.
//! - `shutdown()` called from one of this registry's own callback futures does not wait
//!   for spawned futures, since the caller is one of them.
//! - Dropping the last handle stops the loop. Callbacks that capture a strong
//!   [`Registry`] keep it alive; capture a [`WeakRegistry`] instead.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::builder::RegistryBuilder;
use super::dispatch::{Dispatcher, in_callback_of};
use super::entries::CallbackList;
use super::failure::{DispatchFailure, FailureSink};
use crate::callbacks::{
    Callback, CallbackRef, CallbackResult, Completion, from_async_fn, from_fn,
};
use crate::chain::{Channel, Cursor};
use crate::config::RegistryConfig;
use crate::error::ShutdownError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct Inner<T> {
    id: u64,
    cfg: RegistryConfig,
    channel: Channel<T>,
    owns_channel: bool,
    callbacks: Arc<CallbackList<T>>,
    failures: FailureSink,
    token: CancellationToken,
    abort: CancellationToken,
    stop_at: Arc<AtomicU64>,
    tracker: TaskTracker,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Inner<T> {
    /// Lets the loop finish every value emitted so far, then stops it.
    fn stop(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.stop_at
            .store(self.channel.position(), Ordering::Release);
        self.token.cancel();
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        self.stop();
        self.tracker.close();
        self.failures.channel().close();
        if self.owns_channel {
            self.channel.close();
        }
    }
}

/// Push-based subscriber registry over a [`Channel`].
///
/// Cloning yields another handle to the same registry.
pub struct Registry<T> {
    inner: Arc<Inner<T>>,
}

/// Non-owning registry handle; see [`Registry::downgrade`].
pub struct WeakRegistry<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Registry<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a registry with [`RegistryConfig::default`] and its own channel.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates a registry with its own channel.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn with_config(cfg: RegistryConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Starts building a registry.
    pub fn builder(cfg: RegistryConfig) -> RegistryBuilder<T> {
        RegistryBuilder::new(cfg)
    }

    pub(super) fn start(cfg: RegistryConfig, channel: Channel<T>, owns_channel: bool) -> Self {
        let cursor = channel.observe();
        let callbacks = Arc::new(CallbackList::new());
        let failures = FailureSink::new(cfg.label(), cfg.log_failures);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let abort = CancellationToken::new();
        let stop_at = Arc::new(AtomicU64::new(u64::MAX));
        let tracker = TaskTracker::new();

        let worker = Dispatcher {
            id,
            label: cfg.label(),
            callbacks: Arc::clone(&callbacks),
            failures: failures.clone(),
            tracker: tracker.clone(),
            token: token.clone(),
            abort: abort.clone(),
            stop_at: Arc::clone(&stop_at),
        }
        .spawn(cursor);

        Self {
            inner: Arc::new(Inner {
                id,
                cfg,
                channel,
                owns_channel,
                callbacks,
                failures,
                token,
                abort,
                stop_at,
                tracker,
                worker: Mutex::new(Some(worker)),
            }),
        }
    }

    /// Registers `callback` for every value emitted from now on.
    ///
    /// Returns `false` if the same callback (by `Arc` identity) is already registered.
    pub fn on(&self, callback: CallbackRef<T>) -> bool {
        let since = self.inner.channel.position();
        let added = self.inner.callbacks.insert(callback, since);
        tracing::trace!(registry = self.name(), since, added, "callback registered");
        added
    }

    /// Registers a closure; keep the returned handle to [`off`](Self::off) it later.
    pub fn on_fn<F>(&self, f: F) -> CallbackRef<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback = from_fn(f);
        self.on(Arc::clone(&callback));
        callback
    }

    /// Registers an async closure; its futures are spawned, not awaited.
    pub fn on_async<F, Fut>(&self, f: F) -> CallbackRef<T>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        let callback = from_async_fn(f);
        self.on(Arc::clone(&callback));
        callback
    }

    /// Unregisters `callback` (or a [`forward_to`](Self::forward_to) relay); a no-op
    /// returning `false` if it is not registered.
    pub fn off(&self, callback: &CallbackRef<T>) -> bool {
        let removed = self.inner.callbacks.remove(callback);
        tracing::trace!(registry = self.name(), removed, "callback unregistered");
        removed
    }

    /// True if `callback` is currently registered.
    pub fn contains(&self, callback: &CallbackRef<T>) -> bool {
        self.inner.callbacks.contains(callback)
    }

    /// Unregisters every callback; relays installed by [`forward_to`](Self::forward_to) stay.
    pub fn clear(&self) {
        self.inner.callbacks.clear();
    }

    /// Number of registered callbacks, not counting relays.
    pub fn len(&self) -> usize {
        self.inner.callbacks.len()
    }

    /// True if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forwards to the underlying channel's [`Channel::emit`].
    pub fn emit(&self, value: T) {
        self.inner.channel.emit(value);
    }

    /// Raw cursor over the same channel, independent of the dispatch loop.
    pub fn observe(&self) -> Cursor<T> {
        self.inner.channel.observe()
    }

    /// Cursor over failures reported from now on.
    pub fn failures(&self) -> Cursor<DispatchFailure> {
        self.inner.failures.channel().observe()
    }

    /// The channel this registry consumes.
    pub fn channel(&self) -> &Channel<T> {
        &self.inner.channel
    }

    /// Re-emits every value into `target`.
    ///
    /// The relay holds `target` weakly; once `target` is dropped it does nothing.
    /// It is dispatched after the callbacks registered before it, but is not counted by
    /// [`len`](Self::len) and is kept by [`clear`](Self::clear); remove it with
    /// [`off`](Self::off) using the returned handle.
    pub fn forward_to(&self, target: &Registry<T>) -> CallbackRef<T> {
        let relay: CallbackRef<T> = Arc::new(Forward {
            target: target.downgrade(),
        });
        let since = self.inner.channel.position();
        self.inner.callbacks.insert_relay(Arc::clone(&relay), since);
        tracing::trace!(
            registry = self.name(),
            target = target.name(),
            since,
            "relay installed"
        );
        relay
    }

    /// Stops the dispatch loop once it has dispatched every value emitted before this call.
    ///
    /// A channel created by this registry is closed too: later emissions are dropped
    /// and every [`observe`](Self::observe) cursor ends after it drains.
    /// Returns `true` on the first call.
    pub fn close(&self) -> bool {
        if self.inner.token.is_cancelled() {
            return false;
        }
        self.inner.stop();
        if self.inner.owns_channel {
            self.inner.channel.close();
        }
        tracing::debug!(registry = self.name(), "registry closed");
        true
    }

    /// Closes the registry, waits for the loop, then waits up to
    /// [`RegistryConfig::grace`] for spawned callback futures.
    ///
    /// Failures reported by those futures are still published; the failure channel is
    /// closed afterwards. Called from one of this registry's own callback futures, it
    /// does not wait for spawned futures.
    ///
    /// # Errors
    /// Returns [`ShutdownError::GraceExceeded`] if callback futures were still running
    /// when the grace period ran out; they are aborted.
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        self.close();
        let worker = self.inner.worker.lock().take();
        if let Some(handle) = worker {
            let _ = handle.await;
        }
        self.inner.tracker.close();
        let res = if in_callback_of(self.inner.id) {
            tracing::debug!(registry = self.name(), "shutdown from own callback");
            Ok(())
        } else {
            self.wait_with_grace().await
        };
        self.inner.failures.channel().close();
        res
    }

    async fn wait_with_grace(&self) -> Result<(), ShutdownError> {
        let grace = self.inner.cfg.grace;
        match tokio::time::timeout(grace, self.inner.tracker.wait()).await {
            Ok(()) => Ok(()),
            Err(_) => {
                let stuck = self.inner.tracker.len();
                self.inner.abort.cancel();
                tracing::warn!(
                    registry = self.name(),
                    ?grace,
                    stuck,
                    "shutdown grace exceeded; aborting callback futures"
                );
                Err(ShutdownError::GraceExceeded {
                    registry: self.name(),
                    grace,
                    stuck,
                })
            }
        }
    }

    /// True once [`close`](Self::close) or [`shutdown`](Self::shutdown) was called.
    pub fn is_closed(&self) -> bool {
        self.inner.token.is_cancelled()
    }
}

impl<T> Registry<T> {
    /// Registry label ([`RegistryConfig::label`]).
    pub fn name(&self) -> &'static str {
        self.inner.cfg.label()
    }

    /// Creates a handle that does not keep the registry alive.
    pub fn downgrade(&self) -> WeakRegistry<T> {
        WeakRegistry {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<T> WeakRegistry<T> {
    /// Returns a strong handle if the registry is still alive.
    pub fn upgrade(&self) -> Option<Registry<T>> {
        self.inner.upgrade().map(|inner| Registry { inner })
    }
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Clone for WeakRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> Default for Registry<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name())
            .field("callbacks", &self.inner.callbacks.len())
            .field("position", &self.inner.channel.position())
            .field("closed", &self.inner.token.is_cancelled())
            .finish()
    }
}

/// Relay installed by [`Registry::forward_to`].
struct Forward<T> {
    target: WeakRegistry<T>,
}

impl<T> Callback<T> for Forward<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_value(&self, value: &T) -> Completion {
        if let Some(target) = self.target.upgrade() {
            target.emit(value.clone());
        }
        Completion::ok()
    }

    fn name(&self) -> &'static str {
        "forward"
    }
}
