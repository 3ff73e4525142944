//! # Dispatch loop: pull values from a cursor, push them to callbacks.
//!
//! ```text
//! loop {
//!   ├─► position = cursor.position()
//!   ├─► select! { token.cancelled() ─► drain up to stop_at, exit
//!   │             cursor.next()     ─► value / None ─► exit }
//!   └─► for cb in callbacks.snapshot_at(position):      (registration order)
//!         ├─ Done(Ok)      ─► next
//!         ├─ Done(Err)     ─► report failure
//!         ├─ Pending(fut)  ─► tracker.spawn(fut) (not awaited; errors/panics reported)
//!         └─ panic         ─► caught, reported
//! }
//! ```
//!
//! ## Rules
//! - Callbacks of one dispatch run sequentially on the loop task.
//! - A failing callback never stops the others or the loop.
//! - Callbacks added during a dispatch are not in its snapshot; removed ones still are.
//! - On cancellation, values emitted before `stop_at` are still dispatched.
//! - Spawned futures run inside a task-local scope naming their registry, and stop early
//!   once `abort` is cancelled (shutdown grace exceeded).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::entries::CallbackList;
use super::failure::FailureSink;
use crate::callbacks::{CallbackResult, Completion};
use crate::chain::Cursor;
use crate::error::CallbackError;

tokio::task_local! {
    /// Id of the registry whose callback future is running on the current task.
    static RUNNING_FOR: u64;
}

/// True when called from a callback future spawned by registry `id`.
pub(crate) fn in_callback_of(id: u64) -> bool {
    RUNNING_FOR.try_with(|running| *running == id).unwrap_or(false)
}

/// State owned by one registry's loop task.
pub(crate) struct Dispatcher<T> {
    pub(crate) id: u64,
    pub(crate) label: &'static str,
    pub(crate) callbacks: Arc<CallbackList<T>>,
    pub(crate) failures: FailureSink,
    pub(crate) tracker: TaskTracker,
    pub(crate) token: CancellationToken,
    /// Cancelled when shutdown gives up on spawned callback futures.
    pub(crate) abort: CancellationToken,
    /// Channel position recorded by `close`; `u64::MAX` while open.
    pub(crate) stop_at: Arc<AtomicU64>,
}

impl<T> Dispatcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawns the loop over an already attached cursor.
    pub(crate) fn spawn(self, cursor: Cursor<T>) -> JoinHandle<()> {
        tokio::spawn(self.run(cursor))
    }

    async fn run(self, mut cursor: Cursor<T>) {
        tracing::debug!(
            registry = self.label,
            position = cursor.position(),
            "dispatch loop started"
        );
        loop {
            let position = cursor.position();
            let value = tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    self.drain(&mut cursor);
                    break;
                }
                next = cursor.next() => match next {
                    Some(value) => value,
                    None => break,
                },
            };
            self.dispatch(&value, position);
        }
        tracing::debug!(
            registry = self.label,
            position = cursor.position(),
            "dispatch loop stopped"
        );
    }

    /// Dispatches values that were already emitted when the registry was closed.
    fn drain(&self, cursor: &mut Cursor<T>) {
        let stop = self.stop_at.load(Ordering::Acquire);
        while cursor.position() < stop {
            let position = cursor.position();
            match cursor.try_next() {
                Ok(value) => self.dispatch(&value, position),
                Err(_) => break,
            }
        }
    }

    /// Runs one dispatch for the value at `position`.
    pub(crate) fn dispatch(&self, value: &T, position: u64) {
        for callback in self.callbacks.snapshot_at(position) {
            let name = callback.name();
            match std::panic::catch_unwind(AssertUnwindSafe(|| callback.on_value(value))) {
                Ok(Completion::Done(Ok(()))) => {}
                Ok(Completion::Done(Err(err))) => self.failures.report(name, position, err),
                Ok(Completion::Pending(fut)) => self.spawn_pending(name, position, fut),
                Err(panic) => {
                    self.failures
                        .report(name, position, CallbackError::from_panic(&*panic));
                }
            }
        }
    }

    fn spawn_pending(
        &self,
        name: &'static str,
        position: u64,
        fut: BoxFuture<'static, CallbackResult>,
    ) {
        let failures = self.failures.clone();
        let abort = self.abort.clone();
        let label = self.label;
        let run = async move {
            tokio::select! {
                biased;
                outcome = AssertUnwindSafe(fut).catch_unwind() => match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => failures.report(name, position, err),
                    Err(panic) => {
                        failures.report(name, position, CallbackError::from_panic(&*panic));
                    }
                },
                _ = abort.cancelled() => {
                    tracing::debug!(
                        registry = label,
                        callback = name,
                        position,
                        "callback future aborted"
                    );
                }
            }
        };
        self.tracker.spawn(RUNNING_FOR.scope(self.id, run));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::TryNextError;
    use crate::callbacks::{from_async_fn, from_fn, try_from_fn};

    fn dispatcher<T>() -> Dispatcher<T> {
        Dispatcher {
            id: 0,
            label: "test",
            callbacks: Arc::new(CallbackList::new()),
            failures: FailureSink::new("test", false),
            tracker: TaskTracker::new(),
            token: CancellationToken::new(),
            abort: CancellationToken::new(),
            stop_at: Arc::new(AtomicU64::new(u64::MAX)),
        }
    }

    #[test]
    fn test_panic_is_isolated() {
        let d = dispatcher::<u32>();
        let mut failures = d.failures.channel().observe();
        let after = Arc::new(AtomicUsize::new(0));

        d.callbacks.insert(from_fn(|_: &u32| panic!("first one explodes")), 0);
        let counter = Arc::clone(&after);
        d.callbacks.insert(
            from_fn(move |_: &u32| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            0,
        );

        d.dispatch(&7, 0);
        d.dispatch(&8, 1);

        assert_eq!(after.load(Ordering::SeqCst), 2);
        let first = failures.try_next().unwrap();
        assert_eq!(first.position, 0);
        assert_eq!(
            first.error,
            CallbackError::Panicked {
                info: "first one explodes".into()
            }
        );
        assert_eq!(failures.try_next().unwrap().position, 1);
        assert_eq!(failures.try_next(), Err(TryNextError::Empty));
    }

    #[test]
    fn test_error_is_reported_with_name() {
        let d = dispatcher::<u32>();
        let mut failures = d.failures.channel().observe();
        d.callbacks
            .insert(try_from_fn(|_: &u32| Err(CallbackError::failed("bad"))), 0);

        d.dispatch(&1, 3);
        let failure = failures.try_next().unwrap();
        assert_eq!(failure.callback, "try_fn");
        assert_eq!(failure.registry, "test");
        assert_eq!(failure.position, 3);
    }

    #[tokio::test]
    async fn test_pending_is_spawned_and_tracked() {
        let d = dispatcher::<u32>();
        let mut failures = d.failures.channel().observe();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let rx = Arc::new(parking_lot::Mutex::new(Some(rx)));

        d.callbacks.insert(
            from_async_fn(move |_: u32| {
                let rx = rx.lock().take();
                async move {
                    if let Some(rx) = rx {
                        let _ = rx.await;
                    }
                    Err(CallbackError::failed("late"))
                }
            }),
            0,
        );

        d.dispatch(&1, 0);
        assert_eq!(d.tracker.len(), 1);
        assert_eq!(failures.try_next(), Err(TryNextError::Empty));

        tx.send(()).unwrap();
        d.tracker.close();
        d.tracker.wait().await;
        assert_eq!(failures.try_next().unwrap().error, CallbackError::failed("late"));
    }

    #[tokio::test]
    async fn test_pending_panic_is_caught() {
        let d = dispatcher::<u32>();
        let mut failures = d.failures.channel().observe();
        d.callbacks.insert(
            from_async_fn(|v: u32| async move {
                if v > 0 {
                    panic!("async boom {v}");
                }
                Ok(())
            }),
            0,
        );

        d.dispatch(&5, 0);
        d.tracker.close();
        d.tracker.wait().await;
        assert_eq!(
            failures.try_next().unwrap().error,
            CallbackError::Panicked {
                info: "async boom 5".into()
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_drains_values_before_stop() {
        let d = dispatcher::<u32>();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        d.callbacks
            .insert(from_fn(move |v: &u32| sink.lock().push(*v)), 0);
        let token = d.token.clone();
        let stop_at = Arc::clone(&d.stop_at);

        let channel = crate::Channel::new();
        let handle = d.spawn(channel.observe());
        channel.emit(1);
        channel.emit(2);
        stop_at.store(channel.position(), Ordering::Release);
        token.cancel();
        channel.emit(3);

        handle.await.unwrap();
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_loop_stops_on_cancel() {
        let d = dispatcher::<u32>();
        let token = d.token.clone();
        let channel = crate::Channel::new();
        let handle = d.spawn(channel.observe());
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("loop did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_abort_stops_pending_futures() {
        let d = dispatcher::<u32>();
        let mut failures = d.failures.channel().observe();
        d.callbacks.insert(
            from_async_fn(|_: u32| async {
                std::future::pending::<()>().await;
                Ok(())
            }),
            0,
        );

        d.dispatch(&1, 0);
        d.abort.cancel();
        d.tracker.close();
        tokio::time::timeout(std::time::Duration::from_secs(1), d.tracker.wait())
            .await
            .expect("aborted future still running");
        assert_eq!(failures.try_next(), Err(TryNextError::Empty));
    }

    #[tokio::test]
    async fn test_pending_future_knows_its_registry() {
        let mut d = dispatcher::<u32>();
        d.id = 7;
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        d.callbacks.insert(
            from_async_fn(move |_: u32| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().push((in_callback_of(7), in_callback_of(8)));
                    Ok(())
                }
            }),
            0,
        );

        assert!(!in_callback_of(7));
        d.dispatch(&1, 0);
        d.tracker.close();
        d.tracker.wait().await;
        assert_eq!(*seen.lock(), vec![(true, false)]);
    }
}
