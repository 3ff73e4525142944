//! # Callback traits and closure adapters.
//!
//! Provides [`Callback`], the extension point a [`Registry`](crate::Registry) dispatches
//! values to, and [`AsyncCallback`] for handlers whose work continues after dispatch.
//!
//! ## Architecture
//! ```text
//! dispatch loop ──► callback.on_value(&value) ──► Completion::Done(result)
//!                                            └──► Completion::Pending(future) ──► spawned, not awaited
//! ```
//!
//! ## Rules
//! - `on_value` runs **synchronously** on the dispatch loop; keep it short.
//! - Work that awaits belongs in the returned future; the loop does not wait for it.
//! - Errors and panics are caught per callback and reported as
//!   [`DispatchFailure`](crate::DispatchFailure)s; other callbacks are unaffected.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use chainbus::{AsyncCallback, CallbackResult};
//!
//! struct Upload;
//!
//! #[async_trait]
//! impl AsyncCallback<String> for Upload {
//!     async fn on_value(self: Arc<Self>, value: String) -> CallbackResult {
//!         let _ = value; // send it somewhere
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "upload" }
//! }
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::CallbackError;

/// Result of handling one value.
pub type CallbackResult = Result<(), CallbackError>;

/// Shared handle to a registered callback; identity is the `Arc` allocation.
pub type CallbackRef<T> = Arc<dyn Callback<T>>;

/// What a callback hands back to the dispatch loop.
pub enum Completion {
    /// Handling finished during the call.
    Done(CallbackResult),
    /// Handling continues in this future; the registry spawns it and moves on.
    Pending(BoxFuture<'static, CallbackResult>),
}

impl Completion {
    /// Successful synchronous completion.
    pub fn ok() -> Self {
        Completion::Done(Ok(()))
    }

    /// Wraps a future to be spawned by the registry.
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = CallbackResult> + Send + 'static,
    {
        Completion::Pending(Box::pin(fut))
    }
}

impl From<CallbackResult> for Completion {
    fn from(res: CallbackResult) -> Self {
        Completion::Done(res)
    }
}

/// Value handler invoked by a registry's dispatch loop.
///
/// ### Implementation requirements
/// - Do not block; return [`Completion::Pending`] for async work.
/// - Report recoverable problems as `Err`; panics are caught but leave the
///   handler's own state up to it.
pub trait Callback<T>: Send + Sync + 'static {
    /// Handles one value.
    fn on_value(&self, value: &T) -> Completion;

    /// Returns the callback name used in logs and failure reports.
    ///
    /// The default uses `type_name::<Self>()`, which is verbose for closures;
    /// override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Asynchronous value handler.
///
/// Wrap it with [`detached`] to register it: each value is cloned into a fresh
/// `on_value` future that the registry spawns without awaiting.
#[async_trait]
pub trait AsyncCallback<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    /// Handles one value.
    async fn on_value(self: Arc<Self>, value: T) -> CallbackResult;

    /// Returns the callback name used in logs and failure reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

struct FnCallback<F>(F);

impl<T, F> Callback<T> for FnCallback<F>
where
    F: Fn(&T) + Send + Sync + 'static,
{
    fn on_value(&self, value: &T) -> Completion {
        (self.0)(value);
        Completion::ok()
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}

struct TryFnCallback<F>(F);

impl<T, F> Callback<T> for TryFnCallback<F>
where
    F: Fn(&T) -> CallbackResult + Send + Sync + 'static,
{
    fn on_value(&self, value: &T) -> Completion {
        Completion::Done((self.0)(value))
    }

    fn name(&self) -> &'static str {
        "try_fn"
    }
}

struct AsyncFnCallback<F, T> {
    f: F,
    _value: PhantomData<fn(T)>,
}

impl<T, F, Fut> Callback<T> for AsyncFnCallback<F, T>
where
    T: Clone + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    fn on_value(&self, value: &T) -> Completion {
        Completion::pending((self.f)(value.clone()))
    }

    fn name(&self) -> &'static str {
        "async_fn"
    }
}

struct Detached<C>(Arc<C>);

impl<T, C> Callback<T> for Detached<C>
where
    T: Clone + Send + 'static,
    C: AsyncCallback<T>,
{
    fn on_value(&self, value: &T) -> Completion {
        Completion::Pending(Arc::clone(&self.0).on_value(value.clone()))
    }

    fn name(&self) -> &'static str {
        AsyncCallback::<T>::name(&*self.0)
    }
}

/// Wraps an infallible closure.
pub fn from_fn<T, F>(f: F) -> CallbackRef<T>
where
    T: 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    Arc::new(FnCallback(f))
}

/// Wraps a closure that may fail.
pub fn try_from_fn<T, F>(f: F) -> CallbackRef<T>
where
    T: 'static,
    F: Fn(&T) -> CallbackResult + Send + Sync + 'static,
{
    Arc::new(TryFnCallback(f))
}

/// Wraps an async closure; it receives an owned clone of each value.
pub fn from_async_fn<T, F, Fut>(f: F) -> CallbackRef<T>
where
    T: Clone + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    Arc::new(AsyncFnCallback {
        f,
        _value: PhantomData,
    })
}

/// Adapts an [`AsyncCallback`] for registration.
pub fn detached<T, C>(callback: C) -> CallbackRef<T>
where
    T: Clone + Send + 'static,
    C: AsyncCallback<T>,
{
    Arc::new(Detached(Arc::new(callback)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_fn_callback_runs_inline() {
        let hits = Arc::new(AtomicUsize::new(0));
        let cb = {
            let hits = Arc::clone(&hits);
            from_fn(move |v: &usize| {
                hits.fetch_add(*v, Ordering::SeqCst);
            })
        };
        assert!(matches!(cb.on_value(&3), Completion::Done(Ok(()))));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(cb.name(), "fn");
    }

    #[test]
    fn test_try_fn_propagates_error() {
        let cb = try_from_fn(|v: &i32| {
            if *v < 0 {
                Err(CallbackError::failed(format!("negative: {v}")))
            } else {
                Ok(())
            }
        });
        assert!(matches!(cb.on_value(&1), Completion::Done(Ok(()))));
        match cb.on_value(&-1) {
            Completion::Done(Err(e)) => assert_eq!(e.to_string(), "callback failed: negative: -1"),
            _ => panic!("expected a synchronous failure"),
        }
    }

    #[tokio::test]
    async fn test_async_fn_defers_work() {
        let hits = Arc::new(AtomicUsize::new(0));
        let cb = {
            let hits = Arc::clone(&hits);
            from_async_fn(move |v: String| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(v.len(), Ordering::SeqCst);
                    Ok(())
                }
            })
        };
        let fut = match cb.on_value(&"four".to_string()) {
            Completion::Pending(fut) => fut,
            Completion::Done(_) => panic!("expected a pending completion"),
        };
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        fut.await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    struct Echo;

    #[async_trait]
    impl AsyncCallback<u8> for Echo {
        async fn on_value(self: Arc<Self>, value: u8) -> CallbackResult {
            if value == 0 {
                return Err(CallbackError::failed("zero"));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_detached_uses_inner_name() {
        let cb: CallbackRef<u8> = detached(Echo);
        assert_eq!(cb.name(), "echo");
        match cb.on_value(&0) {
            Completion::Pending(fut) => assert!(fut.await.is_err()),
            Completion::Done(_) => panic!("expected a pending completion"),
        }
    }
}
