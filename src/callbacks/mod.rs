//! # Callbacks dispatched by a [`Registry`](crate::Registry).
//!
//! This module provides the [`Callback`] trait, its async sibling [`AsyncCallback`],
//! and closure adapters for the common cases.
//!
//! ## Architecture
//! ```text
//! Registry loop ── value ──► snapshot of callbacks (registration order)
//!                                 │
//!                  ┌──────────────┼──────────────┬──────────────┐
//!                  ▼              ▼              ▼              ▼
//!               from_fn      try_from_fn    from_async_fn    detached(C)
//!               (inline)      (inline)      (spawned)        (spawned)
//! ```
//!
//! ## Implementing custom callbacks
//! ```no_run
//! use chainbus::{Callback, Completion};
//!
//! struct Counter(std::sync::atomic::AtomicU64);
//!
//! impl Callback<u32> for Counter {
//!     fn on_value(&self, _value: &u32) -> Completion {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         Completion::ok()
//!     }
//!
//!     fn name(&self) -> &'static str { "counter" }
//! }
//! ```

mod callback;

#[cfg(feature = "logging")]
mod embedded;

pub use callback::{
    AsyncCallback, Callback, CallbackRef, CallbackResult, Completion, detached, from_async_fn,
    from_fn, try_from_fn,
};

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
