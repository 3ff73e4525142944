//! # chainbus
//!
//! **chainbus** is a small replay-from-now broadcast library for Rust.
//!
//! It provides an unbounded, order-preserving broadcast [`Channel`] built on a chain of
//! single-assignment nodes, a callback [`Registry`] that turns the channel into an
//! `on`/`off` event emitter, and a [`DebugHub`] that wires the two into debugger
//! lifecycle events for a type-inference tool.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        producer                                     consumers
//!     ┌────────────┐
//!     │ emit(v)    │      ┌──────────────── Channel ─────────────────┐
//!     └─────┬──────┘      │                                          │
//!           └───────────► │ [v0] ─► [v1] ─► [v2] ─► [ tail (empty) ] │
//!                         │   ▲               ▲              ▲       │
//!                         └───┼───────────────┼──────────────┼───────┘
//!                             │               │              │
//!                       Cursor (lagging)  Cursor       Registry loop
//!                                                           │
//!                                        ┌──────────────────┼──────────────────┐
//!                                        ▼                  ▼                  ▼
//!                                   cb1.on_value()     cb2.on_value()     cbN.on_value()
//!                                   (inline)           (spawned future)   (panic caught)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Registry::new() ──► observe() ──► spawn dispatch loop
//!
//! loop {
//!   ├─► await next node (cancellable)
//!   ├─► snapshot callbacks registered at or before this value
//!   ├─► invoke each in registration order
//!   │       ├─ Err / panic ─► DispatchFailure (logged + failure channel)
//!   │       └─ Pending     ─► spawned on the registry's task tracker
//!   └─ exit conditions:
//!        - close() / shutdown()
//!        - last Registry handle dropped
//!        - bound channel closed
//! }
//! ```
//!
//! ## Features
//! | Area            | Description                                                   | Key types / traits                       |
//! |-----------------|---------------------------------------------------------------|------------------------------------------|
//! | **Channel**     | Unbounded broadcast with independent cursors, no replay.      | [`Channel`], [`Cursor`]                  |
//! | **Registry**    | `on`/`off` callbacks driven by a background loop.             | [`Registry`], [`Callback`]               |
//! | **Async**       | Fire-and-forget async handlers, tracked for shutdown.         | [`AsyncCallback`], [`Completion`]        |
//! | **Errors**      | Per-callback isolation and typed failure reports.             | [`CallbackError`], [`DispatchFailure`]   |
//! | **Shutdown**    | Drain, then wait for async handlers up to a grace period.     | [`ShutdownError`]                        |
//! | **Debug hub**   | Debugger lifecycle and command events as an explicit context. | [`DebugHub`], [`SessionTracker`]         |
//! | **Config**      | Registry naming, failure logging and shutdown grace.          | [`RegistryConfig`]                       |
//!
//! ## Optional features
//! - `logging`: exports a `tracing`-backed [`LogWriter`] callback _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use chainbus::{Channel, Registry};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Low level: independent cursors.
//!     let channel = Channel::new();
//!     let mut early = channel.observe();
//!     channel.emit(1);
//!     let mut late = channel.observe();
//!     channel.emit(2);
//!     assert_eq!(early.next().await, Some(1));
//!     assert_eq!(early.next().await, Some(2));
//!     assert_eq!(late.next().await, Some(2));
//!
//!     // High level: callbacks.
//!     let registry = Registry::new();
//!     let total = Arc::new(AtomicUsize::new(0));
//!     let sum = Arc::clone(&total);
//!     let cb = registry.on_fn(move |v: &usize| {
//!         sum.fetch_add(*v, Ordering::SeqCst);
//!     });
//!     registry.emit(5);
//!     registry.shutdown().await.expect("callbacks finished within grace");
//!     assert_eq!(total.load(Ordering::SeqCst), 5);
//!     assert!(registry.off(&cb));
//! }
//! ```
mod callbacks;
mod chain;
mod config;
mod error;
mod hub;
mod registry;

// ---- Public re-exports ----

pub use callbacks::{
    AsyncCallback, Callback, CallbackRef, CallbackResult, Completion, detached, from_async_fn,
    from_fn, try_from_fn,
};
pub use chain::{Channel, Cursor};
pub use config::RegistryConfig;
pub use error::{CallbackError, ShutdownError, TryNextError};
pub use hub::{DebugHub, DebugMessage, InferTypeRequest, SessionEnd, SessionInfo, SessionTracker};
pub use registry::{DispatchFailure, Registry, RegistryBuilder, WeakRegistry};

// Optional: expose a simple built-in logger callback (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use callbacks::LogWriter;
