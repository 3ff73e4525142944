//! # Subscriber registry: `on`/`off` callbacks over a broadcast channel.
//!
//! This module adapts the pull-based [`Cursor`](crate::Cursor) into a push-based
//! callback API.
//!
//! ## Contents
//! - [`Registry`] / [`WeakRegistry`] handles and [`RegistryBuilder`]
//! - [`DispatchFailure`] reports published on [`Registry::failures`]
//!
//! Internal modules:
//! - `entries`: callback list with registration positions;
//! - `dispatch`: the background loop and per-callback isolation;
//! - `failure`: logging and the failure side channel.

mod builder;
mod dispatch;
mod entries;
mod failure;
mod handle;

pub use builder::RegistryBuilder;
pub use failure::DispatchFailure;
pub use handle::{Registry, WeakRegistry};
