//! Broadcast channel: chain of single-assignment nodes and per-consumer cursors.
//!
//! ## Contents
//! - [`Channel`] producer handle owning the chain's tail
//! - [`Cursor`] independent consumer position
//!
//! The registry loop and direct `observe()` callers are both plain cursor holders;
//! see `registry/mod.rs` for the callback layer built on top.

mod channel;
mod cursor;
mod node;

pub use channel::Channel;
pub use cursor::Cursor;
