//! # Cursor: one consumer's read position in a channel.
//!
//! A cursor is an `Arc` to the next node it has not consumed. Advancing follows the
//! node's resolved link; a cursor that is behind catches up without suspending.
//!
//! Cursors are not clonable: each [`Channel::observe`](crate::Channel::observe) call is
//! the only way to obtain a fresh one.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;

use super::node::{Link, Node};
use crate::error::TryNextError;

/// Independent read position over a [`Channel`](crate::Channel).
pub struct Cursor<T> {
    node: Arc<Node<T>>,
}

impl<T> Cursor<T> {
    pub(crate) fn new(node: Arc<Node<T>>) -> Self {
        Self { node }
    }

    /// Position of the next value this cursor will yield.
    pub fn position(&self) -> u64 {
        self.node.position()
    }
}

impl<T: Clone> Cursor<T> {
    /// Waits for the next value.
    ///
    /// Returns `None` once the channel is closed and every value emitted before the
    /// close has been yielded. Cancel-safe: dropping the future loses nothing.
    pub async fn next(&mut self) -> Option<T> {
        let (value, next) = match self.node.resolved().await {
            Link::Value { value, next } => (value.clone(), Arc::clone(next)),
            Link::Closed => return None,
        };
        self.node = next;
        Some(value)
    }

    /// Yields the next value if it has already been emitted.
    pub fn try_next(&mut self) -> Result<T, TryNextError> {
        let (value, next) = match self.node.link() {
            Some(Link::Value { value, next }) => (value.clone(), Arc::clone(next)),
            Some(Link::Closed) => return Err(TryNextError::Closed),
            None => return Err(TryNextError::Empty),
        };
        self.node = next;
        Ok(value)
    }
}

impl<T> Cursor<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Converts the cursor into a [`Stream`](futures::Stream) that ends when the channel closes.
    pub fn into_stream(self) -> BoxStream<'static, T> {
        futures::stream::unfold(self, |mut cursor| async move {
            let value = cursor.next().await?;
            Some((value, cursor))
        })
        .boxed()
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position())
            .finish()
    }
}
