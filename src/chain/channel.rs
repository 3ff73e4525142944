//! # Broadcast channel over a chain of single-assignment nodes.
//!
//! [`Channel`] is the producer side: it owns the chain's **tail**, the one node that
//! has not been resolved yet. Consumers get independent [`Cursor`]s from
//! [`Channel::observe`], each starting at the tail as it is *at that moment*.
//!
//! ## Architecture
//! ```text
//! emit(v):   tail ──resolve(Value{v, next})──► tail = next   (wakes every waiter)
//!
//! observe(): Cursor { node: tail }    ← sees only values emitted from now on
//! ```
//!
//! ## Rules
//! - **Replay-from-now**: no history is kept for late consumers.
//! - **No skips**: a lagging cursor walks through every resolved node it still references.
//! - **Serialized emission**: concurrent `emit` calls each become exactly one node.
//! - **Close**: resolves the tail with a terminal marker; later emissions are dropped.
//! - **Memory**: nodes behind the slowest live cursor are freed as cursors advance.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::cursor::Cursor;
use super::node::{Link, Node};

/// Single-producer, multi-consumer broadcast channel.
///
/// Cloning a channel yields another handle to the **same** chain; all clones emit
/// into and observe from one sequence.
///
/// ### Properties
/// - **Non-blocking**: `emit()` returns immediately after linking the value.
/// - **Unbounded**: there is no capacity; values live as long as some cursor still
///   has to read them.
/// - **Infallible**: emitting into a closed channel drops the value silently.
pub struct Channel<T> {
    tail: Arc<Mutex<Arc<Node<T>>>>,
}

impl<T> Channel<T> {
    /// Creates an open channel with an empty tail at position 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tail: Arc::new(Mutex::new(Node::new(0))),
        }
    }

    /// Publishes `value` as the next item and wakes every waiting cursor.
    ///
    /// If the channel is closed the value is dropped.
    pub fn emit(&self, value: T) {
        let mut tail = self.tail.lock();
        let next = Node::new(tail.position() + 1);
        if tail.resolve(Link::Value {
            value,
            next: Arc::clone(&next),
        }) {
            *tail = next;
        } else {
            tracing::trace!(position = tail.position(), "emit on closed channel dropped");
        }
    }

    /// Returns a fresh cursor positioned at the current tail.
    ///
    /// - Each call creates an **independent** cursor.
    /// - A cursor only yields values emitted **after** this call.
    /// - On a closed channel the cursor is immediately exhausted.
    #[must_use]
    pub fn observe(&self) -> Cursor<T> {
        Cursor::new(Arc::clone(&self.tail.lock()))
    }

    /// Closes the channel.
    ///
    /// Cursors still yield every value emitted before the close, then end.
    /// Returns `true` if this call closed the channel, `false` if it was already closed.
    pub fn close(&self) -> bool {
        let closed = self.tail.lock().resolve(Link::Closed);
        if closed {
            tracing::trace!("channel closed");
        }
        closed
    }

    /// True once [`close`](Self::close) has been called on any handle.
    pub fn is_closed(&self) -> bool {
        matches!(self.tail.lock().link(), Some(Link::Closed))
    }

    /// Number of values emitted so far; also the position of the next value.
    pub fn position(&self) -> u64 {
        self.tail.lock().position()
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            tail: Arc::clone(&self.tail),
        }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("position", &self.position())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;

    use super::*;
    use crate::TryNextError;

    fn drain<T: Clone>(cursor: &mut Cursor<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Ok(v) = cursor.try_next() {
            out.push(v);
        }
        out
    }

    #[tokio::test]
    async fn test_late_cursor_sees_only_suffix() {
        let ch = Channel::new();
        let mut c1 = ch.observe();
        ch.emit(1);
        let mut c2 = ch.observe();
        ch.emit(2);

        assert_eq!(c1.next().await, Some(1));
        assert_eq!(c1.next().await, Some(2));
        assert_eq!(c2.next().await, Some(2));
        assert_eq!(c2.try_next(), Err(TryNextError::Empty));
    }

    #[tokio::test]
    async fn test_no_replay_after_k_emissions() {
        let ch = Channel::new();
        for i in 0..5 {
            ch.emit(i);
        }
        let mut late = ch.observe();
        assert_eq!(late.position(), 5);
        assert_eq!(late.try_next(), Err(TryNextError::Empty));

        ch.emit(5);
        ch.emit(6);
        assert_eq!(drain(&mut late), vec![5, 6]);
    }

    #[tokio::test]
    async fn test_order_preserved_for_early_cursor() {
        let ch = Channel::new();
        let mut c = ch.observe();
        let values: Vec<u32> = (0..100).collect();
        for v in &values {
            ch.emit(*v);
        }
        let mut seen = Vec::new();
        for _ in 0..values.len() {
            seen.push(c.next().await.unwrap());
        }
        assert_eq!(seen, values);
    }

    #[tokio::test]
    async fn test_cursors_are_independent() {
        let ch = Channel::new();
        let mut fast = ch.observe();
        let mut slow = ch.observe();
        ch.emit("a");
        ch.emit("b");

        assert_eq!(drain(&mut fast), vec!["a", "b"]);
        assert_eq!(slow.position(), 0);
        assert_eq!(slow.next().await, Some("a"));
        ch.emit("c");
        assert_eq!(drain(&mut fast), vec!["c"]);
        assert_eq!(drain(&mut slow), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_waiting_consumers_all_woken() {
        let ch = Channel::<u64>::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let mut cursor = ch.observe();
            handles.push(tokio::spawn(async move {
                let mut got = Vec::new();
                for _ in 0..3 {
                    got.push(cursor.next().await.unwrap());
                }
                got
            }));
        }
        tokio::task::yield_now().await;
        for v in [10, 20, 30] {
            ch.emit(v);
            tokio::task::yield_now().await;
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), vec![10, 20, 30]);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fan_out_across_threads() {
        const N: u64 = 1_000;
        let ch = Channel::<u64>::new();
        let consumers: Vec<_> = (0..6)
            .map(|_| {
                let mut cursor = ch.observe();
                tokio::spawn(async move {
                    let mut sum = 0;
                    let mut last = None;
                    for _ in 0..N {
                        let v = cursor.next().await.unwrap();
                        if let Some(prev) = last {
                            assert!(v > prev, "out of order: {v} after {prev}");
                        }
                        last = Some(v);
                        sum += v;
                    }
                    sum
                })
            })
            .collect();

        let producer = {
            let ch = ch.clone();
            tokio::spawn(async move {
                for v in 0..N {
                    ch.emit(v);
                    if v % 64 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        };
        producer.await.unwrap();

        for c in consumers {
            let sum = tokio::time::timeout(Duration::from_secs(5), c)
                .await
                .expect("consumer stalled")
                .unwrap();
            assert_eq!(sum, N * (N - 1) / 2);
        }
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let ch = Channel::new();
        let mut c = ch.observe();
        ch.emit(1);
        ch.emit(2);
        assert!(ch.close());
        assert!(!ch.close());
        assert!(ch.is_closed());

        ch.emit(3);
        assert_eq!(ch.position(), 2);

        assert_eq!(c.next().await, Some(1));
        assert_eq!(c.next().await, Some(2));
        assert_eq!(c.next().await, None);
        assert_eq!(c.try_next(), Err(TryNextError::Closed));
    }

    #[tokio::test]
    async fn test_close_wakes_waiter() {
        let ch = Channel::<()>::new();
        let mut c = ch.observe();
        let waiter = tokio::spawn(async move { c.next().await });
        tokio::task::yield_now().await;
        ch.close();
        assert_eq!(waiter.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_observe_after_close_is_exhausted() {
        let ch = Channel::<u8>::new();
        ch.close();
        let mut c = ch.observe();
        assert_eq!(c.next().await, None);
    }

    #[tokio::test]
    async fn test_stream_adapter() {
        let ch = Channel::new();
        let stream = ch.observe().into_stream();
        ch.emit(1);
        ch.emit(2);
        ch.emit(3);
        ch.close();
        let got: Vec<i32> = stream.collect().await;
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn test_debug_shows_position() {
        let ch = Channel::new();
        ch.emit('x');
        assert_eq!(format!("{ch:?}"), "Channel { position: 1, closed: false }");
    }
}
