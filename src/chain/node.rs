//! # Chain node: a single-assignment cell plus its wake-up primitive.
//!
//! ```text
//!  Node(p) ──resolve(Value)──► Node(p+1) ──resolve(Value)──► Node(p+2) (tail, empty)
//!     │                           │                              ▲
//!  cursor A                    cursor B                    channel tail
//! ```
//!
//! ## Rules
//! - A node is resolved **at most once**: with a value and the next node, or with `Closed`.
//! - Waiters register interest *before* checking the cell, so a resolve racing the
//!   check is never missed (`Notify::notified` observes `notify_waiters` from creation).
//! - Dropping a long unconsumed chain is iterative, never recursive.

use std::sync::{Arc, OnceLock};

use tokio::sync::Notify;

/// Resolved content of a node.
pub(crate) enum Link<T> {
    /// An emitted value and the node holding whatever comes after it.
    Value { value: T, next: Arc<Node<T>> },
    /// Terminal marker written by `Channel::close`.
    Closed,
}

/// One link of the chain.
pub(crate) struct Node<T> {
    /// Number of values emitted before this node.
    position: u64,
    link: OnceLock<Link<T>>,
    notify: Notify,
}

impl<T> Node<T> {
    pub(crate) fn new(position: u64) -> Arc<Self> {
        Arc::new(Self {
            position,
            link: OnceLock::new(),
            notify: Notify::new(),
        })
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    /// Returns the link if already resolved.
    pub(crate) fn link(&self) -> Option<&Link<T>> {
        self.link.get()
    }

    /// Writes the cell and wakes every waiter.
    ///
    /// Returns `false` (and drops `link`) if the node was already resolved.
    pub(crate) fn resolve(&self, link: Link<T>) -> bool {
        if self.link.set(link).is_err() {
            return false;
        }
        self.notify.notify_waiters();
        true
    }

    /// Waits until the node is resolved.
    ///
    /// Cancel-safe: dropping the future leaves the node untouched.
    pub(crate) async fn resolved(&self) -> &Link<T> {
        loop {
            let notified = self.notify.notified();
            if let Some(link) = self.link.get() {
                return link;
            }
            notified.await;
        }
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        let mut next = match self.link.take() {
            Some(Link::Value { next, .. }) => next,
            _ => return,
        };
        // Unlink successors we solely own; stop at the first one still shared.
        while let Ok(mut node) = Arc::try_unwrap(next) {
            match node.link.take() {
                Some(Link::Value { next: after, .. }) => next = after,
                _ => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_only_once() {
        let node = Node::<u32>::new(0);
        assert!(node.link().is_none());
        assert!(node.resolve(Link::Value {
            value: 1,
            next: Node::new(1),
        }));
        assert!(!node.resolve(Link::Closed));
        assert!(matches!(node.link(), Some(Link::Value { value: 1, .. })));
    }

    #[tokio::test]
    async fn test_resolved_wakes_waiter() {
        let node = Node::<&'static str>::new(0);
        let waiter = {
            let node = Arc::clone(&node);
            tokio::spawn(async move {
                match node.resolved().await {
                    Link::Value { value, .. } => Some(*value),
                    Link::Closed => None,
                }
            })
        };
        tokio::task::yield_now().await;
        node.resolve(Link::Value {
            value: "hello",
            next: Node::new(1),
        });
        assert_eq!(waiter.await.unwrap(), Some("hello"));
    }

    #[test]
    fn test_long_chain_drops_iteratively() {
        let head = Node::<u64>::new(0);
        let mut tail = Arc::clone(&head);
        for i in 0..500_000u64 {
            let next = Node::new(i + 1);
            tail.resolve(Link::Value {
                value: i,
                next: Arc::clone(&next),
            });
            tail = next;
        }
        drop(tail);
        drop(head);
    }
}
