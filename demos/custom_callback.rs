//! # Custom Callback Example
//!
//! Shows how to implement `Callback` and `AsyncCallback` for your own types, next to
//! the built-in `LogWriter`.
//!
//! The example counts:
//! - Values seen
//! - Values over a threshold (reported from an async handler)
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example custom_callback --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chainbus::{
    AsyncCallback, Callback, CallbackError, CallbackResult, Completion, LogWriter, Registry,
    detached,
};
use tracing_subscriber::EnvFilter;

struct Counter {
    seen: AtomicU64,
}

impl Callback<u64> for Counter {
    fn on_value(&self, _value: &u64) -> Completion {
        self.seen.fetch_add(1, Ordering::Relaxed);
        Completion::ok()
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

struct Threshold {
    limit: u64,
    over: AtomicU64,
}

#[async_trait]
impl AsyncCallback<u64> for Threshold {
    async fn on_value(self: Arc<Self>, value: u64) -> CallbackResult {
        tokio::task::yield_now().await;
        if value > self.limit {
            self.over.fetch_add(1, Ordering::Relaxed);
            return Err(CallbackError::failed(format!("{value} > {}", self.limit)));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Registry::<u64>::new();
    let counter = Arc::new(Counter {
        seen: AtomicU64::new(0),
    });
    registry.on(counter.clone());
    registry.on(Arc::new(LogWriter::new("numbers")));
    registry.on(detached(Threshold {
        limit: 10,
        over: AtomicU64::new(0),
    }));

    for v in [3, 7, 11, 42] {
        registry.emit(v);
    }
    if let Err(err) = registry.shutdown().await {
        eprintln!("shutdown: {err}");
    }

    println!();
    println!("Metrics:");
    println!(" ├─► Seen:     {}", counter.seen.load(Ordering::Relaxed));
    println!(" └─► Position: {}", registry.channel().position());
}
