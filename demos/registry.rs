//! # Example: registry
//!
//! Callback registration with `on` / `off` over a `Registry`.
//!
//! Demonstrates how to:
//! - Register closures and keep their handles for removal.
//! - Remove a callback from inside its own invocation.
//! - Survive a failing callback and read the failure report.
//! - Shut down and wait for in-flight async callbacks.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► on(printer), on(once), on(grumpy), on_async(slow)
//!   ├─► emit("a")  → printer, once (removes itself), grumpy (fails), slow (spawned)
//!   ├─► emit("b")  → printer, grumpy, slow
//!   └─► shutdown() → waits for slow handlers (up to `grace`), closes failure channel
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example registry
//! ```

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chainbus::{CallbackError, CallbackRef, Registry, RegistryConfig, try_from_fn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1) Configure the registry (failures are printed below instead of logged)
    let cfg = RegistryConfig {
        name: "demo",
        log_failures: false,
        grace: Duration::from_secs(1),
    };
    let registry = Registry::<String>::with_config(cfg);
    let mut failures = registry.failures();

    // 2) Plain closure
    registry.on_fn(|v| println!("[printer] {v}"));

    // 3) Closure that unregisters itself after the first value
    let me: Arc<OnceLock<CallbackRef<String>>> = Arc::new(OnceLock::new());
    let once = {
        let weak = registry.downgrade();
        let me = Arc::clone(&me);
        registry.on_fn(move |v| {
            println!("[once] {v} (removing myself)");
            if let (Some(reg), Some(me)) = (weak.upgrade(), me.get()) {
                reg.off(me);
            }
        })
    };
    let _ = me.set(once);

    // 4) Fallible closure
    registry.on(try_from_fn(|v: &String| {
        Err(CallbackError::failed(format!("refusing {v:?}")))
    }));

    // 5) Async closure: spawned, never blocks the loop
    registry.on_async(|v: String| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        println!("[slow] {v}");
        Ok(())
    });

    registry.emit("a".to_string());
    registry.emit("b".to_string());

    // 6) Stop, wait for the slow handlers, then print failures
    if let Err(err) = registry.shutdown().await {
        println!("[shutdown] {}", err.as_message());
    }
    while let Some(f) = failures.next().await {
        println!(
            "[failure] registry={} callback={} position={} {}",
            f.registry, f.callback, f.position, f.error
        );
    }
    println!("callbacks left: {}", registry.len());
}
