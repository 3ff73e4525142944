//! # Example: debug_hub
//!
//! Feed a simulated debug session through a `DebugHub`.
//!
//! Demonstrates how to:
//! - Subscribe command handlers to debugger lifecycle registries.
//! - Drive a `SessionTracker` the way a host debug adapter tracker would.
//! - Capture a value with the infer-type action and receive it on `infer_type_ts`.
//!
//! ## Flow
//! ```text
//! host                     hub                               handlers
//!  ├─ track(session) ───► session_created ─────────────────► "session started"
//!  ├─ on_did_send_message ► messages ──────────────────────► "stopped at breakpoint"
//!  ├─ infer_type_action.emit(req) ─forward─► infer_type_ts ─► "synthesize type"
//!  └─ on_exit(Some(0)) ──► session_ended ──────────────────► "session ended"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example debug_hub
//! ```

use std::path::PathBuf;

use chainbus::{DebugHub, InferTypeRequest, RegistryConfig, SessionInfo};
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let hub = DebugHub::new(RegistryConfig::default());

    // 1) Handlers
    hub.session_created()
        .on_fn(|s| println!("[session] started id={} type={}", s.id, s.kind));
    hub.messages().on_fn(|m| {
        if let Some(event) = m.event_name() {
            println!("[message] session={} event={event}", m.session.id);
        }
    });
    hub.infer_type_ts().on_fn(|req| {
        println!(
            "[infer] {}@{} shape={}",
            req.file_path.display(),
            req.offset,
            req.evaluated
        );
    });
    hub.session_ended()
        .on_fn(|end| println!("[session] ended id={} code={:?}", end.session.id, end.exit_code));

    // 2) Simulated adapter traffic
    let tracker = hub.track(SessionInfo::new("1", "Launch Program", "node"));
    tracker.on_did_send_message(json!({
        "seq": 4,
        "type": "event",
        "event": "stopped",
        "body": { "reason": "breakpoint", "threadId": 1 }
    }));

    // 3) Infer-type action (what the command handler emits after evaluating a selection)
    hub.infer_type_action().emit(InferTypeRequest {
        evaluated: json!({ "id": 1, "tags": ["a", "b"], "owner": { "name": "x" } }),
        file_path: PathBuf::from("src/app.ts"),
        offset: 120,
    });

    tracker.on_exit(Some(0));

    // 4) Drain everything and stop
    if let Err(err) = hub.shutdown().await {
        eprintln!("[hub] {}", err.as_message());
    }
}
