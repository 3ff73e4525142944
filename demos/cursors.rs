//! # Example: cursors
//!
//! Independent cursors over one `Channel`.
//!
//! Demonstrates how to:
//! - Attach cursors at different times and observe only what follows.
//! - Consume from spawned tasks while the producer emits.
//! - Close the channel so every consumer drains and stops.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► early = observe()        (sees 1, 2, 3)
//!   ├─► emit(1)
//!   ├─► late = observe()         (sees 2, 3)
//!   ├─► emit(2), emit(3)
//!   └─► close()  → both cursors return None after draining
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cursors
//! ```

use chainbus::Channel;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let channel = Channel::new();

    // 1) Attach the first consumer before anything is emitted
    let mut early = channel.observe();
    let early_task = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(v) = early.next().await {
            seen.push(v);
        }
        seen
    });

    channel.emit(1);

    // 2) Attach a second consumer: it will not see `1`
    let mut late = channel.observe();
    let late_task = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(v) = late.next().await {
            seen.push(v);
        }
        seen
    });

    channel.emit(2);
    channel.emit(3);

    // 3) Close: consumers drain what was emitted, then end
    channel.close();

    let early_seen = early_task.await.expect("early consumer panicked");
    let late_seen = late_task.await.expect("late consumer panicked");

    println!("early cursor: {early_seen:?}");
    println!("late cursor:  {late_seen:?}");
    println!("position:     {}", channel.position());
}
