//! # Example: cancel
//!
//! Demonstrates cancelling a stepped task and intercepting the cancellation.
//!
//! Shows how to:
//! - Launch tasks through a [`Monitor`] so their events reach subscribers
//! - Cancel a suspended computation with [`Task::cancel`]
//! - Run cleanup at the suspension point and replace the outcome
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► Monitor::new(cfg, subs)
//!   ├─► spawn "counter"  (suspends forever)
//!   ├─► spawn "rollback" (handles the interrupt, resolves anyway)
//!   ├─► spawn "constant" (immediate: cancel is a no-op)
//!   ├─► let the runtime turn a few times
//!   ├─► cancel all three
//!   │     ├─ counter   ──► Err(Canceled)
//!   │     ├─ rollback  ──► Ok("rolled back")
//!   │     └─ constant  ──► Ok(7)
//!   └─► monitor.shutdown()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cancel --features logging
//! ```

use std::sync::Arc;

use tasklet::{Config, Monitor, Run, StepContext, Subscribe, Task, TaskError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== cancel example ===\n");

    // 1. Optional: add subscriber to see events (requires "logging" feature)
    #[cfg(feature = "logging")]
    let subs: Vec<Arc<dyn Subscribe>> = {
        use tasklet::LogWriter;
        vec![Arc::new(LogWriter)]
    };
    #[cfg(not(feature = "logging"))]
    let subs: Vec<Arc<dyn Subscribe>> = Vec::new();

    let cfg = Config {
        publish_steps: true,
        ..Config::default()
    };
    let monitor = Monitor::new(cfg, subs)?;

    // 2. Counts until cancelled.
    let counter: Task<u64> = monitor.spawn("counter", || {
        Ok(Run::from_async(|cx: StepContext| async move {
            let mut ticks = 0_u64;
            loop {
                if let Err(e) = cx.suspend().await {
                    println!("[counter] cancelled after {ticks} ticks");
                    return Err(e);
                }
                ticks += 1;
            }
        }))
    })?;

    // 3. Intercepts the cancellation, cleans up over one more step and resolves.
    let rollback = monitor.spawn("rollback", || {
        Ok(Run::from_async(|cx: StepContext| async move {
            loop {
                if cx.suspend().await.is_err() {
                    println!("[rollback] undoing partial work");
                    cx.suspend().await?;
                    return Ok::<_, TaskError>("rolled back");
                }
            }
        }))
    })?;

    // 4. Settled at construction.
    let constant = monitor.spawn("constant", || Ok(Run::value(7)))?;

    for _ in 0..3 {
        tokio::task::yield_now().await;
    }

    counter.cancel();
    rollback.cancel();
    constant.cancel();

    println!("[main] counter  -> {:?}", counter.await);
    println!("[main] rollback -> {:?}", rollback.await);
    println!("[main] constant -> {:?}", constant.await);

    monitor.shutdown().await;
    println!("\n=== done ===");
    Ok(())
}
