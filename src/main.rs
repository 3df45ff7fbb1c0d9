//! Scan engine daemon: loads configuration, opens the store, resurrects
//! unfinished jobs, and drains the scheduler until the process is stopped.
//!
//! This binary only runs the engine. It deliberately has no HTTP listener,
//! auth, or UI — those are external collaborators that enqueue jobs and
//! read results through `ScanStore`/`ScanQuery` directly.

use std::sync::Arc;

use scansuite::browser::BrowserWorker;
use scansuite::{EventBusConfig, ScanConfig, ScanStore, Scheduler, TaskEventBus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Arc::new(ScanConfig::from_env());
    let store = Arc::new(ScanStore::connect(config.database_url()).await?);
    let events = Arc::new(TaskEventBus::with_config(EventBusConfig::default()));

    let browser = if config.use_browser() {
        match BrowserWorker::launch(&config).await {
            Ok(worker) => Some(Arc::new(worker)),
            Err(e) => {
                log::warn!("browser launch failed, continuing with static fetches only: {e}");
                None
            }
        }
    } else {
        None
    };

    let scheduler = Scheduler::new(Arc::clone(&store), Arc::clone(&config), Arc::clone(&events), browser);
    scheduler.start().await?;

    log::info!("scan engine started, draining job queue");
    scheduler.drain().await;

    Ok(())
}
