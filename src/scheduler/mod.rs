//! Job Scheduler: a bounded-concurrency queue of jobs, resurrecting
//! unfinished work on startup and handing each job to a [`JobExecutor`]
//! (spec.md §4.6).

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::{Mutex, Notify, Semaphore};
use tokio::task::JoinSet;

use crate::browser::BrowserWorker;
use crate::config::ScanConfig;
use crate::error::ScanResult;
use crate::events::TaskEventBus;
use crate::executor::JobExecutor;
use crate::store::ScanStore;

/// Snapshot of the scheduler's queue and in-flight set, for diagnostics and
/// tests.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    pub queued: Vec<String>,
    pub running: Vec<String>,
}

/// Owns the job queue and the handles every running job needs. Cheap to
/// clone (every field is an `Arc`), so a clone can be handed to a
/// long-running `drain` task while the original stays with whatever wires
/// up HTTP-level `enqueue`/`cancel` calls.
#[derive(Clone)]
pub struct Scheduler {
    store: Arc<ScanStore>,
    config: Arc<ScanConfig>,
    events: Arc<TaskEventBus>,
    browser: Option<Arc<BrowserWorker>>,
    semaphore: Arc<Semaphore>,
    queue: Arc<Mutex<VecDeque<String>>>,
    running: Arc<DashSet<String>>,
    cancel_requested: Arc<DashSet<String>>,
    notify: Arc<Notify>,
}

impl Scheduler {
    #[must_use]
    pub fn new(
        store: Arc<ScanStore>,
        config: Arc<ScanConfig>,
        events: Arc<TaskEventBus>,
        browser: Option<Arc<BrowserWorker>>,
    ) -> Self {
        let concurrency = config.max_concurrency();
        Self {
            store,
            config,
            events,
            browser,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            running: Arc::new(DashSet::new()),
            cancel_requested: Arc::new(DashSet::new()),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Load every `pending`/`running` job from the store into the queue.
    /// Call once at process startup before [`Self::drain`], so jobs
    /// in-flight when the process last stopped get picked back up.
    pub async fn start(&self) -> ScanResult<()> {
        let unfinished = self.store.jobs().list_unfinished().await?;
        let mut queue = self.queue.lock().await;
        for job in unfinished {
            if !self.running.contains(&job.id) && !queue.contains(&job.id) {
                queue.push_back(job.id);
            }
        }
        drop(queue);
        self.notify.notify_one();
        Ok(())
    }

    /// Queue `job_id` for execution. Publishes the `queued` event
    /// immediately; the job transitions to `running` once a worker slot
    /// frees up.
    pub async fn enqueue(&self, job_id: String) {
        let _ = self
            .events
            .publish(&self.store, &job_id, crate::events::TaskEventKind::Queued, serde_json::json!({}))
            .await;
        self.queue.lock().await.push_back(job_id);
        self.notify.notify_one();
    }

    /// Request cancellation of `job_id`. Cooperative: the running
    /// executor/crawler observes this between pages, not mid-fetch.
    pub fn cancel(&self, job_id: &str) {
        self.cancel_requested.insert(job_id.to_string());
    }

    #[must_use]
    pub fn is_cancel_requested(&self, job_id: &str) -> bool {
        self.cancel_requested.contains(job_id)
    }

    #[must_use]
    pub async fn state(&self) -> SchedulerState {
        let queued = self.queue.lock().await.iter().cloned().collect();
        let running = self.running.iter().map(|r| r.clone()).collect();
        SchedulerState { queued, running }
    }

    /// Drain the queue, running up to `max_concurrency` jobs at once, until
    /// it's empty and every in-flight job has finished. New jobs enqueued by
    /// another task while this runs are picked up too; call this from a
    /// single long-lived background task (see `main.rs`).
    pub async fn drain(&self) {
        let mut tasks = JoinSet::new();

        loop {
            let next = self.queue.lock().await.pop_front();
            let Some(job_id) = next else {
                if tasks.is_empty() {
                    break;
                }
                tasks.join_next().await;
                continue;
            };

            let job = match self.store.jobs().get(&job_id).await {
                Ok(Some(job)) => job,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("could not load job {job_id} from store: {e}");
                    continue;
                }
            };

            let permit = Arc::clone(&self.semaphore).acquire_owned().await.expect("semaphore is never closed");
            self.running.insert(job_id.clone());

            let store = Arc::clone(&self.store);
            let config = Arc::clone(&self.config);
            let events = Arc::clone(&self.events);
            let browser = self.browser.clone();
            let running = Arc::clone(&self.running);
            let cancel_requested = Arc::clone(&self.cancel_requested);
            let finished_job_id = job_id.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let executor = JobExecutor::new(&store, &config, &events, browser.as_deref());
                let cancel_id = finished_job_id.clone();
                let is_cancelled = move || cancel_requested.contains(&cancel_id);
                if let Err(e) = executor.run(&job, is_cancelled).await {
                    log::warn!("job {} ended with error: {e}", job.id);
                }
                running.remove(&finished_job_id);
            });
        }
    }
}
