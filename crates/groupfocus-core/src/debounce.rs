//! Trigger debouncer
//!
//! Owns at most one scheduled run. Every trigger aborts the scheduled run and
//! arms a new one, so a burst produces a single run once it has been quiet
//! for the full interval. The job itself runs on its own task: once started
//! it is never cancelled by later triggers.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub struct Debouncer {
    quiet: Duration,
    job: Job,
    /// Timer task of the scheduled run, if any
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new<F, Fut>(quiet: Duration, job: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            quiet,
            job: Arc::new(move || job().boxed()),
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    /// Request a run; replaces any run that has not started yet.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self) {
        let job = Arc::clone(&self.job);
        let quiet = self.quiet;

        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            // No await between the timer firing and the spawn, so an abort
            // can no longer reach the job.
            tokio::spawn(job());
        }));
    }

    /// Whether a run is scheduled and has not started yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Drop the scheduled run, if any
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
