//! Reconciliation driver
//!
//! One pass per window:
//! ```text
//! ReadingActiveTab
//!   ↓
//! ReadingGroups + ReadingTabs (concurrent)
//!   ↓
//! Deciding (options read here)
//!   ↓
//! Applying
//!   ↓
//! Done
//! ```
//! An edit lock at any stage restarts that window's pass after the retry
//! delay; any other failure ends the pass. Windows never wait on each other.

use futures_util::future::{join_all, try_join};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use groupfocus_tabs::{HostError, TabHost, WindowId};

use crate::applier;
use crate::config::{Config, DEFAULT_RETRY_DELAY_MS};
use crate::options::OptionsStore;
use crate::policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStage {
    ReadingActiveTab,
    ReadingGroups,
    ReadingTabs,
    Applying,
}

impl PassStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassStage::ReadingActiveTab => "reading_active_tab",
            PassStage::ReadingGroups => "reading_groups",
            PassStage::ReadingTabs => "reading_tabs",
            PassStage::Applying => "applying",
        }
    }
}

impl std::fmt::Display for PassStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Pass failed while {stage}: {source}")]
pub struct PassError {
    pub stage: PassStage,
    #[source]
    pub source: HostError,
}

impl PassError {
    fn at(stage: PassStage) -> impl FnOnce(HostError) -> PassError {
        move |source| PassError { stage, source }
    }

    pub fn is_transient(&self) -> bool {
        self.source.is_transient()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// Pass completed; `mutations` groups changed
    Reconciled { mutations: usize },
    /// Edit lock hit; a fresh pass is scheduled
    RetryScheduled,
    /// Terminal failure at `stage`, logged
    Failed { stage: PassStage },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowReport {
    pub window: WindowId,
    pub outcome: WindowOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// `None` keeps retrying for as long as the host stays locked
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            delay: config.retry_delay(),
            max_attempts: config.max_transient_retries,
        }
    }

    fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_attempts: None,
        }
    }
}

pub struct Reconciler {
    host: Arc<dyn TabHost>,
    options: OptionsStore,
    retry: RetryPolicy,
}

impl Reconciler {
    pub fn new(host: Arc<dyn TabHost>, options: OptionsStore, retry: RetryPolicy) -> Self {
        Self {
            host,
            options,
            retry,
        }
    }

    /// Reconcile every open window
    pub async fn run_all(&self) -> Vec<WindowReport> {
        let windows = match self.host.windows().await {
            Ok(windows) => windows,
            Err(e) if e.is_transient() => {
                tracing::debug!(error = %e, "Window list locked, retrying run");
                self.schedule_full_retry();
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list windows");
                return Vec::new();
            }
        };

        tracing::debug!(windows = windows.len(), "Starting reconciliation");

        join_all(windows.into_iter().map(|window| async move {
            WindowReport {
                window,
                outcome: self.reconcile_window(window).await,
            }
        }))
        .await
    }

    /// Run one pass over `window`, scheduling a retry on an edit lock
    pub async fn reconcile_window(&self, window: WindowId) -> WindowOutcome {
        match self.pass(window).await {
            Ok(mutations) => WindowOutcome::Reconciled { mutations },
            Err(e) if e.is_transient() => {
                tracing::debug!(
                    window_id = %window,
                    stage = %e.stage,
                    "Edit locked, retrying pass"
                );
                self.schedule_retry(window);
                WindowOutcome::RetryScheduled
            }
            Err(e) => {
                tracing::error!(
                    window_id = %window,
                    stage = %e.stage,
                    error = %e.source,
                    "Reconciliation pass failed"
                );
                WindowOutcome::Failed { stage: e.stage }
            }
        }
    }

    async fn pass(&self, window: WindowId) -> Result<usize, PassError> {
        let host = self.host.as_ref();

        let active_tab = host
            .active_tab(window)
            .await
            .map_err(PassError::at(PassStage::ReadingActiveTab))?;

        let (groups, tabs) = try_join(
            async {
                host.groups(window)
                    .await
                    .map_err(PassError::at(PassStage::ReadingGroups))
            },
            async {
                host.tabs(window)
                    .await
                    .map_err(PassError::at(PassStage::ReadingTabs))
            },
        )
        .await?;

        let options = self.options.current();
        let decisions = policy::decide(&groups, &tabs, active_tab.as_ref(), &options);
        if decisions.is_noop() {
            tracing::trace!(
                window_id = %window,
                groups = groups.len(),
                "Window already settled"
            );
            return Ok(0);
        }

        let applied = applier::apply(host, window, &decisions)
            .await
            .map_err(PassError::at(PassStage::Applying))?;

        tracing::info!(window_id = %window, mutations = applied, "Reconciled window");

        Ok(applied)
    }

    /// Restart `window`'s pass after the retry delay, for as long as it stays locked
    fn schedule_retry(&self, window: WindowId) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut attempt = 1;
            while this.retry.allows(attempt) {
                tokio::time::sleep(this.retry.delay).await;
                match this.pass(window).await {
                    Ok(_) => return,
                    Err(e) if e.is_transient() => {
                        tracing::debug!(
                            window_id = %window,
                            attempt,
                            stage = %e.stage,
                            "Still edit locked"
                        );
                        attempt += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            window_id = %window,
                            stage = %e.stage,
                            error = %e.source,
                            "Retried pass failed"
                        );
                        return;
                    }
                }
            }
            tracing::warn!(
                window_id = %window,
                attempts = attempt - 1,
                "Giving up on locked window"
            );
        });
    }

    /// Retry listing windows after the retry delay, then reconcile each one
    fn schedule_full_retry(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut attempt = 1;
            while this.retry.allows(attempt) {
                tokio::time::sleep(this.retry.delay).await;
                match this.host.windows().await {
                    Ok(windows) => {
                        for window in windows {
                            let pass = this.clone();
                            tokio::spawn(async move {
                                pass.reconcile_window(window).await;
                            });
                        }
                        return;
                    }
                    Err(e) if e.is_transient() => attempt += 1,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to list windows on retry");
                        return;
                    }
                }
            }
            tracing::warn!(attempts = attempt - 1, "Giving up on listing windows");
        });
    }
}

impl Clone for Reconciler {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            options: self.options.clone(),
            retry: self.retry,
        }
    }
}
