//! Background runtime
//!
//! Wires the listeners: host events feed the debouncer, `optionsUpdated`
//! refreshes the options store, an available update asks the embedder to
//! restart the process. Meant to run on a current-thread runtime.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use groupfocus_storage::Database;
use groupfocus_tabs::TabHost;

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::events::{HostEvent, LifecycleEvent, RuntimeMessage, Signal};
use crate::options::{OptionsStore, SettingsStore};
use crate::reconcile::{Reconciler, RetryPolicy};
use crate::Result;

/// Why [`Background::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// A new version is installed; the embedder should restart
    RestartRequested,
    /// Every signal sender was dropped
    SignalsClosed,
}

pub struct Background {
    reconciler: Reconciler,
    debouncer: Debouncer,
    options: OptionsStore,
}

impl Background {
    pub fn new(host: Arc<dyn TabHost>, options: OptionsStore, config: &Config) -> Self {
        let reconciler = Reconciler::new(host, options.clone(), RetryPolicy::from_config(config));

        let job = reconciler.clone();
        let debouncer = Debouncer::new(config.debounce(), move || {
            let reconciler = job.clone();
            async move {
                reconciler.run_all().await;
            }
        });

        Self {
            reconciler,
            debouncer,
            options,
        }
    }

    /// Open the settings database from `config` and load the stored options
    pub fn open(host: Arc<dyn TabHost>, config: &Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        let options = OptionsStore::new(Arc::new(SettingsStore::new(db)));
        options.refresh();

        tracing::info!(
            database = %config.database_path.display(),
            debounce_ms = config.debounce_ms,
            "Background runtime ready"
        );

        Ok(Self::new(host, options, config))
    }

    pub fn options(&self) -> &OptionsStore {
        &self.options
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Returns whether the event scheduled a reconciliation
    pub fn handle_host_event(&self, event: &HostEvent) -> bool {
        if !event.triggers_reconcile() {
            tracing::trace!(event = event.name(), "Ignoring host event");
            return false;
        }

        tracing::trace!(event = event.name(), "Scheduling reconciliation");
        self.debouncer.trigger();
        true
    }

    pub fn handle_message(&self, message: RuntimeMessage) {
        match message {
            RuntimeMessage::OptionsUpdated => {
                self.options.refresh();
            }
        }
    }

    /// Handle one signal; `Some` means the runtime should stop
    pub fn handle(&self, signal: Signal) -> Option<Exit> {
        match signal {
            Signal::Host(event) => {
                self.handle_host_event(&event);
                None
            }
            Signal::Message(message) => {
                self.handle_message(message);
                None
            }
            Signal::Lifecycle(LifecycleEvent::UpdateAvailable) => {
                tracing::info!("Update available, requesting restart");
                self.debouncer.cancel();
                Some(Exit::RestartRequested)
            }
        }
    }

    pub async fn run(&self, mut signals: UnboundedReceiver<Signal>) -> Exit {
        while let Some(signal) = signals.recv().await {
            if let Some(exit) = self.handle(signal) {
                return exit;
            }
        }

        tracing::info!("Signal channel closed");
        Exit::SignalsClosed
    }
}
