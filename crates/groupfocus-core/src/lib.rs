//! groupfocus Core
//!
//! Keeps every window's tab groups collapsed except the one holding the
//! active tab. Host events are debounced into reconciliation passes; each
//! pass reads a window, decides per group and applies only the changes.

mod applier;
mod background;
mod config;
mod debounce;
mod error;
mod events;
mod options;
mod policy;
mod reconcile;

pub use applier::apply;
pub use background::{Background, Exit};
pub use config::{Config, DEFAULT_DEBOUNCE_MS, DEFAULT_RETRY_DELAY_MS};
pub use debounce::Debouncer;
pub use error::CoreError;
pub use events::{HostEvent, LifecycleEvent, RuntimeMessage, Signal};
pub use options::{
    publish, MemoryOptions, Options, OptionsSource, OptionsStore, SettingsStore, SingleTabGroupMode,
};
pub use policy::{decide, Decision, Decisions};
pub use reconcile::{PassError, PassStage, Reconciler, RetryPolicy, WindowOutcome, WindowReport};

// Re-export the host model and storage
pub use groupfocus_storage::{Database, StorageError};
pub use groupfocus_tabs::{
    Group, GroupId, HostError, MemoryHost, Tab, TabHost, TabId, TabStatus, WindowId,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
