//! Options and the options store
//!
//! Options are persisted one settings key per field, named as the options
//! page writes them. The store keeps the latest successfully loaded snapshot;
//! readers get a copy, the refresh path is the only writer.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use groupfocus_storage::Database;

use crate::error::CoreError;
use crate::events::{RuntimeMessage, Signal};
use crate::Result;

const IGNORE_UNGROUPED_KEY: &str = "ignoreUngroupedTabs";
const SINGLE_TAB_GROUPS_KEY: &str = "preserveSingleTabGroups";

/// Handling of groups that hold exactly one tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SingleTabGroupMode {
    /// Treat like any other group
    Off,
    /// Never touch the collapsed flag
    #[default]
    KeepCurrent,
    /// Expand when collapsed, otherwise leave alone
    AlwaysExpanded,
}

impl SingleTabGroupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SingleTabGroupMode::Off => "off",
            SingleTabGroupMode::KeepCurrent => "keep-current",
            SingleTabGroupMode::AlwaysExpanded => "always-expanded",
        }
    }
}

impl std::fmt::Display for SingleTabGroupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SingleTabGroupMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(SingleTabGroupMode::Off),
            "keep-current" => Ok(SingleTabGroupMode::KeepCurrent),
            "always-expanded" => Ok(SingleTabGroupMode::AlwaysExpanded),
            _ => Err(format!("Unknown single tab group mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Skip windows whose active tab is not in a group
    #[serde(default = "default_ignore_ungrouped")]
    pub ignore_ungrouped_tabs: bool,
    #[serde(default)]
    pub preserve_single_tab_groups: SingleTabGroupMode,
}

fn default_ignore_ungrouped() -> bool {
    true
}

impl Options {
    /// Collapse every group that does not hold the active tab, no exceptions
    pub fn permissive() -> Self {
        Self {
            ignore_ungrouped_tabs: false,
            preserve_single_tab_groups: SingleTabGroupMode::Off,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ignore_ungrouped_tabs: default_ignore_ungrouped(),
            preserve_single_tab_groups: SingleTabGroupMode::default(),
        }
    }
}

/// Persistent home of the options record
pub trait OptionsSource: Send + Sync {
    fn load(&self) -> Result<Options>;

    fn save(&self, options: &Options) -> Result<()>;
}

/// Options stored in the settings table
pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl OptionsSource for SettingsStore {
    fn load(&self) -> Result<Options> {
        let mut options = Options::default();

        if let Some(value) = self.db.get_setting(IGNORE_UNGROUPED_KEY)? {
            options.ignore_ungrouped_tabs = match value.as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(CoreError::Options {
                        key: IGNORE_UNGROUPED_KEY.to_string(),
                        value,
                    })
                }
            };
        }

        if let Some(value) = self.db.get_setting(SINGLE_TAB_GROUPS_KEY)? {
            options.preserve_single_tab_groups = value.parse().map_err(|_| CoreError::Options {
                key: SINGLE_TAB_GROUPS_KEY.to_string(),
                value,
            })?;
        }

        Ok(options)
    }

    fn save(&self, options: &Options) -> Result<()> {
        let ignore = if options.ignore_ungrouped_tabs {
            "true"
        } else {
            "false"
        };
        self.db.set_settings(&[
            (IGNORE_UNGROUPED_KEY, ignore),
            (SINGLE_TAB_GROUPS_KEY, options.preserve_single_tab_groups.as_str()),
        ])?;
        Ok(())
    }
}

impl Clone for SettingsStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

/// Options held in memory only
pub struct MemoryOptions {
    options: RwLock<Options>,
}

impl MemoryOptions {
    pub fn new(options: Options) -> Self {
        Self {
            options: RwLock::new(options),
        }
    }
}

impl OptionsSource for MemoryOptions {
    fn load(&self) -> Result<Options> {
        Ok(*self.options.read())
    }

    fn save(&self, options: &Options) -> Result<()> {
        *self.options.write() = *options;
        Ok(())
    }
}

/// Latest-wins cell over an [`OptionsSource`]
pub struct OptionsStore {
    current: Arc<RwLock<Options>>,
    source: Arc<dyn OptionsSource>,
}

impl OptionsStore {
    /// Starts from the defaults; call [`OptionsStore::refresh`] to load.
    pub fn new(source: Arc<dyn OptionsSource>) -> Self {
        Self {
            current: Arc::new(RwLock::new(Options::default())),
            source,
        }
    }

    pub fn current(&self) -> Options {
        *self.current.read()
    }

    /// Reload from the source. A failed load keeps the last-known options.
    pub fn refresh(&self) -> Options {
        match self.source.load() {
            Ok(options) => {
                *self.current.write() = options;
                tracing::info!(
                    ignore_ungrouped_tabs = options.ignore_ungrouped_tabs,
                    preserve_single_tab_groups = %options.preserve_single_tab_groups,
                    "Options refreshed"
                );
                options
            }
            Err(e) => {
                let kept = self.current();
                tracing::warn!(error = %e, "Failed to load options, keeping last known");
                kept
            }
        }
    }
}

impl Clone for OptionsStore {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            source: Arc::clone(&self.source),
        }
    }
}

/// Persist `options` and tell the background runtime to pick them up
pub fn publish(
    source: &dyn OptionsSource,
    options: &Options,
    notify: &UnboundedSender<Signal>,
) -> Result<()> {
    source.save(options)?;

    if notify
        .send(Signal::Message(RuntimeMessage::OptionsUpdated))
        .is_err()
    {
        tracing::warn!("Options saved but the background runtime is not listening");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakySource {
        fail: AtomicBool,
        options: Options,
    }

    impl OptionsSource for FlakySource {
        fn load(&self) -> Result<Options> {
            if self.fail.load(Ordering::SeqCst) {
                Err(CoreError::Config("storage unavailable".to_string()))
            } else {
                Ok(self.options)
            }
        }

        fn save(&self, _options: &Options) -> Result<()> {
            Ok(())
        }
    }

    fn settings() -> (Database, SettingsStore) {
        let db = Database::open_in_memory().unwrap();
        let store = SettingsStore::new(db.clone());
        (db, store)
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.ignore_ungrouped_tabs);
        assert_eq!(
            options.preserve_single_tab_groups,
            SingleTabGroupMode::KeepCurrent
        );
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(Options::permissive()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ignoreUngroupedTabs": false, "preserveSingleTabGroups": "off"})
        );

        let partial: Options =
            serde_json::from_str(r#"{"preserveSingleTabGroups": "always-expanded"}"#).unwrap();
        assert!(partial.ignore_ungrouped_tabs);
        assert_eq!(
            partial.preserve_single_tab_groups,
            SingleTabGroupMode::AlwaysExpanded
        );
    }

    #[test]
    fn test_empty_settings_load_defaults() {
        let (_db, store) = settings();
        assert_eq!(store.load().unwrap(), Options::default());
    }

    #[test]
    fn test_missing_field_takes_default() {
        let (db, store) = settings();
        db.set_setting(SINGLE_TAB_GROUPS_KEY, "off").unwrap();

        let options = store.load().unwrap();
        assert!(options.ignore_ungrouped_tabs);
        assert_eq!(options.preserve_single_tab_groups, SingleTabGroupMode::Off);
    }

    #[test]
    fn test_save_then_load() {
        let (_db, store) = settings();
        let options = Options {
            ignore_ungrouped_tabs: false,
            preserve_single_tab_groups: SingleTabGroupMode::AlwaysExpanded,
        };
        store.save(&options).unwrap();
        assert_eq!(store.load().unwrap(), options);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let (db, store) = settings();
        db.set_setting(IGNORE_UNGROUPED_KEY, "maybe").unwrap();
        assert!(matches!(store.load(), Err(CoreError::Options { .. })));
    }

    #[test]
    fn test_refresh_replaces_wholesale() {
        let (db, store) = settings();
        let options = OptionsStore::new(Arc::new(store));
        assert_eq!(options.current(), Options::default());

        db.set_setting(IGNORE_UNGROUPED_KEY, "false").unwrap();
        db.set_setting(SINGLE_TAB_GROUPS_KEY, "off").unwrap();
        assert_eq!(options.refresh(), Options::permissive());
        assert_eq!(options.current(), Options::permissive());
    }

    #[test]
    fn test_failed_refresh_keeps_last_known() {
        let source = Arc::new(FlakySource {
            fail: AtomicBool::new(false),
            options: Options::permissive(),
        });
        let store = OptionsStore::new(source.clone());
        store.refresh();

        source.fail.store(true, Ordering::SeqCst);
        assert_eq!(store.refresh(), Options::permissive());
        assert_eq!(store.current(), Options::permissive());
    }

    #[test]
    fn test_failed_first_refresh_keeps_defaults() {
        let store = OptionsStore::new(Arc::new(FlakySource {
            fail: AtomicBool::new(true),
            options: Options::permissive(),
        }));
        assert_eq!(store.refresh(), Options::default());
    }

    #[test]
    fn test_publish_saves_and_notifies() {
        let (_db, store) = settings();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        publish(&store, &Options::permissive(), &tx).unwrap();

        assert_eq!(store.load().unwrap(), Options::permissive());
        assert!(matches!(
            rx.try_recv(),
            Ok(Signal::Message(RuntimeMessage::OptionsUpdated))
        ));
    }
}
