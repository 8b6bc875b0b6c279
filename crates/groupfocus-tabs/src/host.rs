//! Host query/mutate surface

use async_trait::async_trait;

use crate::group::{Group, GroupId};
use crate::tab::{Tab, WindowId};
use crate::Result;

/// The browser as seen by the reconciler.
///
/// Every call may suspend and may fail with a [`crate::HostError`]. The
/// reconciler only ever reads tabs and toggles the collapsed flag of groups
/// it has just read.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// All open windows.
    async fn windows(&self) -> Result<Vec<WindowId>>;

    /// The active tab of a window, if it has one.
    async fn active_tab(&self, window: WindowId) -> Result<Option<Tab>>;

    /// Groups currently in a window.
    async fn groups(&self, window: WindowId) -> Result<Vec<Group>>;

    /// Tabs currently in a window.
    async fn tabs(&self, window: WindowId) -> Result<Vec<Tab>>;

    async fn set_group_collapsed(&self, group: GroupId, collapsed: bool) -> Result<()>;
}
