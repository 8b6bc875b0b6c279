//! In-memory host
//!
//! Holds windows, tabs and groups in process memory and records every
//! collapse mutation it receives. Edit locks and per-window read failures can
//! be injected to simulate a user dragging tabs or a window closing mid-pass.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::HostError;
use crate::group::{Group, GroupId};
use crate::host::TabHost;
use crate::tab::{Tab, TabId, WindowId};
use crate::Result;

#[derive(Default)]
struct HostState {
    windows: BTreeSet<WindowId>,
    tabs: BTreeMap<TabId, Tab>,
    groups: BTreeMap<GroupId, Group>,
    /// Every successful `set_group_collapsed` call, in order
    mutations: Vec<(GroupId, bool)>,
    /// Number of upcoming mutations to refuse with `EditLocked`
    edit_locks: usize,
    /// Number of upcoming window listings to refuse with `EditLocked`
    listing_locks: usize,
    read_failures: HashMap<WindowId, HostError>,
}

impl HostState {
    fn check_readable(&self, window: WindowId) -> Result<()> {
        if let Some(err) = self.read_failures.get(&window) {
            return Err(err.clone());
        }
        if !self.windows.contains(&window) {
            return Err(HostError::WindowClosed(window));
        }
        Ok(())
    }
}

pub struct MemoryHost {
    state: Arc<RwLock<HostState>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(HostState::default())),
        }
    }

    pub fn open_window(&self, window: WindowId) {
        self.state.write().windows.insert(window);
    }

    /// Close a window together with its tabs and groups
    pub fn close_window(&self, window: WindowId) {
        let mut state = self.state.write();
        state.windows.remove(&window);
        state.tabs.retain(|_, tab| tab.window_id != window);
        state.groups.retain(|_, group| group.window_id != window);

        tracing::debug!(window_id = %window, "Closed window");
    }

    pub fn add_group(&self, group: Group) {
        let mut state = self.state.write();
        state.windows.insert(group.window_id);
        state.groups.insert(group.id, group);
    }

    /// Add a tab; an active tab deactivates the previous one in its window
    pub fn add_tab(&self, tab: Tab) {
        let mut state = self.state.write();
        state.windows.insert(tab.window_id);
        if tab.active {
            for other in state.tabs.values_mut() {
                if other.window_id == tab.window_id {
                    other.active = false;
                }
            }
        }
        state.tabs.insert(tab.id, tab);
    }

    pub fn activate_tab(&self, tab_id: TabId) -> Result<()> {
        let mut state = self.state.write();
        let window = state
            .tabs
            .get(&tab_id)
            .map(|tab| tab.window_id)
            .ok_or_else(|| HostError::Other(format!("No tab with id: {}", tab_id)))?;

        for tab in state.tabs.values_mut() {
            if tab.window_id == window {
                tab.active = tab.id == tab_id;
            }
        }

        tracing::debug!(tab_id = %tab_id, window_id = %window, "Activated tab");

        Ok(())
    }

    pub fn move_tab_to_group(&self, tab_id: TabId, group_id: Option<GroupId>) -> Result<()> {
        let mut state = self.state.write();
        let tab = state
            .tabs
            .get_mut(&tab_id)
            .ok_or_else(|| HostError::Other(format!("No tab with id: {}", tab_id)))?;
        tab.group_id = group_id;
        Ok(())
    }

    pub fn group(&self, group_id: GroupId) -> Option<Group> {
        self.state.read().groups.get(&group_id).cloned()
    }

    pub fn is_collapsed(&self, group_id: GroupId) -> Option<bool> {
        self.state.read().groups.get(&group_id).map(|g| g.collapsed)
    }

    /// Refuse the next `count` mutations with [`HostError::EditLocked`]
    pub fn lock_edits(&self, count: usize) {
        self.state.write().edit_locks = count;
    }

    /// Refuse the next `count` window listings with [`HostError::EditLocked`]
    pub fn lock_window_listing(&self, count: usize) {
        self.state.write().listing_locks = count;
    }

    /// Make every read of `window` fail with `error` until cleared
    pub fn fail_reads(&self, window: WindowId, error: HostError) {
        self.state.write().read_failures.insert(window, error);
    }

    pub fn clear_read_failure(&self, window: WindowId) {
        self.state.write().read_failures.remove(&window);
    }

    pub fn mutations(&self) -> Vec<(GroupId, bool)> {
        self.state.read().mutations.clone()
    }

    pub fn take_mutations(&self) -> Vec<(GroupId, bool)> {
        std::mem::take(&mut self.state.write().mutations)
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryHost {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl TabHost for MemoryHost {
    async fn windows(&self) -> Result<Vec<WindowId>> {
        let mut state = self.state.write();
        if state.listing_locks > 0 {
            state.listing_locks -= 1;
            return Err(HostError::EditLocked);
        }
        Ok(state.windows.iter().copied().collect())
    }

    async fn active_tab(&self, window: WindowId) -> Result<Option<Tab>> {
        let state = self.state.read();
        state.check_readable(window)?;
        Ok(state
            .tabs
            .values()
            .find(|tab| tab.window_id == window && tab.active)
            .cloned())
    }

    async fn groups(&self, window: WindowId) -> Result<Vec<Group>> {
        let state = self.state.read();
        state.check_readable(window)?;
        Ok(state
            .groups
            .values()
            .filter(|group| group.window_id == window)
            .cloned()
            .collect())
    }

    async fn tabs(&self, window: WindowId) -> Result<Vec<Tab>> {
        let state = self.state.read();
        state.check_readable(window)?;
        Ok(state
            .tabs
            .values()
            .filter(|tab| tab.window_id == window)
            .cloned()
            .collect())
    }

    async fn set_group_collapsed(&self, group_id: GroupId, collapsed: bool) -> Result<()> {
        let mut state = self.state.write();
        if state.edit_locks > 0 {
            state.edit_locks -= 1;
            return Err(HostError::EditLocked);
        }

        let group = state
            .groups
            .get_mut(&group_id)
            .ok_or(HostError::GroupNotFound(group_id))?;
        group.collapsed = collapsed;
        state.mutations.push((group_id, collapsed));

        Ok(())
    }
}
