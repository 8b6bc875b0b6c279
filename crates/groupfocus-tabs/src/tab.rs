//! Tab data structure

use serde::{Deserialize, Serialize};

use crate::group::GroupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i32);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub window_id: WindowId,
    /// Owning group, `None` for ungrouped tabs
    pub group_id: Option<GroupId>,
    /// At most one tab per window is active
    pub active: bool,
}

impl Tab {
    pub fn new(id: TabId, window_id: WindowId) -> Self {
        Self {
            id,
            window_id,
            group_id: None,
            active: false,
        }
    }

    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }

    pub fn belongs_to(&self, group_id: GroupId) -> bool {
        self.group_id == Some(group_id)
    }
}

/// Loading status reported with tab update events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Unloaded,
    Loading,
    Complete,
}

impl TabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabStatus::Unloaded => "unloaded",
            TabStatus::Loading => "loading",
            TabStatus::Complete => "complete",
        }
    }
}

impl std::fmt::Display for TabStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TabStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unloaded" => Ok(TabStatus::Unloaded),
            "loading" => Ok(TabStatus::Loading),
            "complete" => Ok(TabStatus::Complete),
            _ => Err(format!("Unknown tab status: {}", s)),
        }
    }
}
