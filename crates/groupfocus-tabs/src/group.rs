//! Tab group data structure

use serde::{Deserialize, Serialize};

use crate::tab::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i32);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub window_id: WindowId,
    pub collapsed: bool,
}

impl Group {
    pub fn new(id: GroupId, window_id: WindowId, collapsed: bool) -> Self {
        Self {
            id,
            window_id,
            collapsed,
        }
    }
}
