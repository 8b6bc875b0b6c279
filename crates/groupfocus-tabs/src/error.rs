//! Host error types

use thiserror::Error;

use crate::group::GroupId;
use crate::tab::WindowId;

/// Message the browser reports while the user is dragging a tab.
const EDIT_LOCKED_MESSAGE: &str = "Tabs cannot be edited right now (user may be dragging a tab).";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Tabs cannot be edited right now (user may be dragging a tab)")]
    EditLocked,

    #[error("Window not found: {0}")]
    WindowClosed(WindowId),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Host error: {0}")]
    Other(String),
}

impl HostError {
    /// Classify an error string reported by the host.
    pub fn from_message(message: &str) -> Self {
        let message = message.trim();
        let message = message.strip_prefix("Error: ").unwrap_or(message);

        if message == EDIT_LOCKED_MESSAGE
            || message.starts_with("Tabs cannot be edited right now")
        {
            HostError::EditLocked
        } else if message.to_lowercase().contains("permission") {
            HostError::PermissionDenied(message.to_string())
        } else {
            HostError::Other(message.to_string())
        }
    }

    /// Transient errors clear on their own once the user interaction ends.
    pub fn is_transient(&self) -> bool {
        matches!(self, HostError::EditLocked)
    }
}
