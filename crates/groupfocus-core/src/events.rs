//! Signals delivered to the background runtime
//!
//! Host events request a reconciliation, runtime messages come from other
//! extension pages, lifecycle events come from the browser itself.

use serde::{Deserialize, Serialize};

use groupfocus_tabs::{Group, TabId, TabStatus, WindowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    TabActivated {
        tab_id: TabId,
        window_id: WindowId,
    },
    GroupUpdated {
        group: Group,
    },
    TabUpdated {
        tab_id: TabId,
        status: Option<TabStatus>,
    },
}

impl HostEvent {
    /// Whether this event should schedule a reconciliation pass.
    /// Tab updates only count once loading has completed.
    pub fn triggers_reconcile(&self) -> bool {
        match self {
            HostEvent::TabActivated { .. } | HostEvent::GroupUpdated { .. } => true,
            HostEvent::TabUpdated { status, .. } => *status == Some(TabStatus::Complete),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::TabActivated { .. } => "tab_activated",
            HostEvent::GroupUpdated { .. } => "group_updated",
            HostEvent::TabUpdated { .. } => "tab_updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuntimeMessage {
    OptionsUpdated,
}

impl RuntimeMessage {
    /// Parse a JSON message; messages of unknown type yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!(error = %e, raw = %raw, "Ignoring runtime message");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    UpdateAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Host(HostEvent),
    Message(RuntimeMessage),
    Lifecycle(LifecycleEvent),
}

impl From<HostEvent> for Signal {
    fn from(event: HostEvent) -> Self {
        Signal::Host(event)
    }
}

impl From<RuntimeMessage> for Signal {
    fn from(message: RuntimeMessage) -> Self {
        Signal::Message(message)
    }
}

impl From<LifecycleEvent> for Signal {
    fn from(event: LifecycleEvent) -> Self {
        Signal::Lifecycle(event)
    }
}
