//! groupfocus Tab Model
//!
//! Host-owned windows, tabs and tab groups as the reconciler sees them,
//! and the asynchronous surface used to read them and toggle group collapse.

mod error;
mod group;
mod host;
mod memory;
mod tab;

pub use error::HostError;
pub use group::{Group, GroupId};
pub use host::TabHost;
pub use memory::MemoryHost;
pub use tab::{Tab, TabId, TabStatus, WindowId};

pub type Result<T> = std::result::Result<T, HostError>;
