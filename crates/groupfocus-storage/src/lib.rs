//! groupfocus Storage Layer
//!
//! SQLite-backed key/value settings used to persist the extension options.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
