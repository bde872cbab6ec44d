//! Storage engine for Recall
//!
//! Defines the `MemoryStore` contract the service depends on, plus the
//! SQLite reference implementation (connection handling, migrations,
//! queries).

mod backend;
mod connection;
mod migrations;
pub mod queries;
mod sqlite_backend;

pub use backend::MemoryStore;
pub use connection::Storage;
pub use sqlite_backend::SqliteMemoryStore;
