//! Recall - Caller Memory Infrastructure
//!
//! Persistent caller recognition for voice AI agents: remembers returning
//! phone callers, keeps a bounded history of prior conversations, and renders
//! that history into a natural-language context block for the agent prompt.

pub mod context;
pub mod error;
pub mod identity;
pub mod jobs;
pub mod service;
pub mod storage;
pub mod types;

pub use error::{RecallError, Result};
pub use service::CallerMemoryService;
pub use storage::{MemoryStore, SqliteMemoryStore, Storage};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
