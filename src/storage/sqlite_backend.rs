//! SQLite implementation of the `MemoryStore` contract

use chrono::{DateTime, Utc};

use super::backend::MemoryStore;
use super::connection::Storage;
use super::queries;
use crate::error::Result;
use crate::types::{CallerInfoUpdate, CallerMemory, ConversationEntry, MemoryId};

/// `MemoryStore` backed by the shared SQLite connection
pub struct SqliteMemoryStore {
    storage: Storage,
}

impl SqliteMemoryStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Convenience constructor for tests
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Storage::open_in_memory()?))
    }

    /// Access the underlying storage (monitoring, CLI)
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl MemoryStore for SqliteMemoryStore {
    fn record_call(
        &self,
        tenant_id: &str,
        caller_phone: &str,
        now: DateTime<Utc>,
    ) -> Result<CallerMemory> {
        self.storage
            .with_connection(|conn| queries::record_call(conn, tenant_id, caller_phone, now))
    }

    fn get(&self, id: MemoryId) -> Result<Option<CallerMemory>> {
        self.storage.with_connection(|conn| queries::get_memory(conn, id))
    }

    fn find_by_key(&self, tenant_id: &str, caller_phone: &str) -> Result<Option<CallerMemory>> {
        self.storage
            .with_connection(|conn| queries::find_by_key(conn, tenant_id, caller_phone))
    }

    fn update_profile(
        &self,
        id: MemoryId,
        update: &CallerInfoUpdate,
    ) -> Result<Option<CallerMemory>> {
        self.storage
            .with_connection(|conn| queries::update_profile(conn, id, update))
    }

    fn replace_history(
        &self,
        id: MemoryId,
        history: &[ConversationEntry],
    ) -> Result<Option<CallerMemory>> {
        self.storage
            .with_connection(|conn| queries::replace_history(conn, id, history))
    }

    fn delete_expired(&self, now: DateTime<Utc>) -> Result<i64> {
        self.storage
            .with_connection(|conn| queries::delete_expired(conn, now))
    }
}
