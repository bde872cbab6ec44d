//! Memory store contract
//!
//! The service depends on this trait rather than on SQLite directly, so the
//! underlying engine can be swapped (or faked in tests) without touching the
//! application logic. Implementations must make `record_call` atomic with
//! respect to the (tenant, phone) unique key; the service never compensates
//! with read-then-write.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{CallerInfoUpdate, CallerMemory, ConversationEntry, MemoryId};

/// Keyed persistent store for caller memories
pub trait MemoryStore: Send + Sync {
    /// Atomic upsert by (tenant, phone): create with call_count = 1 or bump
    /// the counter and refresh recency/expiry. Returns the post-write row.
    fn record_call(
        &self,
        tenant_id: &str,
        caller_phone: &str,
        now: DateTime<Utc>,
    ) -> Result<CallerMemory>;

    /// Fetch by id
    fn get(&self, id: MemoryId) -> Result<Option<CallerMemory>>;

    /// Fetch by the unique (tenant, phone) key
    fn find_by_key(&self, tenant_id: &str, caller_phone: &str) -> Result<Option<CallerMemory>>;

    /// Partial profile update; `None` when the row is absent
    fn update_profile(
        &self,
        id: MemoryId,
        update: &CallerInfoUpdate,
    ) -> Result<Option<CallerMemory>>;

    /// Replace the embedded history wholesale; `None` when the row is absent
    fn replace_history(
        &self,
        id: MemoryId,
        history: &[ConversationEntry],
    ) -> Result<Option<CallerMemory>>;

    /// Bulk-delete every row with `expires_at` strictly before `now`;
    /// returns the number deleted
    fn delete_expired(&self, now: DateTime<Utc>) -> Result<i64>;
}
