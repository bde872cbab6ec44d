//! Core types for Recall

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a caller memory
pub type MemoryId = i64;

/// How long a caller memory stays alive after the last recognized call
pub const RETENTION_DAYS: i64 = 7;

/// Maximum number of conversation entries kept per caller (FIFO eviction)
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// Hard cap on summary length when rendered into the context block
pub const CONTEXT_SUMMARY_MAX_CHARS: usize = 100;

/// How many recent conversations the context block lists
pub const CONTEXT_HISTORY_ENTRIES: usize = 3;

/// One remembered caller, unique per (tenant, normalized phone)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerMemory {
    /// Unique identifier, assigned by the store
    pub id: MemoryId,
    /// Owning tenant; memories never cross tenant boundaries
    pub tenant_id: String,
    /// Normalized phone number used as the lookup key
    pub caller_phone: String,
    /// Caller name, set only via explicit profile update
    pub caller_name: Option<String>,
    /// Caller company, set only via explicit profile update
    pub caller_company: Option<String>,
    /// Timestamp of the most recent recognized call
    pub last_call_date: DateTime<Utc>,
    /// Number of recognized calls, incremented once per get-or-create hit
    pub call_count: i32,
    /// When the record expires; always last_call_date + RETENTION_DAYS
    pub expires_at: DateTime<Utc>,
    /// Bounded conversation history, oldest first
    #[serde(default)]
    pub conversation_history: Vec<ConversationEntry>,
    /// Free-text operator annotation, independent of history
    pub notes: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl CallerMemory {
    /// Append a conversation entry, evicting from the front once the
    /// history exceeds [`MAX_HISTORY_ENTRIES`]. Oldest entries go first.
    pub fn push_history(&mut self, entry: ConversationEntry) {
        self.conversation_history.push(entry);
        while self.conversation_history.len() > MAX_HISTORY_ENTRIES {
            self.conversation_history.remove(0);
        }
    }
}

/// A single prior conversation, embedded in its owning memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// When the conversation happened (server-assigned at append time)
    pub date: DateTime<Utc>,
    /// Short description of the conversation, never a full transcript
    pub summary: String,
    /// Topics discussed, in order
    #[serde(default)]
    pub topics: Vec<String>,
    /// Call duration in seconds
    #[serde(default)]
    pub duration_seconds: i64,
    /// Opaque structured payload for caller-specific intent data
    #[serde(default)]
    pub request_details: serde_json::Value,
}

/// Input for appending a conversation to a caller's history.
///
/// There is deliberately no date field: the entry date is always assigned by
/// the service at append time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewConversation {
    pub summary: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub duration_seconds: Option<i64>,
    pub request_details: Option<serde_json::Value>,
}

impl NewConversation {
    /// Build the entry that actually gets persisted, defaulting missing
    /// fields and stamping the server-side date.
    pub fn into_entry(self, date: DateTime<Utc>) -> ConversationEntry {
        ConversationEntry {
            date,
            summary: self
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "No summary recorded".to_string()),
            topics: self.topics,
            duration_seconds: self.duration_seconds.unwrap_or(0).max(0),
            request_details: self.request_details.unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Partial profile update; absent or empty fields leave the stored value
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerInfoUpdate {
    pub caller_name: Option<String>,
    pub caller_company: Option<String>,
    pub notes: Option<String>,
}

impl CallerInfoUpdate {
    /// True when no field would change anything
    pub fn is_empty(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map(str::trim).unwrap_or("").is_empty()
        }
        blank(&self.caller_name) && blank(&self.caller_company) && blank(&self.notes)
    }
}
