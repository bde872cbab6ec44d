//! Caller memory service
//!
//! Best-effort by design: memory is an enhancement to call handling, never a
//! prerequisite. Every public operation degrades to `None` (or `0` for the
//! sweep) on failure, with a log line; absence of memory must be
//! indistinguishable, caller-facing, from a genuinely new caller.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::identity::normalize_phone;
use crate::storage::MemoryStore;
use crate::types::{CallerInfoUpdate, CallerMemory, MemoryId, NewConversation};

/// Service owning get-or-create, profile updates, history appends and the
/// expiry sweep. Constructed explicitly with its store collaborator; no
/// process-wide singleton.
pub struct CallerMemoryService {
    store: Arc<dyn MemoryStore>,
}

impl CallerMemoryService {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    /// Recognize an inbound call: returns the caller's memory, creating it
    /// on first contact and bumping call_count/recency/expiry on every hit.
    ///
    /// Returns `None` when the phone cannot be normalized (no record is
    /// created) or on store failure. Callers proceed without memory context
    /// in both cases.
    pub fn get_or_create(&self, tenant_id: &str, raw_phone: &str) -> Option<CallerMemory> {
        let phone = match normalize_phone(raw_phone) {
            Some(p) => p,
            None => {
                tracing::debug!(
                    "Unresolvable caller identity for tenant {}; skipping memory lookup",
                    tenant_id
                );
                return None;
            }
        };

        match self.store.record_call(tenant_id, &phone, Utc::now()) {
            Ok(memory) => Some(memory),
            Err(e) => {
                tracing::error!(
                    "Failed to record call for tenant {} phone {}: {}",
                    tenant_id,
                    phone,
                    e
                );
                None
            }
        }
    }

    /// Apply an explicit profile update. Only supplied fields are written;
    /// absent or empty fields never overwrite stored values.
    pub fn update_caller_info(
        &self,
        id: MemoryId,
        update: CallerInfoUpdate,
    ) -> Option<CallerMemory> {
        match self.store.update_profile(id, &update) {
            Ok(Some(memory)) => Some(memory),
            Ok(None) => {
                tracing::warn!("Profile update for missing caller memory {}", id);
                None
            }
            Err(e) => {
                tracing::error!("Failed to update caller memory {}: {}", id, e);
                None
            }
        }
    }

    /// Append a conversation summary to a caller's history, evicting the
    /// oldest entries beyond the bound. The entry date is server-assigned;
    /// last_call_date and call_count are not touched here.
    pub fn add_conversation(&self, id: MemoryId, input: NewConversation) -> Option<CallerMemory> {
        let mut memory = match self.store.get(id) {
            Ok(Some(m)) => m,
            Ok(None) => {
                // Stale or expired references are expected, not errors
                tracing::warn!("Conversation append for missing caller memory {}", id);
                return None;
            }
            Err(e) => {
                tracing::error!("Failed to load caller memory {}: {}", id, e);
                return None;
            }
        };

        memory.push_history(input.into_entry(Utc::now()));

        match self.store.replace_history(id, &memory.conversation_history) {
            Ok(Some(updated)) => Some(updated),
            Ok(None) => {
                tracing::warn!("Caller memory {} vanished during history append", id);
                None
            }
            Err(e) => {
                tracing::error!("Failed to persist history for caller memory {}: {}", id, e);
                None
            }
        }
    }

    /// Delete every memory past its expiry; returns the count deleted.
    ///
    /// On store error this logs and returns 0; a failed sweep simply retries
    /// on the next scheduled run.
    pub fn clean_expired(&self) -> i64 {
        match self.try_clean_expired() {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!("Expiry sweep failed: {}", e);
                0
            }
        }
    }

    /// Error-propagating variant of the sweep, for the manual trigger path
    /// where an operator is watching.
    pub fn try_clean_expired(&self) -> Result<i64> {
        let deleted = self.store.delete_expired(Utc::now())?;
        if deleted > 0 {
            tracing::info!("Expiry sweep removed {} caller memories", deleted);
        }
        Ok(deleted)
    }
}
