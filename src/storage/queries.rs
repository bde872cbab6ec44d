//! Database queries for caller memory operations

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, Row};

use crate::error::Result;
use crate::types::{
    CallerInfoUpdate, CallerMemory, ConversationEntry, MemoryId, RETENTION_DAYS,
};

const COLUMNS: &str = "id, tenant_id, caller_phone, caller_name, caller_company, \
     last_call_date, call_count, expires_at, conversation_history, notes, \
     created_at, updated_at";

/// Parse a caller memory from a database row
pub fn memory_from_row(row: &Row) -> rusqlite::Result<CallerMemory> {
    let id: i64 = row.get("id")?;
    let history_json: String = row.get("conversation_history")?;

    // History is decoded leniently: a corrupt blob loses history, not the
    // whole record.
    let conversation_history: Vec<ConversationEntry> = serde_json::from_str(&history_json)
        .unwrap_or_else(|e| {
            tracing::warn!("Undecodable conversation history for memory {}: {}", id, e);
            vec![]
        });

    Ok(CallerMemory {
        id,
        tenant_id: row.get("tenant_id")?,
        caller_phone: row.get("caller_phone")?,
        caller_name: row.get("caller_name")?,
        caller_company: row.get("caller_company")?,
        last_call_date: parse_timestamp(row.get::<_, String>("last_call_date")?),
        call_count: row.get("call_count")?,
        expires_at: parse_timestamp(row.get::<_, String>("expires_at")?),
        conversation_history,
        notes: row.get("notes")?,
        created_at: parse_timestamp(row.get::<_, String>("created_at")?),
        updated_at: parse_timestamp(row.get::<_, String>("updated_at")?),
    })
}

fn parse_timestamp(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Record a recognized call: atomic upsert on (tenant_id, caller_phone).
///
/// Creates the row with call_count = 1, or bumps call_count and refreshes
/// recency on conflict. Both paths set last_call_date = now and push
/// expires_at out by the retention window. The unique constraint plus the
/// conflict clause is what makes two near-simultaneous calls from the same
/// number converge on one row with no lost increment; there is no
/// read-then-write sequence here.
pub fn record_call(
    conn: &Connection,
    tenant_id: &str,
    caller_phone: &str,
    now: DateTime<Utc>,
) -> Result<CallerMemory> {
    let now_str = now.to_rfc3339();
    let expires_at = (now + Duration::days(RETENTION_DAYS)).to_rfc3339();

    let sql = format!(
        "INSERT INTO caller_memories
             (tenant_id, caller_phone, last_call_date, call_count, expires_at,
              conversation_history, created_at, updated_at)
         VALUES (?1, ?2, ?3, 1, ?4, '[]', ?3, ?3)
         ON CONFLICT(tenant_id, caller_phone) DO UPDATE SET
             call_count = call_count + 1,
             last_call_date = excluded.last_call_date,
             expires_at = excluded.expires_at,
             updated_at = excluded.updated_at
         RETURNING {}",
        COLUMNS
    );

    let mut stmt = conn.prepare_cached(&sql)?;
    let memory = stmt.query_row(
        params![tenant_id, caller_phone, now_str, expires_at],
        memory_from_row,
    )?;

    Ok(memory)
}

/// Get a caller memory by id
pub fn get_memory(conn: &Connection, id: MemoryId) -> Result<Option<CallerMemory>> {
    let sql = format!("SELECT {} FROM caller_memories WHERE id = ?", COLUMNS);
    let mut stmt = conn.prepare_cached(&sql)?;

    match stmt.query_row(params![id], memory_from_row) {
        Ok(memory) => Ok(Some(memory)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find a caller memory by its unique (tenant, phone) key
pub fn find_by_key(
    conn: &Connection,
    tenant_id: &str,
    caller_phone: &str,
) -> Result<Option<CallerMemory>> {
    let sql = format!(
        "SELECT {} FROM caller_memories WHERE tenant_id = ? AND caller_phone = ?",
        COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql)?;

    match stmt.query_row(params![tenant_id, caller_phone], memory_from_row) {
        Ok(memory) => Ok(Some(memory)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Partial profile update: only supplied, non-empty fields touch the row.
///
/// Returns `None` when the row does not exist.
pub fn update_profile(
    conn: &Connection,
    id: MemoryId,
    update: &CallerInfoUpdate,
) -> Result<Option<CallerMemory>> {
    if update.is_empty() {
        return get_memory(conn, id);
    }

    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    let supplied = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    if let Some(name) = supplied(&update.caller_name) {
        sets.push("caller_name = ?");
        values.push(Box::new(name));
    }
    if let Some(company) = supplied(&update.caller_company) {
        sets.push("caller_company = ?");
        values.push(Box::new(company));
    }
    if let Some(notes) = supplied(&update.notes) {
        sets.push("notes = ?");
        values.push(Box::new(notes));
    }

    sets.push("updated_at = ?");
    values.push(Box::new(Utc::now().to_rfc3339()));
    values.push(Box::new(id));

    let sql = format!(
        "UPDATE caller_memories SET {} WHERE id = ?",
        sets.join(", ")
    );
    let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let rows = conn.execute(&sql, refs.as_slice())?;

    if rows == 0 {
        return Ok(None);
    }

    get_memory(conn, id)
}

/// Replace the embedded conversation history wholesale.
///
/// Returns `None` when the row does not exist. Deliberately leaves
/// last_call_date and call_count alone; those are owned by [`record_call`].
pub fn replace_history(
    conn: &Connection,
    id: MemoryId,
    history: &[ConversationEntry],
) -> Result<Option<CallerMemory>> {
    let history_json = serde_json::to_string(history)?;

    let rows = conn.execute(
        "UPDATE caller_memories SET conversation_history = ?, updated_at = ? WHERE id = ?",
        params![history_json, Utc::now().to_rfc3339(), id],
    )?;

    if rows == 0 {
        return Ok(None);
    }

    get_memory(conn, id)
}

/// Delete every memory whose expiry is strictly in the past.
///
/// One bulk predicate delete, never a fetch-then-delete loop: bounded cost
/// and no partial-failure inconsistency mid-sweep. Returns rows deleted.
pub fn delete_expired(conn: &Connection, now: DateTime<Utc>) -> Result<i64> {
    let affected = conn.execute(
        "DELETE FROM caller_memories WHERE expires_at < ?",
        params![now.to_rfc3339()],
    )?;

    Ok(affected as i64)
}

/// Total number of caller memories (for monitoring)
pub fn count_memories(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM caller_memories", [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

/// Number of memories already past their expiry (for monitoring)
pub fn count_expired(conn: &Connection, now: DateTime<Utc>) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM caller_memories WHERE expires_at < ?",
        params![now.to_rfc3339()],
        |row| row.get(0),
    )?;
    Ok(count)
}
