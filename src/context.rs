//! Context block rendering
//!
//! Turns a caller memory into the natural-language briefing injected into
//! the AI agent prompt. Pure string assembly, no I/O, deterministic for a
//! given memory.

use crate::types::{CallerMemory, CONTEXT_HISTORY_ENTRIES, CONTEXT_SUMMARY_MAX_CHARS};

/// Render the prompt context block for a caller.
///
/// `None` renders to an empty string: failure-to-recall degrades to the
/// new-caller experience, never to a visible error.
pub fn render_memory_context(memory: Option<&CallerMemory>) -> String {
    let memory = match memory {
        Some(m) => m,
        None => return String::new(),
    };

    let mut out = String::new();

    if memory.call_count <= 1 {
        // First logical call: no history is rendered even if the record
        // somehow carries pre-seeded entries.
        out.push_str("NEW CALLER:\n");
        out.push_str(
            "This is the first call from this number. Greet the caller generically \
             and politely ask for their name and company so you can assist them better.\n",
        );
    } else {
        render_returning_caller(memory, &mut out);
    }

    if let Some(notes) = memory.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        out.push_str("\nIMPORTANT NOTES:\n");
        out.push_str(notes);
        out.push('\n');
    }

    out
}

fn render_returning_caller(memory: &CallerMemory, out: &mut String) {
    let prior_calls = memory.call_count - 1;

    out.push_str("CALLER MEMORY:\n");
    if prior_calls == 1 {
        out.push_str("This caller has called 1 time before.\n");
    } else {
        out.push_str(&format!(
            "This caller has called {} times before.\n",
            prior_calls
        ));
    }

    if let Some(name) = memory.caller_name.as_deref() {
        out.push_str(&format!("Name: {}\n", name));
    }
    if let Some(company) = memory.caller_company.as_deref() {
        out.push_str(&format!("Company: {}\n", company));
    }

    out.push_str("\nINSTRUCTIONS:\n");
    out.push_str("- Greet the caller by name when you know it.\n");
    out.push_str("- Briefly reference the last interaction.\n");
    out.push_str("- Ask whether this call is about the same topic or something new.\n");

    // Example greeting keyed off the most recent conversation's first topic
    let last_topic = memory
        .conversation_history
        .last()
        .and_then(|entry| entry.topics.first())
        .map(String::as_str);
    match last_topic {
        Some(topic) => out.push_str(&format!(
            "- Example greeting: \"Welcome back! Are you calling about {} again?\"\n",
            topic
        )),
        None => out.push_str(
            "- Example greeting: \"Welcome back! How can I help you today?\"\n",
        ),
    }

    if !memory.conversation_history.is_empty() {
        out.push_str("\nRECENT CONVERSATIONS:\n");
        for entry in memory
            .conversation_history
            .iter()
            .rev()
            .take(CONTEXT_HISTORY_ENTRIES)
        {
            out.push_str(&format!(
                "- [{}] {}\n",
                entry.date.format("%Y-%m-%d %H:%M"),
                truncate_summary(&entry.summary)
            ));
            if !entry.topics.is_empty() {
                out.push_str(&format!("  Topics: {}\n", entry.topics.join(", ")));
            }
        }
    }
}

/// Hard cut at the character budget, with an ellipsis marker. Not
/// word-boundary aware; callers budget prompt length on this exact shape.
fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= CONTEXT_SUMMARY_MAX_CHARS {
        summary.to_string()
    } else {
        let cut: String = summary.chars().take(CONTEXT_SUMMARY_MAX_CHARS).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConversationEntry, RETENTION_DAYS};
    use chrono::{Duration, Utc};

    fn entry(summary: &str, topics: &[&str]) -> ConversationEntry {
        ConversationEntry {
            date: Utc::now(),
            summary: summary.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            duration_seconds: 60,
            request_details: serde_json::Value::Null,
        }
    }

    fn memory(call_count: i32) -> CallerMemory {
        let now = Utc::now();
        CallerMemory {
            id: 1,
            tenant_id: "t1".to_string(),
            caller_phone: "+15551234567".to_string(),
            caller_name: None,
            caller_company: None,
            last_call_date: now,
            call_count,
            expires_at: now + Duration::days(RETENTION_DAYS),
            conversation_history: vec![],
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_absent_memory_renders_nothing() {
        assert_eq!(render_memory_context(None), "");
    }

    #[test]
    fn test_first_call_suppresses_preseeded_history() {
        let mut m = memory(1);
        m.conversation_history.push(entry("should not leak", &["leak"]));

        let ctx = render_memory_context(Some(&m));
        assert!(ctx.contains("NEW CALLER"));
        assert!(!ctx.contains("should not leak"));
        assert!(!ctx.contains("RECENT CONVERSATIONS"));
    }

    #[test]
    fn test_returning_caller_block() {
        let mut m = memory(3);
        m.caller_name = Some("Carlos".to_string());
        m.conversation_history.push(entry("Asked about invoices", &["billing"]));
        m.conversation_history.push(entry("Followed up on a refund", &["refunds"]));

        let ctx = render_memory_context(Some(&m));
        assert!(ctx.contains("called 2 times before"));
        assert!(ctx.contains("Carlos"));
        assert!(ctx.contains("Asked about invoices"));
        assert!(ctx.contains("Followed up on a refund"));
        // Example greeting uses the most recent entry's first topic
        assert!(ctx.contains("about refunds again"));
    }

    #[test]
    fn test_singular_prior_call() {
        let m = memory(2);
        let ctx = render_memory_context(Some(&m));
        assert!(ctx.contains("called 1 time before"));
        assert!(!ctx.contains("1 times"));
    }

    #[test]
    fn test_only_last_three_entries_listed() {
        let mut m = memory(6);
        for i in 0..5 {
            m.conversation_history.push(entry(&format!("call {}", i), &[]));
        }

        let ctx = render_memory_context(Some(&m));
        assert!(!ctx.contains("call 0"));
        assert!(!ctx.contains("call 1"));
        assert!(ctx.contains("call 2"));
        assert!(ctx.contains("call 3"));
        assert!(ctx.contains("call 4"));
        // Most recent first
        let pos4 = ctx.find("call 4").unwrap();
        let pos2 = ctx.find("call 2").unwrap();
        assert!(pos4 < pos2);
    }

    #[test]
    fn test_no_topics_falls_back_to_generic_greeting() {
        let mut m = memory(2);
        m.conversation_history.push(entry("Quick question", &[]));

        let ctx = render_memory_context(Some(&m));
        assert!(ctx.contains("How can I help you today?"));
    }

    #[test]
    fn test_truncation_shape() {
        let long: String = "x".repeat(150);
        let mut m = memory(2);
        m.conversation_history.push(entry(&long, &[]));

        let ctx = render_memory_context(Some(&m));
        let expected = format!("{}...", "x".repeat(100));
        assert!(ctx.contains(&expected));
        assert!(!ctx.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_notes_rendered_verbatim() {
        let mut m = memory(2);
        m.notes = Some("Prefers callbacks after 5pm".to_string());

        let ctx = render_memory_context(Some(&m));
        assert!(ctx.contains("IMPORTANT NOTES"));
        assert!(ctx.contains("Prefers callbacks after 5pm"));
    }
}
