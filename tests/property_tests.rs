//! Property-based tests for recall
//!
//! These tests verify invariants that must hold for all inputs:
//! - Phone normalization is idempotent and punctuation-insensitive
//! - Normalization never panics
//! - History stays within its bound
//!
//! Run with: cargo test --test property_tests

use proptest::prelude::*;

mod phone_tests {
    use super::*;
    use recall::identity::normalize_phone;

    proptest! {
        /// Invariant: normalize_phone never panics on any string input
        #[test]
        fn never_panics(s in ".*") {
            let _ = normalize_phone(&s);
        }

        /// Invariant: normalization is a fixpoint
        #[test]
        fn idempotent(s in ".*") {
            if let Some(key) = normalize_phone(&s) {
                prop_assert_eq!(normalize_phone(&key), Some(key.clone()));
            }
        }

        /// Invariant: the key never contains stripped characters
        #[test]
        fn output_charset(s in ".*") {
            if let Some(key) = normalize_phone(&s) {
                let charset_ok = key.chars().all(|c| {
                    !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.')
                });
                prop_assert!(charset_ok);
            }
        }

        /// Invariant: equivalent digits with different punctuation yield the
        /// same key
        #[test]
        fn punctuation_insensitive(digits in "[0-9]{7,15}") {
            let plain = normalize_phone(&digits);

            let decorated: String = digits
                .chars()
                .enumerate()
                .flat_map(|(i, c)| {
                    let sep = match i % 4 {
                        0 => ' ',
                        1 => '-',
                        2 => '(',
                        _ => ')',
                    };
                    [c, sep]
                })
                .collect();

            prop_assert_eq!(normalize_phone(&decorated), plain);
        }

        /// Invariant: punctuation-only input yields no key
        #[test]
        fn unsurvivable_input_is_none(s in "[ \\t\\-\\(\\)\\.]{0,20}") {
            prop_assert_eq!(normalize_phone(&s), None);
        }
    }
}

mod history_tests {
    use super::*;
    use chrono::Utc;
    use recall::{CallerMemory, ConversationEntry, MAX_HISTORY_ENTRIES, RETENTION_DAYS};

    fn base_memory() -> CallerMemory {
        let now = Utc::now();
        CallerMemory {
            id: 1,
            tenant_id: "t1".to_string(),
            caller_phone: "+15551234567".to_string(),
            caller_name: None,
            caller_company: None,
            last_call_date: now,
            call_count: 1,
            expires_at: now + chrono::Duration::days(RETENTION_DAYS),
            conversation_history: vec![],
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    proptest! {
        /// Invariant: history never exceeds the bound, and the newest entry
        /// is always retained at the back
        #[test]
        fn history_stays_bounded(n in 0usize..40) {
            let mut memory = base_memory();
            for i in 0..n {
                memory.push_history(ConversationEntry {
                    date: Utc::now(),
                    summary: format!("conversation {}", i),
                    topics: vec![],
                    duration_seconds: 0,
                    request_details: serde_json::Value::Null,
                });
            }

            prop_assert_eq!(
                memory.conversation_history.len(),
                n.min(MAX_HISTORY_ENTRIES)
            );
            if n > 0 {
                prop_assert_eq!(
                    &memory.conversation_history.last().unwrap().summary,
                    &format!("conversation {}", n - 1)
                );
            }
        }

        /// Invariant: surviving entries are the most recent ones, in order
        #[test]
        fn eviction_is_fifo(n in 11usize..30) {
            let mut memory = base_memory();
            for i in 0..n {
                memory.push_history(ConversationEntry {
                    date: Utc::now(),
                    summary: format!("conversation {}", i),
                    topics: vec![],
                    duration_seconds: 0,
                    request_details: serde_json::Value::Null,
                });
            }

            let expected_first = n - MAX_HISTORY_ENTRIES;
            for (offset, entry) in memory.conversation_history.iter().enumerate() {
                prop_assert_eq!(
                    &entry.summary,
                    &format!("conversation {}", expected_first + offset)
                );
            }
        }
    }
}
