//! Effectful inputs of the issue service: wall clock and id generation.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh issue ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Random RFC 4122 v4 UUIDs in hyphenated lowercase form.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidV4Ids;

impl IdGenerator for UuidV4Ids {
    fn next_id(&self) -> String { Uuid::new_v4().to_string() }
}

/// ISO 8601 UTC with millisecond precision, e.g. `2025-03-25T08:21:42.420Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Deterministic clock and ids for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Clock frozen at a given instant until advanced.
    pub struct FixedClock {
        at: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        pub fn new(at: DateTime<Utc>) -> Self { Self { at: Mutex::new(at) } }

        /// Parse an RFC 3339 instant; panics on malformed input.
        pub fn at(rfc3339: &str) -> Self {
            let at = DateTime::parse_from_rfc3339(rfc3339)
                .expect("valid rfc3339 instant")
                .with_timezone(&Utc);
            Self::new(at)
        }

        pub fn advance(&self, by: chrono::Duration) {
            let mut at = self.at.lock().unwrap();
            *at += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> { *self.at.lock().unwrap() }
    }

    /// Ids `"{prefix}-1"`, `"{prefix}-2"`, ...
    pub struct SequentialIds {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIds {
        pub fn new(prefix: impl Into<String>) -> Self {
            Self { prefix: prefix.into(), next: AtomicU64::new(1) }
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::Relaxed);
            format!("{}-{}", self.prefix, n)
        }
    }
}
