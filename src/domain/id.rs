//! Lane and card id generation
//!
//! Ids are opaque strings. They only have to be unique within one board and
//! are never derived from titles, which are mutable and may repeat.
//!
//! The default generator hashes the current timestamp, the process id and a
//! process-wide counter with blake3, giving 16 hex characters
//! (e.g. `7f2b4c19d0e3a8b5`). Tests inject deterministic generators instead:
//! any `FnMut() -> String` is an [`IdGenerator`].

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Length of generated ids in hex characters
const ID_LEN: usize = 16;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Source of fresh lane and card ids
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> String,
{
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Collision-resistant random ids
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        generate_id()
    }
}

/// Generates one random id
pub fn generate_id() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    let input = format!("{}:{}:{}", nanos, std::process::id(), count);
    let hash = blake3::hash(input.as_bytes());
    hash.to_hex()[..ID_LEN].to_string()
}

/// Sequential ids with a prefix (`lane-1`, `lane-2`, ...)
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
