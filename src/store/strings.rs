use std::collections::HashMap;
use std::time::Instant;

use crate::error::{CommandError, Result};
use crate::store::{deadline_after, is_expired, remaining_secs};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expiry: Option<Instant>,
}

/// String keyspace with per-key optional expiry.
#[derive(Debug, Default)]
pub struct StringStore {
    entries: HashMap<String, Entry>,
}

impl StringStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entry for `key`, evicting it first if it has expired.
    fn live(&mut self, key: &str) -> Option<&mut Entry> {
        let now = Instant::now();
        if self
            .entries
            .get(key)
            .is_some_and(|e| is_expired(e.expiry, now))
        {
            self.entries.remove(key);
            return None;
        }
        self.entries.get_mut(key)
    }

    /// SET: permanent value, replacing any previous value and expiry.
    pub fn set(&mut self, key: &str, value: Vec<u8>) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expiry: None,
            },
        );
    }

    /// SETEX: value that expires `seconds` from now.
    pub fn set_ex(&mut self, key: &str, seconds: i64, value: Vec<u8>) {
        let expiry = deadline_after(Instant::now(), seconds);
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expiry: Some(expiry),
            },
        );
    }

    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        self.live(key).map(|e| e.value.clone())
    }

    pub fn exists(&mut self, key: &str) -> bool {
        self.live(key).is_some()
    }

    /// Returns false if the key is absent or already expired.
    pub fn expire(&mut self, key: &str, seconds: i64) -> bool {
        match self.live(key) {
            Some(entry) => {
                entry.expiry = Some(deadline_after(Instant::now(), seconds));
                true
            }
            None => false,
        }
    }

    /// -2 when absent, -1 when permanent, else whole seconds remaining.
    pub fn ttl(&mut self, key: &str) -> i64 {
        let now = Instant::now();
        let Some(entry) = self.live(key) else {
            return -2;
        };
        let Some(deadline) = entry.expiry else {
            return -1;
        };

        let remaining = remaining_secs(deadline, now);
        if remaining <= 0 {
            self.entries.remove(key);
            return -2;
        }
        remaining
    }

    /// INCRBY/DECRBY. A missing key counts as 0; an existing expiry is kept.
    pub fn incr_by(&mut self, key: &str, delta: i64) -> Result<i64> {
        let (current, expiry) = match self.live(key) {
            Some(entry) => (parse_integer(&entry.value)?, entry.expiry),
            None => (0, None),
        };
        let next = current.checked_add(delta).ok_or(CommandError::Overflow)?;
        self.entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string().into_bytes(),
                expiry,
            },
        );
        Ok(next)
    }

    /// APPEND. Returns the new length.
    pub fn append(&mut self, key: &str, suffix: &[u8]) -> usize {
        if let Some(entry) = self.live(key) {
            entry.value.extend_from_slice(suffix);
            return entry.value.len();
        }
        self.set(key, suffix.to_vec());
        suffix.len()
    }

    pub fn strlen(&mut self, key: &str) -> usize {
        self.live(key).map(|e| e.value.len()).unwrap_or(0)
    }

    /// GETSET: store a permanent value and hand back the previous one.
    pub fn get_set(&mut self, key: &str, value: Vec<u8>) -> Option<Vec<u8>> {
        let old = self.get(key);
        self.set(key, value);
        old
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw presence check that neither honors nor applies expiry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

fn parse_integer(value: &[u8]) -> Result<i64> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(CommandError::NotInteger)
}
