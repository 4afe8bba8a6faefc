use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::store::{deadline_after, is_expired};

#[derive(Debug, Default)]
struct Entry {
    items: VecDeque<Vec<u8>>,
    expiry: Option<Instant>,
}

/// List keyspace. Entries created by a push never expire.
#[derive(Debug, Default)]
pub struct ListStore {
    entries: HashMap<String, Entry>,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

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

    /// Push `value` at the head. Returns the new length.
    pub fn lpush(&mut self, key: &str, value: Vec<u8>) -> usize {
        self.push(key, value, true)
    }

    /// Push `value` at the tail. Returns the new length.
    pub fn rpush(&mut self, key: &str, value: Vec<u8>) -> usize {
        self.push(key, value, false)
    }

    fn push(&mut self, key: &str, value: Vec<u8>, head: bool) -> usize {
        // An expired list is dropped so the push starts a fresh, permanent one.
        self.live(key);
        let entry = self.entries.entry(key.to_string()).or_default();
        if head {
            entry.items.push_front(value);
        } else {
            entry.items.push_back(value);
        }
        entry.items.len()
    }

    pub fn lpop(&mut self, key: &str) -> Option<Vec<u8>> {
        self.pop(key, true)
    }

    pub fn rpop(&mut self, key: &str) -> Option<Vec<u8>> {
        self.pop(key, false)
    }

    fn pop(&mut self, key: &str, head: bool) -> Option<Vec<u8>> {
        let entry = self.live(key)?;
        let value = if head {
            entry.items.pop_front()
        } else {
            entry.items.pop_back()
        };
        if entry.items.is_empty() {
            self.entries.remove(key);
        }
        value
    }

    /// Inclusive range with negative indices counted from the tail.
    pub fn range(&mut self, key: &str, start: i64, stop: i64) -> Vec<Vec<u8>> {
        let Some(entry) = self.live(key) else {
            return Vec::new();
        };
        let len = entry.items.len() as i64;
        let Some((start, stop)) = clamp_range(start, stop, len) else {
            return Vec::new();
        };
        entry
            .items
            .range(start..=stop)
            .cloned()
            .collect()
    }

    pub fn len(&mut self, key: &str) -> usize {
        self.live(key).map(|e| e.items.len()).unwrap_or(0)
    }

    /// Give an existing list a deadline `seconds` from now.
    pub fn expire_in(&mut self, key: &str, seconds: i64) -> bool {
        match self.live(key) {
            Some(entry) => {
                entry.expiry = Some(deadline_after(Instant::now(), seconds));
                true
            }
            None => false,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// Normalize LRANGE bounds against a list of `len` items.
fn clamp_range(start: i64, stop: i64, len: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let start = (if start < 0 { len + start } else { start }).max(0);
    let stop = (if stop < 0 { len + stop } else { stop }).min(len - 1);
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}
