use std::collections::{BTreeMap, HashMap};

use crate::error::{CommandError, Result};

/// Hash keyspace. Fields iterate in sorted order.
#[derive(Debug, Default)]
pub struct HashStore {
    entries: HashMap<String, BTreeMap<String, Vec<u8>>>,
}

impl HashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `field` was newly created.
    pub fn hset(&mut self, key: &str, field: &str, value: Vec<u8>) -> bool {
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value)
            .is_none()
    }

    pub fn hget(&self, key: &str, field: &str) -> Option<&[u8]> {
        self.entries
            .get(key)
            .and_then(|fields| fields.get(field))
            .map(Vec::as_slice)
    }

    /// Removes the key itself once its last field is gone.
    pub fn hdel(&mut self, key: &str, field: &str) -> bool {
        let Some(fields) = self.entries.get_mut(key) else {
            return false;
        };
        let removed = fields.remove(field).is_some();
        if fields.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    pub fn hexists(&self, key: &str, field: &str) -> bool {
        self.hget(key, field).is_some()
    }

    pub fn hlen(&self, key: &str) -> usize {
        self.entries.get(key).map(BTreeMap::len).unwrap_or(0)
    }

    /// All fields of `key`, or `None` when the key is absent or empty.
    pub fn fields(&self, key: &str) -> Option<&BTreeMap<String, Vec<u8>>> {
        self.entries.get(key).filter(|fields| !fields.is_empty())
    }

    /// HINCRBY. A missing field counts as 0.
    pub fn hincr_by(&mut self, key: &str, field: &str, delta: i64) -> Result<i64> {
        let current = match self.hget(key, field) {
            Some(raw) => std::str::from_utf8(raw)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(CommandError::HashNotInteger)?,
            None => 0,
        };
        let next = current.checked_add(delta).ok_or(CommandError::Overflow)?;
        self.hset(key, field, next.to_string().into_bytes());
        Ok(next)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hset_reports_new_fields() {
        let mut store = HashStore::new();
        assert!(store.hset("h", "f", b"1".to_vec()));
        assert!(!store.hset("h", "f", b"2".to_vec()));
        assert_eq!(store.hget("h", "f"), Some(&b"2"[..]));
        assert_eq!(store.hlen("h"), 1);
    }

    #[test]
    fn test_hdel_last_field_removes_key() {
        let mut store = HashStore::new();
        store.hset("h", "f1", b"v1".to_vec());
        assert!(store.hdel("h", "f1"));
        assert!(!store.hexists("h", "f1"));
        assert_eq!(store.hlen("h"), 0);
        assert!(!store.contains_key("h"));
        assert!(!store.hdel("h", "f1"));
    }

    #[test]
    fn test_fields_sorted() {
        let mut store = HashStore::new();
        store.hset("h", "b", b"2".to_vec());
        store.hset("h", "a", b"1".to_vec());
        let names: Vec<&str> = store.fields("h").unwrap().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(store.fields("missing").is_none());
    }

    #[test]
    fn test_hincr_by() {
        let mut store = HashStore::new();
        assert_eq!(store.hincr_by("h", "n", 5), Ok(5));
        assert_eq!(store.hincr_by("h", "n", -7), Ok(-2));

        store.hset("h", "s", b"x".to_vec());
        assert_eq!(store.hincr_by("h", "s", 1), Err(CommandError::HashNotInteger));
        assert_eq!(store.hget("h", "s"), Some(&b"x"[..]));
    }
}
