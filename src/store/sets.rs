use std::collections::{BTreeSet, HashMap};

/// Set keyspace. Members come back in sorted order.
#[derive(Debug, Default)]
pub struct SetStore {
    entries: HashMap<String, BTreeSet<Vec<u8>>>,
}

impl SetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sadd(&mut self, key: &str, member: Vec<u8>) -> bool {
        self.entries.entry(key.to_string()).or_default().insert(member)
    }

    /// Removes the key itself once its last member is gone.
    pub fn srem(&mut self, key: &str, member: &[u8]) -> bool {
        let Some(members) = self.entries.get_mut(key) else {
            return false;
        };
        let removed = members.remove(member);
        if members.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    pub fn members(&self, key: &str) -> Vec<Vec<u8>> {
        self.entries
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sadd_srem() {
        let mut store = SetStore::new();
        assert!(store.sadd("s", b"four".to_vec()));
        assert!(!store.sadd("s", b"four".to_vec()));
        assert!(store.srem("s", b"four"));
        assert!(!store.srem("s", b"four"));
        assert!(!store.contains_key("s"));
    }

    #[test]
    fn test_members_copy_out() {
        let mut store = SetStore::new();
        store.sadd("s", b"two".to_vec());
        store.sadd("s", b"one".to_vec());
        let mut members = store.members("s");
        members.clear();
        assert_eq!(store.members("s"), vec![b"one".to_vec(), b"two".to_vec()]);
        assert!(store.members("missing").is_empty());
    }
}
