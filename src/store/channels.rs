use std::collections::{BTreeSet, HashMap};

/// Channel name to subscriber identifiers. Bookkeeping only; nothing is delivered.
#[derive(Debug, Default)]
pub struct ChannelTable {
    channels: HashMap<String, BTreeSet<String>>,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, channel: &str, subscriber: &str) -> bool {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(subscriber.to_string())
    }

    /// Drops the channel once its last subscriber leaves.
    pub fn unsubscribe(&mut self, channel: &str, subscriber: &str) -> bool {
        let Some(subscribers) = self.channels.get_mut(channel) else {
            return false;
        };
        let removed = subscribers.remove(subscriber);
        if subscribers.is_empty() {
            self.channels.remove(channel);
        }
        removed
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn subscribers(&self, channel: &str) -> Vec<String> {
        self.channels
            .get(channel)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_channel(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }
}
