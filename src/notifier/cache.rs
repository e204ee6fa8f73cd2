use std::{collections::HashMap, time::Duration};

use bitcoin::Txid;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub height: u32,
    pub touched_at: Instant,
}

/// Last delivered confirmation height per transaction.
///
/// Entries older than the ttl are treated as absent by lookups and are
/// physically removed by [`DedupCache::evict_expired`]. There is no
/// background sweeper; the dispatcher evicts after every notification.
#[derive(Debug)]
pub struct DedupCache {
    entries: HashMap<Txid, CacheEntry>,
    ttl: Duration,
}

impl DedupCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_live(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.touched_at) <= self.ttl
    }

    /// Height last delivered for `txid`, if the entry is still live.
    pub fn height(&self, txid: &Txid) -> Option<u32> {
        let now = Instant::now();
        self.entries
            .get(txid)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.height)
    }

    pub fn is_duplicate(&self, txid: &Txid, height: u32) -> bool {
        self.height(txid) == Some(height)
    }

    /// Inserts or overwrites the entry for `txid` and refreshes its age.
    pub fn record(&mut self, txid: Txid, height: u32) {
        self.entries.insert(
            txid,
            CacheEntry {
                height,
                touched_at: Instant::now(),
            },
        );
    }

    /// Drops every entry untouched for longer than the ttl. Returns how many were removed.
    pub fn evict_expired(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.touched_at) <= ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
