//! O(1) LFU ordering metadata: keys grouped by access frequency.
//!
//! Keys live in frequency buckets chained in ascending order, with a
//! tracked minimum non-empty frequency. Inside a bucket the newest key sits
//! at the head and the oldest at the tail, so the eviction candidate (the
//! oldest key of the lowest bucket) is always the tail of the `min_freq`
//! bucket. Every mutating operation is O(1) amortized; nothing here ever
//! scans all entries to find a victim.
//!
//! ```text
//!   buckets:  1 ──► 3 ──► 7          (chain of existing frequencies)
//!             │     │     │
//!             ▼     ▼     ▼
//!   freq 1: head [d] ◄──► [a] tail   ← tail of min bucket = victim
//!   freq 3: head [c] tail
//!   freq 7: head [b] tail
//! ```
//!
//! A newly inserted key starts at frequency 1: the insert counts as the
//! first access, so a brand-new entry is never the immediate eviction
//! candidate ahead of an older frequency-1 entry.

use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug)]
struct EntrySlot<K> {
    key: Option<K>,
    freq: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<usize>,
    tail: Option<usize>,
    // Neighbouring existing frequencies, ascending chain.
    prev: Option<u64>,
    next: Option<u64>,
}

/// Frequency-ordered key tracker with FIFO tie-breaking per bucket.
///
/// # Example
///
/// ```
/// use boundcache::ds::FrequencyBuckets;
///
/// let mut freq = FrequencyBuckets::new();
/// freq.insert("a");
/// freq.insert("b");
/// freq.touch(&"b");
///
/// assert_eq!(freq.frequency(&"a"), Some(1));
/// assert_eq!(freq.frequency(&"b"), Some(2));
/// assert_eq!(freq.pop_min(), Some("a"));
/// ```
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    entries: Vec<EntrySlot<K>>,
    free_list: Vec<usize>,
    index: FxHashMap<K, usize>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
    len: usize,
}

impl<K> FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            index: FxHashMap::default(),
            buckets: FxHashMap::default(),
            min_freq: 0,
            len: 0,
        }
    }

    /// Creates an empty tracker with reserved entry and index capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
            len: 0,
        }
    }

    /// Returns the number of tracked keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no keys are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `key` is tracked.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the current frequency of `key`, if tracked.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let idx = *self.index.get(key)?;
        Some(self.entries[idx].freq)
    }

    /// Returns the minimum frequency currently present.
    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 {
            None
        } else {
            Some(self.min_freq)
        }
    }

    /// Peeks at the eviction candidate: the oldest key of the lowest bucket.
    pub fn peek_min(&self) -> Option<&K> {
        if self.min_freq == 0 {
            return None;
        }
        let idx = self.buckets.get(&self.min_freq)?.tail?;
        self.entries[idx].key.as_ref()
    }

    /// Starts tracking `key` at frequency 1, behind existing frequency-1
    /// keys in the tie-break order. Returns `false` if already tracked.
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let idx = self.allocate(key.clone());
        self.index.insert(key, idx);

        if !self.buckets.contains_key(&1) {
            let next = if self.min_freq == 0 {
                None
            } else {
                Some(self.min_freq)
            };
            self.insert_bucket(1, None, next);
        }
        self.bucket_push_front(1, idx);
        self.min_freq = 1;
        self.len += 1;
        true
    }

    /// Records an access: moves `key` to the next frequency bucket,
    /// creating it on demand. Returns the new frequency, or `None` if the
    /// key is not tracked.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let idx = *self.index.get(key)?;
        let current = self.entries[idx].freq;
        if current == u64::MAX {
            // Saturated counter: refresh tie-break position only.
            self.bucket_detach(current, idx);
            self.bucket_push_front(current, idx);
            return Some(current);
        }
        let next_freq = current + 1;

        let (chain_prev, chain_next) = {
            let bucket = self.buckets.get(&current)?;
            (bucket.prev, bucket.next)
        };

        self.bucket_detach(current, idx);
        let emptied = self.bucket_is_empty(current);
        if emptied {
            self.remove_bucket(current);
            if self.min_freq == current {
                self.min_freq = chain_next.unwrap_or(0);
            }
        }

        if !self.buckets.contains_key(&next_freq) {
            let prev = if emptied { chain_prev } else { Some(current) };
            self.insert_bucket(next_freq, prev, chain_next);
        }

        self.entries[idx].freq = next_freq;
        self.bucket_push_front(next_freq, idx);
        if self.min_freq == 0 || next_freq < self.min_freq {
            self.min_freq = next_freq;
        }
        Some(next_freq)
    }

    /// Stops tracking `key`; retires its bucket if it becomes empty.
    /// Returns the frequency the key held, or `None` if not tracked.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let idx = self.index.remove(key)?;
        let freq = self.entries[idx].freq;
        self.detach_and_release(idx, freq);
        Some(freq)
    }

    /// Removes and returns the eviction candidate.
    pub fn pop_min(&mut self) -> Option<K> {
        if self.min_freq == 0 {
            return None;
        }
        let freq = self.min_freq;
        let idx = self.buckets.get(&freq)?.tail?;
        let key = self.detach_and_release(idx, freq);
        self.index.remove(&key);
        Some(key)
    }

    /// Drops all keys and buckets.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.free_list.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
        self.len = 0;
    }

    /// Iterates all tracked keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
    }

    fn detach_and_release(&mut self, idx: usize, freq: u64) -> K {
        let chain_next = self.buckets.get(&freq).and_then(|bucket| bucket.next);
        self.bucket_detach(freq, idx);
        if self.bucket_is_empty(freq) {
            self.remove_bucket(freq);
            if self.min_freq == freq {
                self.min_freq = chain_next.unwrap_or(0);
            }
        }
        let key = self.entries[idx].key.take().expect("released entry must hold a key");
        self.entries[idx].prev = None;
        self.entries[idx].next = None;
        self.free_list.push(idx);
        self.len -= 1;
        key
    }

    fn allocate(&mut self, key: K) -> usize {
        let slot = EntrySlot {
            key: Some(key),
            freq: 1,
            prev: None,
            next: None,
        };
        if let Some(idx) = self.free_list.pop() {
            self.entries[idx] = slot;
            idx
        } else {
            self.entries.push(slot);
            self.entries.len() - 1
        }
    }

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                head: None,
                tail: None,
                prev,
                next,
            },
        );
        if let Some(p) = prev {
            if let Some(bucket) = self.buckets.get_mut(&p) {
                bucket.next = Some(freq);
            }
        }
        if let Some(n) = next {
            if let Some(bucket) = self.buckets.get_mut(&n) {
                bucket.prev = Some(freq);
            }
        }
    }

    fn remove_bucket(&mut self, freq: u64) {
        let Some(bucket) = self.buckets.remove(&freq) else {
            return;
        };
        if let Some(p) = bucket.prev {
            if let Some(prev_bucket) = self.buckets.get_mut(&p) {
                prev_bucket.next = bucket.next;
            }
        }
        if let Some(n) = bucket.next {
            if let Some(next_bucket) = self.buckets.get_mut(&n) {
                next_bucket.prev = bucket.prev;
            }
        }
    }

    fn bucket_is_empty(&self, freq: u64) -> bool {
        self.buckets
            .get(&freq)
            .map(|bucket| bucket.head.is_none())
            .unwrap_or(true)
    }

    fn bucket_push_front(&mut self, freq: u64, idx: usize) {
        let bucket = self
            .buckets
            .get_mut(&freq)
            .expect("pushing into a bucket that was just ensured");
        let old_head = bucket.head;
        bucket.head = Some(idx);
        if old_head.is_none() {
            bucket.tail = Some(idx);
        }
        self.entries[idx].prev = None;
        self.entries[idx].next = old_head;
        if let Some(h) = old_head {
            self.entries[h].prev = Some(idx);
        }
    }

    fn bucket_detach(&mut self, freq: u64, idx: usize) {
        let prev = self.entries[idx].prev;
        let next = self.entries[idx].next;
        if let Some(bucket) = self.buckets.get_mut(&freq) {
            if bucket.head == Some(idx) {
                bucket.head = next;
            }
            if bucket.tail == Some(idx) {
                bucket.tail = prev;
            }
        }
        if let Some(p) = prev {
            self.entries[p].next = next;
        }
        if let Some(n) = next {
            self.entries[n].prev = prev;
        }
        self.entries[idx].prev = None;
        self.entries[idx].next = None;
    }
}

impl<K> Default for FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
