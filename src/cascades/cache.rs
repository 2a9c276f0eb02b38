use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::cascades::{QueryHash, RouteDecision};

pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
struct CacheEntry {
    decision: RouteDecision,
    inserted_at: Instant,
    seq: u64,
}

/// Keys in write order. A slot is stale once its key was rewritten or
/// dropped, which shows as a `seq` mismatch with the live entry.
#[derive(Debug, Default)]
struct WriteOrder {
    slots: VecDeque<(QueryHash, u64)>,
    next_seq: u64,
}

/// Routing decisions keyed by query hash, shared by every concurrent request.
///
/// Bounded by `capacity`: inserting a new key when full evicts the entry
/// written longest ago. Writers are serialized so the bound holds under
/// concurrent inserts; reads go straight to the map. With a `ttl`, entries
/// older than it are treated as misses.
#[derive(Debug)]
pub struct DecisionCache {
    entries: DashMap<QueryHash, CacheEntry>,
    order: Mutex<WriteOrder>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl DecisionCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(WriteOrder::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn get(&self, hash: &QueryHash) -> Option<RouteDecision> {
        {
            let entry = self.entries.get(hash)?;
            if !self.is_expired(&entry) {
                return Some(entry.decision.clone());
            }
        }

        debug!(query_hash = %hash, "Dropping expired routing decision");
        self.entries.remove_if(hash, |_, entry| self.is_expired(entry));
        None
    }

    /// Last write wins when two handlers race on the same key.
    pub fn insert(&self, hash: QueryHash, decision: RouteDecision) {
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.entries.contains_key(&hash) {
            while self.entries.len() >= self.capacity {
                if !self.evict_oldest(&mut order) {
                    break;
                }
            }
        }

        let seq = order.next_seq;
        order.next_seq += 1;
        order.slots.push_back((hash.clone(), seq));
        self.entries.insert(
            hash,
            CacheEntry {
                decision,
                inserted_at: Instant::now(),
                seq,
            },
        );

        if order.slots.len() > self.capacity.saturating_mul(2) {
            self.compact(&mut order);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        order.slots.clear();
        self.entries.clear();
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl.is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }

    /// Pops write-order slots until one still names a live entry and removes
    /// that entry. Returns false once no slots are left.
    fn evict_oldest(&self, order: &mut WriteOrder) -> bool {
        while let Some((hash, seq)) = order.slots.pop_front() {
            if self
                .entries
                .remove_if(&hash, |_, entry| entry.seq == seq)
                .is_some()
            {
                debug!(query_hash = %hash, "Evicting oldest routing decision");
                return true;
            }
        }
        false
    }

    // Rewrites and expiry drops leave stale slots behind.
    fn compact(&self, order: &mut WriteOrder) {
        let entries = &self.entries;
        order.slots.retain(|(hash, seq)| {
            entries
                .get(hash)
                .is_some_and(|entry| entry.seq == *seq)
        });
    }
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, None)
    }
}
