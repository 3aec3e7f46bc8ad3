//! Anti-repeat bookkeeping: a bounded FIFO of recent pair keys shared across
//! the lessons of one session, plus the per-call "used in this lesson" set.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::drill_engine::models::{AntiRepeat, PairKey};

/// Attempt index (within one slot) from which de-duplication is relaxed.
pub const RELAX_AFTER_ATTEMPTS: usize = 250;

/// Recently used pair keys, oldest first.
///
/// Length never exceeds `capacity`; membership is answered from a count map
/// that mirrors the queue (a relaxed slot can push the same key twice).
#[derive(Debug, Clone, Default)]
pub struct RecentWindow {
    keys: VecDeque<PairKey>,
    members: HashMap<PairKey, usize>,
    capacity: usize,
}

impl RecentWindow {
    pub fn new(capacity: usize) -> Self {
        RecentWindow {
            keys: VecDeque::with_capacity(capacity),
            members: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Seed the window from a caller-held key list (oldest first).
    pub fn from_keys(capacity: usize, keys: impl IntoIterator<Item = PairKey>) -> Self {
        let mut window = RecentWindow::new(capacity);
        for key in keys {
            window.remember(key);
        }
        window
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity, evicting the oldest keys if the window shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict();
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.members.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PairKey> {
        self.keys.iter()
    }

    pub fn remember(&mut self, key: PairKey) {
        self.keys.push_back(key);
        *self.members.entry(key).or_insert(0) += 1;
        self.evict();
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.members.clear();
    }

    fn evict(&mut self) {
        while self.keys.len() > self.capacity {
            let Some(old) = self.keys.pop_front() else { break };
            if let Some(n) = self.members.get_mut(&old) {
                *n -= 1;
                if *n == 0 {
                    self.members.remove(&old);
                }
            }
        }
    }
}

/// Per-call de-duplication gate.
#[derive(Debug)]
pub struct AntiRepeatGate<'w> {
    policy: AntiRepeat,
    used: HashSet<PairKey>,
    recent: &'w mut RecentWindow,
}

impl<'w> AntiRepeatGate<'w> {
    pub fn new(policy: AntiRepeat, recent: &'w mut RecentWindow) -> Self {
        recent.set_capacity(policy.recent_problem_cache_size);
        AntiRepeatGate { policy, used: HashSet::new(), recent }
    }

    /// Whether a candidate key may be placed at this attempt of its slot.
    pub fn accepts(&self, key: &PairKey, attempt: usize) -> bool {
        if Self::relaxed(attempt) {
            return true;
        }
        if self.policy.no_duplicate_in_lesson && self.used.contains(key) {
            return false;
        }
        !self.recent.contains(key)
    }

    pub fn relaxed(attempt: usize) -> bool {
        attempt >= RELAX_AFTER_ATTEMPTS
    }

    pub fn record(&mut self, key: PairKey) {
        self.used.insert(key);
        self.recent.remember(key);
    }
}
