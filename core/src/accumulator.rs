//! Sharded map for accumulating per-document relevance from many threads.
//!
//! Keys are spread over a fixed number of shards by `key mod shard_count`.
//! Each shard owns a `BTreeMap` behind its own `parking_lot::Mutex`, so
//! workers touching different shards never wait on each other.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

/// Integer keys that can be reduced to a shard index.
pub trait ShardKey: Ord + Copy {
    fn shard_index(self, shard_count: usize) -> usize;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(impl ShardKey for $t {
            #[inline]
            fn shard_index(self, shard_count: usize) -> usize {
                (self as u64 % shard_count as u64) as usize
            }
        })*
    };
}

impl_shard_key!(i32, i64, u32, u64, usize);

/// Locked, mutable view of one value. The shard unlocks when this drops.
pub struct Access<'a, V>(MappedMutexGuard<'a, V>);

impl<V> Deref for Access<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.0
    }
}

impl<V> DerefMut for Access<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut self.0
    }
}

pub struct ShardedAccumulator<K, V> {
    shards: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V: Default + Clone> ShardedAccumulator<K, V> {
    /// A zero shard count is clamped to one.
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, key: K) -> &Mutex<BTreeMap<K, V>> {
        &self.shards[key.shard_index(self.shards.len())]
    }

    /// Lock the owning shard and return the slot for `key`, default-inserted if new.
    pub fn access(&self, key: K) -> Access<'_, V> {
        let guard = self.shard(key).lock();
        Access(MutexGuard::map(guard, |map| map.entry(key).or_default()))
    }

    /// Remove `key` if present, locking only its shard.
    pub fn erase(&self, key: K) {
        self.shard(key).lock().remove(&key);
    }

    /// Copy every entry into one ordered map.
    ///
    /// All shards are locked in ascending index order before anything is read,
    /// and released in that same order when `guards` drops.
    pub fn snapshot(&self) -> BTreeMap<K, V> {
        let guards: Vec<MutexGuard<'_, BTreeMap<K, V>>> =
            self.shards.iter().map(|shard| shard.lock()).collect();
        let mut result = BTreeMap::new();
        for guard in guards.iter() {
            result.extend(guard.iter().map(|(k, v)| (*k, v.clone())));
        }
        result
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
