use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use usermanager_shared::types::UserId;

/// In-process async locks created on demand per key.
///
/// Entries are dropped once nobody holds or awaits them.
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Weak<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to serialize on
    ///
    /// # Returns
    ///
    /// A guard releasing the key when dropped.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, weak| weak.strong_count() > 0);
            match locks.get(&key).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    locks.insert(key, Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    /// Number of keys currently locked or awaited.
    pub fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|weak| weak.strong_count() > 0).count()
    }
}

/// Per-(target, voter) serialization point.
///
/// Holding the guard returned by [`lock`](Self::lock) makes the
/// check-then-write sequence of a vote transition exclusive for that pair
/// within this process.
#[derive(Default)]
pub struct PairLocks {
    inner: KeyedLocks<(UserId, UserId)>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, target: UserId, voter: UserId) -> OwnedMutexGuard<()> {
        self.inner.lock((target, voter)).await
    }

    pub fn active(&self) -> usize {
        self.inner.active()
    }
}

/// Per-voter serialization point for rate-limited casts. Held across the
/// interval check and the write that follows it.
pub type VoterLocks = KeyedLocks<UserId>;
