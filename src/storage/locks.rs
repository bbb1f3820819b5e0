//! Per-stack write serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Internal storage type for keyed locks: maps key to its mutex.
type LockStorage = DashMap<String, Arc<Mutex<()>>>;

/// Per-key async mutex.
///
/// Operations on different keys run concurrently while operations on the
/// same key are serialized. An entry lives only while some caller holds or
/// waits for its lock, so keys that are never seen again (unknown or deleted
/// stacks) do not accumulate.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<LockStorage>,
}

/// Exclusive hold on one key, released on drop.
pub struct KeyedLockGuard {
    // Declared first so it drops before `release` runs.
    guard: Option<OwnedMutexGuard<()>>,
    locks: KeyedLocks,
    key: String,
}

impl Drop for KeyedLockGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.release(&self.key);
    }
}

impl KeyedLocks {
    /// Create a new empty lock collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    ///
    /// Cancelling the wait also releases the entry.
    pub async fn lock(&self, key: &str) -> KeyedLockGuard {
        let mut held = KeyedLockGuard {
            guard: None,
            locks: self.clone(),
            key: key.to_string(),
        };
        let lock = self.entry(key);
        held.guard = Some(lock.lock_owned().await);
        held
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn entry(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // Only the map itself references the lock once every holder and waiter
    // is gone. The shard lock makes the check and removal atomic with
    // respect to `entry`.
    fn release(&self, key: &str) {
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_removed_after_guard_drop() {
        let locks = KeyedLocks::new();
        let guard = locks.lock("stack-a").await;
        assert_eq!(locks.len(), 1);

        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _guard = locks.lock("stack-a").await;

        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.lock("stack-b")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = KeyedLocks::new();
        let _guard = locks.lock("stack-a").await;

        let acquired = tokio::time::timeout(Duration::from_millis(50), locks.lock("stack-a")).await;
        assert!(acquired.is_err());
    }

    #[tokio::test]
    async fn test_entry_kept_while_waiter_queued() {
        let locks = KeyedLocks::new();
        let first = locks.lock("stack-a").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("stack-a").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(locks.len(), 1, "queued waiter still needs the entry");

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_wait_does_not_leak() {
        let locks = KeyedLocks::new();
        let first = locks.lock("stack-a").await;

        let _ = tokio::time::timeout(Duration::from_millis(20), locks.lock("stack-a")).await;
        assert_eq!(locks.len(), 1);

        drop(first);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_many_keys_leave_nothing_behind() {
        let locks = KeyedLocks::new();
        for i in 0..100 {
            let _guard = locks.lock(&format!("ghost-{}", i)).await;
        }
        assert!(locks.is_empty());
    }
}
