//! Single-writer discipline per pool.
//!
//! Every mutating operation on a pool serializes on that pool's async
//! mutex. Acquisition is bounded: under contention a caller gets a
//! retryable [`AmmError::ConcurrencyConflict`] instead of queueing
//! indefinitely, and is expected to back off exponentially.

use cpmm_domain::{AmmError, PoolId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

/// Pool-id-keyed writer locks.
pub struct PoolLocks {
    locks: Mutex<HashMap<PoolId, Arc<Mutex<()>>>>,
    timeout: Duration,
}

impl PoolLocks {
    /// Creates the lock table with the given acquisition timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Acquires the writer lock for a pool.
    ///
    /// # Errors
    /// [`AmmError::ConcurrencyConflict`] if the lock is not free within
    /// the configured timeout.
    pub async fn acquire(&self, pool_id: PoolId) -> Result<OwnedMutexGuard<()>, AmmError> {
        let lock = {
            let mut table = self.locks.lock().await;
            Arc::clone(table.entry(pool_id).or_default())
        };
        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                warn!(pool = %pool_id, timeout_ms = self.timeout.as_millis() as u64,
                    "writer lock contended");
                Err(AmmError::ConcurrencyConflict)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serializes_same_pool() {
        let locks = PoolLocks::new(Duration::from_millis(20));
        let pool = PoolId::generate();
        let guard = locks.acquire(pool).await.unwrap();
        let contended = locks.acquire(pool).await;
        assert_eq!(contended.unwrap_err(), AmmError::ConcurrencyConflict);
        drop(guard);
        assert!(locks.acquire(pool).await.is_ok());
    }

    #[tokio::test]
    async fn distinct_pools_do_not_contend() {
        let locks = PoolLocks::new(Duration::from_millis(20));
        let _a = locks.acquire(PoolId::generate()).await.unwrap();
        let b = locks.acquire(PoolId::generate()).await;
        assert!(b.is_ok());
    }
}
