// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{LockError, Result};
use crate::guard::{Held, NamespaceLockGuard};
use crate::types::{LockType, ObjectKey};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

type LockMap = Mutex<HashMap<ObjectKey, Arc<RwLock<()>>>>;

/// Lock table keyed by object. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct NamespaceLock {
    locks: Arc<LockMap>,
}

/// A reference to one entry of the table. Dropping the last reference
/// removes the entry.
#[derive(Debug)]
pub(crate) struct EntryRef {
    locks: Arc<LockMap>,
    key: ObjectKey,
    lock: Option<Arc<RwLock<()>>>,
}

impl EntryRef {
    pub(crate) fn key(&self) -> &ObjectKey {
        &self.key
    }
}

impl Drop for EntryRef {
    fn drop(&mut self) {
        let Some(lock) = self.lock.take() else {
            return;
        };
        let mut map = self.locks.lock();
        drop(lock);
        // References are only cloned under the map mutex, so a count of one
        // here means the map holds the last one.
        if map.get(&self.key).is_some_and(|l| Arc::strong_count(l) == 1) {
            map.remove(&self.key);
        }
    }
}

impl NamespaceLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive lock on `key`, waiting at most `timeout`.
    pub async fn get_write_lock(&self, key: ObjectKey, owner: &str, timeout: Duration) -> Result<NamespaceLockGuard> {
        self.acquire(key, owner, timeout, LockType::Exclusive).await
    }

    /// Shared lock on `key`, waiting at most `timeout`.
    pub async fn get_read_lock(&self, key: ObjectKey, owner: &str, timeout: Duration) -> Result<NamespaceLockGuard> {
        self.acquire(key, owner, timeout, LockType::Shared).await
    }

    /// Number of keys currently held or waited for.
    pub fn active_keys(&self) -> usize {
        self.locks.lock().len()
    }

    fn entry(&self, key: ObjectKey) -> EntryRef {
        let lock = self.locks.lock().entry(key.clone()).or_default().clone();
        EntryRef {
            locks: self.locks.clone(),
            key,
            lock: Some(lock),
        }
    }

    #[instrument(level = "debug", skip(self), fields(key = %key))]
    async fn acquire(&self, key: ObjectKey, owner: &str, timeout: Duration, lock_type: LockType) -> Result<NamespaceLockGuard> {
        let entry = self.entry(key);
        let lock = entry
            .lock
            .clone()
            .ok_or_else(|| LockError::internal("lock entry already released"))?;

        let held = match lock_type {
            LockType::Exclusive => tokio::time::timeout(timeout, lock.write_owned()).await.map(Held::Write),
            LockType::Shared => tokio::time::timeout(timeout, lock.read_owned()).await.map(Held::Read),
        };

        match held {
            Ok(held) => {
                debug!(owner, ?lock_type, "namespace lock acquired");
                Ok(NamespaceLockGuard::new(held, entry, owner.to_string()))
            }
            Err(_) => {
                warn!(owner, ?lock_type, ?timeout, "namespace lock acquisition timed out");
                Err(LockError::timeout(entry.key().to_string(), timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests;
