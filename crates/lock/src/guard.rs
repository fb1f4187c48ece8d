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

use crate::namespace::EntryRef;
use crate::types::{LockType, ObjectKey};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard};

#[derive(Debug)]
pub(crate) enum Held {
    Write(OwnedRwLockWriteGuard<()>),
    Read(OwnedRwLockReadGuard<()>),
}

/// A held namespace lock, released when dropped.
///
/// Field order matters: the lock is released before the map entry is
/// considered for removal.
#[derive(Debug)]
pub struct NamespaceLockGuard {
    held: Option<Held>,
    entry: EntryRef,
    owner: String,
}

impl NamespaceLockGuard {
    pub(crate) fn new(held: Held, entry: EntryRef, owner: String) -> Self {
        Self {
            held: Some(held),
            entry,
            owner,
        }
    }

    pub fn key(&self) -> &ObjectKey {
        self.entry.key()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn lock_type(&self) -> LockType {
        match self.held {
            Some(Held::Read(_)) => LockType::Shared,
            _ => LockType::Exclusive,
        }
    }

    /// Releases the lock now; same as dropping the guard.
    pub fn release(self) {}
}

impl Drop for NamespaceLockGuard {
    fn drop(&mut self) {
        self.held.take();
        tracing::trace!(key = %self.entry.key(), owner = %self.owner, "namespace lock released");
    }
}
