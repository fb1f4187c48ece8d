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

use shardmeta_filemeta::NULL_VERSION_ID;
use std::collections::HashMap;
use std::time::Duration;
use time::OffsetDateTime;

/// Per-call options for object operations.
#[derive(Debug, Default, Clone)]
pub struct ObjectOptions {
    /// Target version; `"null"` addresses the unversioned version.
    pub version_id: Option<String>,
    /// Whether the volume keeps a version history.
    pub versioned: bool,
    /// Keep a deleted version in place, pending purge, until replication catches up.
    pub replicate_delete: bool,
    /// Modification time to record instead of the current time.
    pub mod_time: Option<OffsetDateTime>,
    /// Deadline for the object lock; the configured default when unset.
    pub lock_timeout: Option<Duration>,
    pub user_defined: HashMap<String, String>,
}

impl ObjectOptions {
    pub fn versioned() -> Self {
        Self {
            versioned: true,
            ..Default::default()
        }
    }

    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Requested version id as stored, `"null"` mapped to the empty null version.
    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref().map(stored_version_id)
    }
}

/// A version id as it is stored: `"null"` names the empty null version.
pub(crate) fn stored_version_id(version_id: &str) -> &str {
    if version_id == NULL_VERSION_ID { "" } else { version_id }
}
