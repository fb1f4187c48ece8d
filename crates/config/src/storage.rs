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

use crate::{
    DEFAULT_API_OBJECT_MAX_VERSIONS, DEFAULT_DRIVE_HEALTH_INTERVAL_SECS, DEFAULT_DRIVE_HEALTH_TIMEOUT_SECS,
    DEFAULT_LOCK_ACQUIRE_TIMEOUT_SECS, DEFAULT_MAX_PARITY_BLOCKS, DEFAULT_ROOT_DISK_THRESHOLD, ENV_API_OBJECT_MAX_VERSIONS,
    ENV_DRIVE_HEALTH_INTERVAL_SECS, ENV_DRIVE_HEALTH_TIMEOUT_SECS, ENV_LOCK_ACQUIRE_TIMEOUT_SECS, ENV_ROOT_DISK_THRESHOLD,
    ENV_STORAGE_CLASS_PARITY,
};
use shardmeta_utils::{get_env_opt_usize, get_env_u64, get_env_usize};
use std::time::Duration;
use tracing::warn;

/// Settings consumed by the erasure set and the disk layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Wait bound for per-object locks when the caller gives no deadline.
    pub lock_acquire_timeout: Duration,
    /// Explicit parity override; `None` derives parity from the set size.
    pub default_parity_blocks: Option<usize>,
    pub health_check_interval: Duration,
    pub health_check_timeout: Duration,
    pub max_versions: usize,
    pub root_disk_threshold: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_acquire_timeout: Duration::from_secs(DEFAULT_LOCK_ACQUIRE_TIMEOUT_SECS),
            default_parity_blocks: None,
            health_check_interval: Duration::from_secs(DEFAULT_DRIVE_HEALTH_INTERVAL_SECS),
            health_check_timeout: Duration::from_secs(DEFAULT_DRIVE_HEALTH_TIMEOUT_SECS),
            max_versions: DEFAULT_API_OBJECT_MAX_VERSIONS,
            root_disk_threshold: DEFAULT_ROOT_DISK_THRESHOLD,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let mut max_versions = get_env_usize(ENV_API_OBJECT_MAX_VERSIONS, DEFAULT_API_OBJECT_MAX_VERSIONS);
        if max_versions == 0 {
            warn!(env = ENV_API_OBJECT_MAX_VERSIONS, "max versions must be positive, using default");
            max_versions = DEFAULT_API_OBJECT_MAX_VERSIONS;
        }

        Self {
            lock_acquire_timeout: Duration::from_secs(get_env_u64(
                ENV_LOCK_ACQUIRE_TIMEOUT_SECS,
                DEFAULT_LOCK_ACQUIRE_TIMEOUT_SECS,
            )),
            default_parity_blocks: get_env_opt_usize(ENV_STORAGE_CLASS_PARITY),
            health_check_interval: Duration::from_secs(get_env_u64(
                ENV_DRIVE_HEALTH_INTERVAL_SECS,
                DEFAULT_DRIVE_HEALTH_INTERVAL_SECS,
            )),
            health_check_timeout: Duration::from_secs(get_env_u64(
                ENV_DRIVE_HEALTH_TIMEOUT_SECS,
                DEFAULT_DRIVE_HEALTH_TIMEOUT_SECS,
            )),
            max_versions,
            root_disk_threshold: get_env_u64(ENV_ROOT_DISK_THRESHOLD, DEFAULT_ROOT_DISK_THRESHOLD),
        }
    }

    /// Parity shard count for a set of `set_drive_count` drives.
    ///
    /// Half the set, capped at [`DEFAULT_MAX_PARITY_BLOCKS`], and at least 1 once
    /// the set has two drives. An override outside `1..=set_drive_count / 2`
    /// is ignored.
    pub fn parity_blocks(&self, set_drive_count: usize) -> usize {
        if set_drive_count < 2 {
            return 0;
        }

        let max = set_drive_count / 2;
        if let Some(parity) = self.default_parity_blocks {
            if (1..=max).contains(&parity) {
                return parity;
            }
            warn!(parity, set_drive_count, "storage class parity out of range, using default");
        }

        max.clamp(1, DEFAULT_MAX_PARITY_BLOCKS)
    }
}

#[cfg(test)]
#[allow(unsafe_code)] // env::set_var
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for key in [
            ENV_LOCK_ACQUIRE_TIMEOUT_SECS,
            ENV_STORAGE_CLASS_PARITY,
            ENV_DRIVE_HEALTH_INTERVAL_SECS,
            ENV_DRIVE_HEALTH_TIMEOUT_SECS,
            ENV_API_OBJECT_MAX_VERSIONS,
            ENV_ROOT_DISK_THRESHOLD,
        ] {
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        assert_eq!(StorageConfig::from_env(), StorageConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        unsafe {
            env::set_var(ENV_LOCK_ACQUIRE_TIMEOUT_SECS, "3");
            env::set_var(ENV_STORAGE_CLASS_PARITY, "2");
            env::set_var(ENV_DRIVE_HEALTH_INTERVAL_SECS, "60");
            env::set_var(ENV_DRIVE_HEALTH_TIMEOUT_SECS, "1");
            env::set_var(ENV_API_OBJECT_MAX_VERSIONS, "5");
            env::set_var(ENV_ROOT_DISK_THRESHOLD, "1024");
        }

        let cfg = StorageConfig::from_env();
        assert_eq!(cfg.lock_acquire_timeout, Duration::from_secs(3));
        assert_eq!(cfg.default_parity_blocks, Some(2));
        assert_eq!(cfg.health_check_interval, Duration::from_secs(60));
        assert_eq!(cfg.health_check_timeout, Duration::from_secs(1));
        assert_eq!(cfg.max_versions, 5);
        assert_eq!(cfg.root_disk_threshold, 1024);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_max_versions_falls_back() {
        clear_env();
        unsafe { env::set_var(ENV_API_OBJECT_MAX_VERSIONS, "0") };
        assert_eq!(StorageConfig::from_env().max_versions, DEFAULT_API_OBJECT_MAX_VERSIONS);
        clear_env();
    }

    #[test]
    fn test_parity_blocks_default() {
        let cfg = StorageConfig::default();
        assert_eq!(cfg.parity_blocks(1), 0);
        assert_eq!(cfg.parity_blocks(2), 1);
        assert_eq!(cfg.parity_blocks(3), 1);
        assert_eq!(cfg.parity_blocks(6), 3);
        assert_eq!(cfg.parity_blocks(16), 4);
    }

    #[test]
    fn test_parity_blocks_override() {
        let cfg = StorageConfig {
            default_parity_blocks: Some(2),
            ..Default::default()
        };
        assert_eq!(cfg.parity_blocks(6), 2);
        // 2 > 2/2: ignored
        assert_eq!(cfg.parity_blocks(2), 1);

        let cfg = StorageConfig {
            default_parity_blocks: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.parity_blocks(8), 4);
    }
}
