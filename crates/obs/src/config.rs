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

use shardmeta_config::{
    DEFAULT_LOG_LEVEL, DEFAULT_OBS_LOG_FILENAME, DEFAULT_OBS_LOG_JSON, ENV_OBS_LOG_DIRECTORY, ENV_OBS_LOG_FILENAME,
    ENV_OBS_LOG_JSON, ENV_OBS_LOGGER_LEVEL,
};
use shardmeta_utils::{get_env_bool, get_env_opt_str, get_env_str};

/// Logging settings of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObsConfig {
    /// Base filter directive, e.g. `info` or `shardmeta_ecstore=debug`.
    pub logger_level: String,
    /// Directory of the daily-rolling log file; stdout when unset.
    pub log_directory: Option<String>,
    pub log_filename: String,
    /// JSON lines when true, human-readable lines otherwise.
    pub log_json: bool,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            logger_level: DEFAULT_LOG_LEVEL.to_string(),
            log_directory: None,
            log_filename: DEFAULT_OBS_LOG_FILENAME.to_string(),
            log_json: DEFAULT_OBS_LOG_JSON,
        }
    }
}

impl ObsConfig {
    pub fn from_env() -> Self {
        Self {
            logger_level: get_env_str(ENV_OBS_LOGGER_LEVEL, DEFAULT_LOG_LEVEL),
            log_directory: get_env_opt_str(ENV_OBS_LOG_DIRECTORY),
            log_filename: get_env_str(ENV_OBS_LOG_FILENAME, DEFAULT_OBS_LOG_FILENAME),
            log_json: get_env_bool(ENV_OBS_LOG_JSON, DEFAULT_OBS_LOG_JSON),
        }
    }
}

#[cfg(test)]
#[allow(unsafe_code)] // env::set_var
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const KEYS: [&str; 4] = [ENV_OBS_LOGGER_LEVEL, ENV_OBS_LOG_DIRECTORY, ENV_OBS_LOG_FILENAME, ENV_OBS_LOG_JSON];

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        for key in KEYS {
            unsafe { env::remove_var(key) };
        }
        assert_eq!(ObsConfig::from_env(), ObsConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        unsafe {
            env::set_var(ENV_OBS_LOGGER_LEVEL, "debug");
            env::set_var(ENV_OBS_LOG_DIRECTORY, "/var/log/shardmeta");
            env::set_var(ENV_OBS_LOG_FILENAME, "node.log");
            env::set_var(ENV_OBS_LOG_JSON, "false");
        }
        let cfg = ObsConfig::from_env();
        assert_eq!(cfg.logger_level, "debug");
        assert_eq!(cfg.log_directory.as_deref(), Some("/var/log/shardmeta"));
        assert_eq!(cfg.log_filename, "node.log");
        assert!(!cfg.log_json);

        unsafe { env::set_var(ENV_OBS_LOG_DIRECTORY, "") };
        assert_eq!(ObsConfig::from_env().log_directory, None);

        for key in KEYS {
            unsafe { env::remove_var(key) };
        }
    }
}
