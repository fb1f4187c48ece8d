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

use std::env;

pub fn get_env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

pub fn get_env_opt_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

pub fn get_env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

pub fn get_env_opt_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

pub fn get_env_str(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn get_env_opt_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn get_env_opt_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|v| parse_bool(&v))
}

pub fn get_env_bool(key: &str, default: bool) -> bool {
    get_env_opt_bool(key).unwrap_or(default)
}

#[cfg(test)]
#[allow(unsafe_code)] // env::set_var
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_env_falls_back_on_missing_or_garbage() {
        let key = "SHARDMETA_TEST_ENVS_U64";
        unsafe { env::remove_var(key) };
        assert_eq!(get_env_u64(key, 7), 7);

        unsafe { env::set_var(key, "not-a-number") };
        assert_eq!(get_env_u64(key, 7), 7);
        assert_eq!(get_env_opt_u64(key), None);

        unsafe { env::set_var(key, "42") };
        assert_eq!(get_env_u64(key, 7), 42);
        assert_eq!(get_env_usize(key, 7), 42);
        unsafe { env::remove_var(key) };
    }

    #[test]
    #[serial]
    fn test_get_env_bool_variants() {
        let key = "SHARDMETA_TEST_ENVS_BOOL";
        for (raw, want) in [("true", true), ("YES", true), ("1", true), ("off", false), ("0", false)] {
            unsafe { env::set_var(key, raw) };
            assert_eq!(get_env_bool(key, !want), want, "value {raw}");
        }
        unsafe { env::set_var(key, "maybe") };
        assert!(get_env_bool(key, true));
        assert_eq!(get_env_opt_bool(key), None);
        unsafe { env::remove_var(key) };
    }

    #[test]
    #[serial]
    fn test_get_env_opt_str_ignores_empty() {
        let key = "SHARDMETA_TEST_ENVS_STR";
        unsafe { env::set_var(key, "") };
        assert_eq!(get_env_opt_str(key), None);
        assert_eq!(get_env_str(key, "dflt"), "");
        unsafe { env::set_var(key, "/var/log") };
        assert_eq!(get_env_opt_str(key).as_deref(), Some("/var/log"));
        unsafe { env::remove_var(key) };
    }
}
