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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Call counters and moving-average latencies of the storage APIs of one drive.
///
/// Keys are API names (`ReadVersions`, `WriteVersions`, ...). Latencies are
/// rendered human-readable so they can be shown without further formatting.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiskMetrics {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_latencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_calls: BTreeMap<String, u64>,
}

impl DiskMetrics {
    pub fn is_empty(&self) -> bool {
        self.api_latencies.is_empty() && self.api_calls.is_empty()
    }

    pub fn record(&mut self, api: &str, calls: u64, avg_latency: Duration) {
        self.api_calls.insert(api.to_string(), calls);
        self.api_latencies.insert(api.to_string(), format_latency(avg_latency));
    }

    /// Parses a latency string back into a duration.
    pub fn latency(&self, api: &str) -> Option<Duration> {
        self.api_latencies.get(api).and_then(|s| humantime::parse_duration(s).ok())
    }

    pub fn calls(&self, api: &str) -> u64 {
        self.api_calls.get(api).copied().unwrap_or_default()
    }
}

/// Renders a latency with microsecond precision, e.g. `1ms 250us`.
pub fn format_latency(d: Duration) -> String {
    let micros = Duration::from_micros(d.as_micros().min(u64::MAX as u128) as u64);
    humantime::format_duration(micros).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_read_back() {
        let mut m = DiskMetrics::default();
        assert!(m.is_empty());

        m.record("ReadVersions", 3, Duration::from_micros(1250));
        assert_eq!(m.calls("ReadVersions"), 3);
        assert_eq!(m.calls("WriteVersions"), 0);
        assert_eq!(m.api_latencies["ReadVersions"], "1ms 250us");
        assert_eq!(m.latency("ReadVersions"), Some(Duration::from_micros(1250)));
        assert_eq!(m.latency("WriteVersions"), None);
    }

    #[test]
    fn test_format_latency_drops_nanos() {
        assert_eq!(format_latency(Duration::from_nanos(1_999)), "1us");
        assert_eq!(format_latency(Duration::ZERO), "0s");
    }

    #[test]
    fn test_json_shape() {
        let mut m = DiskMetrics::default();
        assert_eq!(serde_json::to_string(&m).unwrap(), "{}");

        m.record("DiskInfo", 1, Duration::from_millis(2));
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"apiLatencies":{"DiskInfo":"2ms"},"apiCalls":{"DiskInfo":1}}"#);
        let back: DiskMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
