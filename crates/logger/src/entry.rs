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
use time::OffsetDateTime;

/// Which class of error a log entry reports; targets may accept only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrKind {
    System,
    Application,
    #[default]
    All,
}

impl ErrKind {
    /// Whether a target configured for `self` takes entries of `kind`.
    pub fn accepts(self, kind: ErrKind) -> bool {
        self == ErrKind::All || kind == ErrKind::All || self == kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Fatal,
}

/// Standard log entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            time: OffsetDateTime::now_utc(),
            source: String::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// What a mutation touched and how it ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDetails {
    pub name: String,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_to_response: String,
}

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub trigger: String,
    pub api: ApiDetails,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl AuditEntry {
    pub const VERSION: &'static str = "1";

    pub fn new(api_name: &str, bucket: &str, object: &str) -> Self {
        AuditEntry {
            version: Self::VERSION.to_string(),
            time: OffsetDateTime::now_utc(),
            trigger: "internal".to_string(),
            api: ApiDetails {
                name: api_name.to_string(),
                bucket: bucket.to_string(),
                object: object.to_string(),
                ..Default::default()
            },
            tags: BTreeMap::new(),
        }
    }

    pub fn with_version_id(mut self, version_id: &str) -> Self {
        self.api.version_id = version_id.to_string();
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.api.status = status.to_string();
        self
    }

    pub fn with_time_to_response(mut self, elapsed: std::time::Duration) -> Self {
        self.api.time_to_response = humantime::format_duration(elapsed).to_string();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Anything a target can be asked to deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Audit(AuditEntry),
    Log(LogEntry),
}

impl Entry {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<LogEntry> for Entry {
    fn from(e: LogEntry) -> Self {
        Entry::Log(e)
    }
}

impl From<AuditEntry> for Entry {
    fn from(e: AuditEntry) -> Self {
        Entry::Audit(e)
    }
}
