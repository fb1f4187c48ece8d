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

use thiserror::Error;

pub type Result<T> = core::result::Result<T, TargetError>;

/// Error types for targets
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for TargetError {
    fn from(err: serde_json::Error) -> Self {
        TargetError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for TargetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_status() {
            TargetError::Request(err.to_string())
        } else {
            TargetError::Network(err.to_string())
        }
    }
}
