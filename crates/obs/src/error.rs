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

/// Errors raised while setting up process logging.
#[derive(Debug, thiserror::Error)]
pub enum ObsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

impl From<tracing_subscriber::util::TryInitError> for ObsError {
    fn from(e: tracing_subscriber::util::TryInitError) -> Self {
        ObsError::AlreadyInitialized(e.to_string())
    }
}
