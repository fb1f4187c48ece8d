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

// Observability Keys

pub const ENV_OBS_LOGGER_LEVEL: &str = "SHARDMETA_OBS_LOGGER_LEVEL";
pub const ENV_OBS_LOG_DIRECTORY: &str = "SHARDMETA_OBS_LOG_DIRECTORY";
pub const ENV_OBS_LOG_FILENAME: &str = "SHARDMETA_OBS_LOG_FILENAME";
pub const ENV_OBS_LOG_JSON: &str = "SHARDMETA_OBS_LOG_JSON";

/// Default values for observability configuration
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_OBS_LOG_FILENAME: &str = "shardmeta.log";
pub const DEFAULT_OBS_LOG_JSON: bool = true;
