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

/// Environment variable name that specifies the drive health poll interval in seconds.
///
/// - Purpose: Control how often the health monitor refreshes the capacity and latency snapshot of every drive.
/// - Unit: seconds (u64).
/// - Valid values: any positive integer.
/// - Semantics: Each drive is polled on its own task, so a slow drive does not delay the others.
/// - Example: `export SHARDMETA_DRIVE_HEALTH_INTERVAL_SECS=30`
pub const ENV_DRIVE_HEALTH_INTERVAL_SECS: &str = "SHARDMETA_DRIVE_HEALTH_INTERVAL_SECS";

/// Environment variable name that specifies the timeout of a single drive health check in seconds.
///
/// - Purpose: Bound a check against a hung drive.
/// - Unit: seconds (u64).
/// - Semantics: A check that exceeds the timeout is reported with its error field set; it is never treated as a failure of the poll cycle.
/// - Example: `export SHARDMETA_DRIVE_HEALTH_TIMEOUT_SECS=5`
pub const ENV_DRIVE_HEALTH_TIMEOUT_SECS: &str = "SHARDMETA_DRIVE_HEALTH_TIMEOUT_SECS";

/// Environment variable name for the root disk detection threshold in bytes.
///
/// - Purpose: Treat a drive smaller than this size as the root disk.
/// - Unit: bytes (u64).
/// - Semantics: 0 disables the size check and the drive is compared against the device of `/` instead.
/// - Example: `export SHARDMETA_ROOT_DISK_THRESHOLD=1073741824`
pub const ENV_ROOT_DISK_THRESHOLD: &str = "SHARDMETA_ROOT_DISK_THRESHOLD";

/// Default drive health poll interval in seconds.
pub const DEFAULT_DRIVE_HEALTH_INTERVAL_SECS: u64 = 15;

/// Default drive health check timeout in seconds.
pub const DEFAULT_DRIVE_HEALTH_TIMEOUT_SECS: u64 = 5;

/// Default root disk threshold: compare devices.
pub const DEFAULT_ROOT_DISK_THRESHOLD: u64 = 0;
