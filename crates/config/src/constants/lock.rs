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

/// Environment variable name that specifies how long a mutation waits for the per-object lock.
///
/// - Purpose: Bound the wait of write and read operations queued behind another holder of the same object key.
/// - Unit: seconds (u64).
/// - Valid values: any positive integer.
/// - Semantics: A caller that cannot acquire the lock within this time fails with a timeout and leaves the version history unchanged. A per-call deadline passed in the operation options takes precedence.
/// - Example: `export SHARDMETA_LOCK_ACQUIRE_TIMEOUT_SECS=10`
pub const ENV_LOCK_ACQUIRE_TIMEOUT_SECS: &str = "SHARDMETA_LOCK_ACQUIRE_TIMEOUT_SECS";

/// Default lock acquire timeout in seconds.
/// - Value: 30 seconds.
pub const DEFAULT_LOCK_ACQUIRE_TIMEOUT_SECS: u64 = 30;
