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

/// Environment variable name that overrides the parity shard count of new versions.
///
/// - Purpose: Choose how many of the drives in a set hold parity.
/// - Unit: number of drives (usize).
/// - Valid values: 1 up to half of the set size.
/// - Semantics: Out of range values fall back to the computed default.
/// - Example: `export SHARDMETA_STORAGE_CLASS_PARITY=2`
pub const ENV_STORAGE_CLASS_PARITY: &str = "SHARDMETA_STORAGE_CLASS_PARITY";

/// Environment variable name that caps the number of versions kept per object.
///
/// - Purpose: Reject writes that would grow a version history beyond this length.
/// - Unit: number of versions (usize).
/// - Example: `export SHARDMETA_API_OBJECT_MAX_VERSIONS=1000`
pub const ENV_API_OBJECT_MAX_VERSIONS: &str = "SHARDMETA_API_OBJECT_MAX_VERSIONS";

/// Largest parity count picked automatically.
pub const DEFAULT_MAX_PARITY_BLOCKS: usize = 4;

/// Default maximum number of versions per object.
pub const DEFAULT_API_OBJECT_MAX_VERSIONS: usize = 10_000;
