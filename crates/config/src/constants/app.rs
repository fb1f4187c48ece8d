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

/// Application name, used as the prefix of every environment variable.
pub const APP_NAME: &str = "shardmeta";

/// Crate version baked in at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the per-disk system directory holding format and temp files.
pub const SYSTEM_META_DIR: &str = ".shardmeta.sys";

/// Name of the per-object metadata file.
pub const XL_META_FILE: &str = "xl.meta";

/// Default page size of listing calls when the caller passes 0.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

pub const KI_B: usize = 1024;
pub const MI_B: usize = 1024 * 1024;
