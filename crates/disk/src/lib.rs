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

//! Disk layer of shardmeta: the [`DiskAPI`] abstraction, a directory-backed
//! [`LocalDisk`], per-API metrics and health reporting.

pub mod api;
pub mod error;
pub mod format;
pub mod health;
pub mod local;
pub mod metrics;

pub use api::{DiskAPI, DiskInfo, DiskStore, FORMAT_CONFIG_FILE, VolInfo};
pub use error::{DiskError, Error, Result};
pub use health::{HealthMonitor, snapshot};
pub use local::{DiskOption, LocalDisk};
pub use metrics::{DiskApi, DiskMetricsTracker};
