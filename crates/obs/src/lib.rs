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

//! Process logging for shardmeta.
//!
//! Call [`init_obs`] once at startup and keep the returned [`ObsGuard`] alive:
//!
//! ```no_run
//! let guard = shardmeta_obs::init_obs(&shardmeta_obs::ObsConfig::from_env())?;
//! tracing::info!("ready");
//! drop(guard);
//! # Ok::<(), shardmeta_obs::ObsError>(())
//! ```

mod config;
mod error;
mod telemetry;

pub use config::ObsConfig;
pub use error::ObsError;
pub use telemetry::{ObsGuard, init_obs};
