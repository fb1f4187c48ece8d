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

//! Per-object namespace locks.
//!
//! Every `(bucket, object)` pair gets its own async reader/writer lock, created
//! on first use and dropped once nobody holds or waits for it. Distinct keys
//! never contend.

pub mod error;
pub mod guard;
pub mod namespace;
pub mod types;

pub use crate::{
    error::{LockError, Result},
    guard::NamespaceLockGuard,
    namespace::NamespaceLock,
    types::{LockType, ObjectKey},
};

/// Current version of the lock crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
