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

//! Erasure set for shardmeta.
//!
//! [`SetDisks`] owns the disks of one erasure set and serializes every change
//! to an object's version history behind a per-object lock. Histories are
//! written to all disks and only count as stored at write quorum; a write
//! that falls short is rolled back.

pub mod error;
mod options;
mod quorum;
mod set_disk;
mod store_list_objects;

pub use error::{Error, Result, StorageError, to_object_err};
pub use options::ObjectOptions;
pub use set_disk::SetDisks;
pub use store_list_objects::page_limit;
