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

//! Logging and audit sink boundary.
//!
//! Targets are registered once at startup through a [`TargetRegistryBuilder`];
//! the frozen [`TargetRegistry`] is then handed to whatever emits entries.
//! There is no way to remove a target.

mod console;
mod entry;
mod error;
mod http;
mod registry;
mod target;

pub use console::ConsoleTarget;
pub use entry::{ApiDetails, AuditEntry, Entry, ErrKind, LogEntry, LogLevel};
pub use error::{Result, TargetError};
pub use http::{DEFAULT_HTTP_TIMEOUT, HttpTarget};
pub use registry::{TargetRegistry, TargetRegistryBuilder};
pub use target::Target;
