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

use crate::entry::{Entry, ErrKind};
use crate::error::Result;
use async_trait::async_trait;

/// A destination for log and audit entries.
#[async_trait]
pub trait Target: Send + Sync + 'static {
    /// Unique name of the target, used in diagnostics.
    fn identify(&self) -> String;

    /// Where entries go, e.g. a URL or `stdout`.
    fn endpoint(&self) -> String;

    /// Checks the configuration; registration is refused when this fails.
    async fn validate(&self) -> Result<()>;

    async fn send(&self, entry: &Entry, kind: ErrKind) -> Result<()>;
}
