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
use crate::target::Target;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::Write;

/// Writes each entry as one JSON line.
pub struct ConsoleTarget {
    name: String,
    kind: ErrKind,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleTarget {
    /// Console target on stdout taking every kind of entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_writer(name, ErrKind::All, Box::new(std::io::stdout()))
    }

    pub fn with_writer(name: impl Into<String>, kind: ErrKind, writer: Box<dyn Write + Send>) -> Self {
        Self {
            name: name.into(),
            kind,
            writer: Mutex::new(writer),
        }
    }
}

impl std::fmt::Debug for ConsoleTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleTarget")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Target for ConsoleTarget {
    fn identify(&self) -> String {
        self.name.clone()
    }

    fn endpoint(&self) -> String {
        "console".to_string()
    }

    async fn validate(&self) -> Result<()> {
        Ok(())
    }

    async fn send(&self, entry: &Entry, kind: ErrKind) -> Result<()> {
        if !self.kind.accepts(kind) {
            return Ok(());
        }
        let mut line = entry.to_json()?;
        line.push('\n');

        let mut w = self.writer.lock();
        w.write_all(line.as_bytes())?;
        w.flush()?;
        Ok(())
    }
}
