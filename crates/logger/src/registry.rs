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

use crate::entry::{AuditEntry, Entry, ErrKind};
use crate::error::Result;
use crate::target::Target;
use std::sync::Arc;
use tracing::{info, warn};

/// Collects targets at startup. Every target is validated before it is kept.
#[derive(Default)]
pub struct TargetRegistryBuilder {
    targets: Vec<Arc<dyn Target>>,
    audit_targets: Vec<Arc<dyn Target>>,
}

impl TargetRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a general log target; refused with the validation error on failure.
    pub async fn add_target(&mut self, target: Arc<dyn Target>) -> Result<()> {
        target.validate().await?;
        info!(target_name = %target.identify(), endpoint = %target.endpoint(), "log target registered");
        self.targets.push(target);
        Ok(())
    }

    /// Registers an audit target; refused with the validation error on failure.
    pub async fn add_audit_target(&mut self, target: Arc<dyn Target>) -> Result<()> {
        target.validate().await?;
        info!(target_name = %target.identify(), endpoint = %target.endpoint(), "audit target registered");
        self.audit_targets.push(target);
        Ok(())
    }

    /// Freezes the collected targets. Targets cannot be removed afterwards.
    pub fn build(self) -> TargetRegistry {
        TargetRegistry {
            targets: self.targets,
            audit_targets: self.audit_targets,
        }
    }
}

/// Immutable fan-out over log and audit targets, shared by `Arc`.
#[derive(Default)]
pub struct TargetRegistry {
    targets: Vec<Arc<dyn Target>>,
    audit_targets: Vec<Arc<dyn Target>>,
}

impl std::fmt::Debug for TargetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |ts: &[Arc<dyn Target>]| ts.iter().map(|t| t.identify()).collect::<Vec<_>>();
        f.debug_struct("TargetRegistry")
            .field("targets", &names(&self.targets))
            .field("audit_targets", &names(&self.audit_targets))
            .finish()
    }
}

impl TargetRegistry {
    pub fn builder() -> TargetRegistryBuilder {
        TargetRegistryBuilder::new()
    }

    pub fn targets(&self) -> &[Arc<dyn Target>] {
        &self.targets
    }

    pub fn audit_targets(&self) -> &[Arc<dyn Target>] {
        &self.audit_targets
    }

    /// Sends to every log target in registration order and returns how many
    /// accepted the entry. A failing target does not stop the others.
    pub async fn send(&self, entry: &Entry, kind: ErrKind) -> usize {
        fan_out(&self.targets, entry, kind).await
    }

    /// Sends to every audit target in registration order.
    pub async fn send_audit(&self, entry: &AuditEntry) -> usize {
        if self.audit_targets.is_empty() {
            return 0;
        }
        fan_out(&self.audit_targets, &Entry::Audit(entry.clone()), ErrKind::All).await
    }
}

async fn fan_out(targets: &[Arc<dyn Target>], entry: &Entry, kind: ErrKind) -> usize {
    let mut delivered = 0;
    for target in targets {
        match target.send(entry, kind).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!(target_name = %target.identify(), endpoint = %target.endpoint(), "failed to send entry: {e}"),
        }
    }
    delivered
}
