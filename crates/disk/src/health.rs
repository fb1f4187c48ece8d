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

//! Disk health reporting.
//!
//! Polling runs on its own tasks and never touches the object locks, so a
//! hung disk only delays its own report.

use crate::api::{DiskInfo, DiskStore};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Reads the current state of `disk`.
///
/// Never fails: a disk error or a timeout is reported through
/// `DiskInfo::error`, with the endpoint and mount path still filled in.
pub async fn snapshot(disk: &DiskStore, timeout: Duration) -> DiskInfo {
    let error = match tokio::time::timeout(timeout, disk.disk_info()).await {
        Ok(Ok(info)) => return info,
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("disk info timed out after {}", humantime::format_duration(timeout)),
    };

    warn!(disk = %disk.to_string(), %error, "disk health check failed");
    unreachable_info(disk, error)
}

fn unreachable_info(disk: &DiskStore, error: String) -> DiskInfo {
    DiskInfo {
        endpoint: disk.endpoint(),
        mount_path: disk.path().to_string_lossy().to_string(),
        error,
        ..Default::default()
    }
}

/// Periodic health polling of a set of disks, one task per disk.
pub struct HealthMonitor {
    receivers: Vec<watch::Receiver<DiskInfo>>,
    handles: Vec<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Starts polling every disk each `interval` until `cancel` fires.
    pub fn start(disks: Vec<DiskStore>, interval: Duration, timeout: Duration, cancel: CancellationToken) -> Self {
        let mut receivers = Vec::with_capacity(disks.len());
        let mut handles = Vec::with_capacity(disks.len());

        for disk in disks {
            let (tx, rx) = watch::channel(unreachable_info(&disk, "not polled yet".to_string()));
            receivers.push(rx);

            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {
                            let info = tokio::select! {
                                _ = cancel.cancelled() => break,
                                info = snapshot(&disk, timeout) => info,
                            };
                            if tx.send(info).is_err() {
                                break;
                            }
                        }
                    }
                }
                debug!(disk = %disk.to_string(), "health monitor stopped");
            }));
        }

        Self { receivers, handles }
    }

    /// Last report of every disk, in the order the disks were given.
    pub fn latest(&self) -> Vec<DiskInfo> {
        self.receivers.iter().map(|rx| rx.borrow().clone()).collect()
    }

    /// Change feed of one disk.
    pub fn subscribe(&self, index: usize) -> Option<watch::Receiver<DiskInfo>> {
        self.receivers.get(index).cloned()
    }

    /// Waits for every polling task to exit after cancellation.
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
