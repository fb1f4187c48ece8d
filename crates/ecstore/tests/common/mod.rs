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

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use shardmeta_config::StorageConfig;
use shardmeta_disk::{DiskAPI, DiskError, DiskInfo, DiskOption, DiskStore, LocalDisk, Result, VolInfo};
use shardmeta_ecstore::SetDisks;
use shardmeta_filemeta::FileInfoVersions;
use shardmeta_logger::{ApiDetails, Entry, ErrKind, Target, TargetRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;

pub const BUCKET: &str = "photos";

/// A local disk whose faults can be switched on at runtime.
#[derive(Debug)]
pub struct FlakyDisk {
    inner: LocalDisk,
    offline: AtomicBool,
    fail_writes: AtomicBool,
    write_delay_ms: AtomicU64,
}

impl FlakyDisk {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DiskError::FaultyDisk);
        }
        Ok(())
    }

    async fn check_writable(&self) -> Result<()> {
        self.check_online()?;
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DiskError::FaultyDisk);
        }
        Ok(())
    }
}

#[async_trait]
impl DiskAPI for FlakyDisk {
    fn to_string(&self) -> String {
        DiskAPI::to_string(&self.inner)
    }

    fn endpoint(&self) -> String {
        self.inner.endpoint()
    }

    fn path(&self) -> PathBuf {
        self.inner.path()
    }

    async fn is_online(&self) -> bool {
        !self.offline.load(Ordering::SeqCst) && self.inner.is_online().await
    }

    async fn get_disk_id(&self) -> Result<Option<Uuid>> {
        self.check_online()?;
        self.inner.get_disk_id().await
    }

    async fn disk_info(&self) -> Result<DiskInfo> {
        self.check_online()?;
        self.inner.disk_info().await
    }

    async fn make_volume(&self, volume: &str) -> Result<()> {
        self.check_online()?;
        self.inner.make_volume(volume).await
    }

    async fn list_volumes(&self) -> Result<Vec<VolInfo>> {
        self.check_online()?;
        self.inner.list_volumes().await
    }

    async fn stat_volume(&self, volume: &str) -> Result<VolInfo> {
        self.check_online()?;
        self.inner.stat_volume(volume).await
    }

    async fn delete_volume(&self, volume: &str) -> Result<()> {
        self.check_online()?;
        self.inner.delete_volume(volume).await
    }

    async fn read_versions(&self, volume: &str, path: &str) -> Result<FileInfoVersions> {
        self.check_online()?;
        self.inner.read_versions(volume, path).await
    }

    async fn write_versions(&self, volume: &str, path: &str, versions: &FileInfoVersions) -> Result<()> {
        self.check_writable().await?;
        self.inner.write_versions(volume, path, versions).await
    }

    async fn delete_versions(&self, volume: &str, path: &str) -> Result<()> {
        self.check_writable().await?;
        self.inner.delete_versions(volume, path).await
    }

    async fn list_objects(&self, volume: &str, prefix: &str, marker: &str, limit: usize) -> Result<Vec<String>> {
        self.check_online()?;
        self.inner.list_objects(volume, prefix, marker, limit).await
    }
}

/// Audit target keeping every API record it receives.
#[derive(Default)]
pub struct AuditRecorder {
    pub seen: Mutex<Vec<ApiDetails>>,
}

#[async_trait]
impl Target for AuditRecorder {
    fn identify(&self) -> String {
        "audit-recorder".to_string()
    }

    fn endpoint(&self) -> String {
        "memory://audit".to_string()
    }

    async fn validate(&self) -> shardmeta_logger::Result<()> {
        Ok(())
    }

    async fn send(&self, entry: &Entry, _kind: ErrKind) -> shardmeta_logger::Result<()> {
        if let Entry::Audit(audit) = entry {
            self.seen.lock().push(audit.api.clone());
        }
        Ok(())
    }
}

impl AuditRecorder {
    pub fn api_names(&self) -> Vec<String> {
        self.seen.lock().iter().map(|api| api.name.clone()).collect()
    }
}

pub struct TestSet {
    pub set: Arc<SetDisks>,
    pub disks: Vec<Arc<FlakyDisk>>,
    pub audit: Arc<AuditRecorder>,
    _dirs: Vec<tempfile::TempDir>,
}

/// A set of `drives` local disks with `BUCKET` already created.
pub async fn new_set(drives: usize, config: StorageConfig) -> TestSet {
    let mut dirs = Vec::with_capacity(drives);
    let mut disks = Vec::with_capacity(drives);
    for _ in 0..drives {
        let dir = tempfile::tempdir().unwrap();
        let inner = LocalDisk::new(dir.path(), &DiskOption::default()).await.unwrap();
        disks.push(Arc::new(FlakyDisk {
            inner,
            offline: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            write_delay_ms: AtomicU64::new(0),
        }));
        dirs.push(dir);
    }

    let audit = Arc::new(AuditRecorder::default());
    let mut builder = TargetRegistry::builder();
    builder.add_audit_target(audit.clone()).await.unwrap();
    let registry = Arc::new(builder.build());

    let stores: Vec<DiskStore> = disks.iter().map(|d| d.clone() as DiskStore).collect();
    let set = Arc::new(SetDisks::new(stores, registry, config));
    set.make_volume(BUCKET).await.unwrap();

    TestSet {
        set,
        disks,
        audit,
        _dirs: dirs,
    }
}

pub async fn default_set(drives: usize) -> TestSet {
    new_set(drives, StorageConfig::default()).await
}
