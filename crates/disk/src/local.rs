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

use crate::api::{DiskAPI, DiskInfo, FORMAT_CONFIG_FILE, VolInfo};
use crate::error::{DiskError, Result, to_file_error, to_volume_error};
use crate::format::{FormatV1, decode_xl_meta, encode_xl_meta};
use crate::metrics::{DiskApi, DiskMetricsTracker};
use shardmeta_config::{SYSTEM_META_DIR, XL_META_FILE};
use shardmeta_filemeta::FileInfoVersions;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const TMP_DIR: &str = "tmp";
const HEALING_TRACKER_FILE: &str = ".healing.bin";

#[derive(Debug, Clone, Default)]
pub struct DiskOption {
    /// Reported endpoint; the disk path when unset.
    pub endpoint: Option<String>,
    /// Disks at most this large count as root disks; 0 compares the device with `/`.
    pub root_disk_threshold: u64,
}

/// A disk backed by a local directory.
///
/// Each volume is a directory under the root; each object is a directory
/// holding one `xl.meta` with its whole version history.
#[derive(Debug)]
pub struct LocalDisk {
    root: PathBuf,
    endpoint: String,
    format: FormatV1,
    root_disk_threshold: u64,
    metrics: DiskMetricsTracker,
}

impl LocalDisk {
    /// Opens the disk at `root`, formatting it on first use.
    pub async fn new(root: impl Into<PathBuf>, opt: &DiskOption) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        if !tokio::fs::metadata(&root).await?.is_dir() {
            return Err(DiskError::DiskNotDir);
        }

        let sys_dir = root.join(SYSTEM_META_DIR);
        tokio::fs::create_dir_all(sys_dir.join(TMP_DIR)).await?;

        let format_path = sys_dir.join(FORMAT_CONFIG_FILE);
        let format = match tokio::fs::read(&format_path).await {
            Ok(buf) => FormatV1::from_json(&buf)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let format = FormatV1::new();
                write_atomic(&sys_dir.join(TMP_DIR), &format_path, &format.to_json()?).await?;
                info!(disk = %root.display(), id = %format.id, "formatted new disk");
                format
            }
            Err(e) => return Err(e.into()),
        };

        let endpoint = opt.endpoint.clone().unwrap_or_else(|| root.to_string_lossy().to_string());

        Ok(Self {
            root,
            endpoint,
            format,
            root_disk_threshold: opt.root_disk_threshold,
            metrics: DiskMetricsTracker::new(),
        })
    }

    /// Subdirectories of `dir` (object path `rel`) that can still hold names
    /// under `prefix` after `marker`, sorted descending by key.
    async fn scan_dir(&self, dir: &Path, rel: &str, prefix: &str, marker: &str) -> Result<Vec<WalkEntry>> {
        let mut read_dir = match tokio::fs::read_dir(dir).await {
            Ok(read_dir) => read_dir,
            // removed by a concurrent delete
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = format!("{rel}{}", entry.file_name().to_string_lossy());
            let key = format!("{name}/");
            let path = entry.path();

            if name.starts_with(prefix) && name.as_str() > marker && tokio::fs::try_exists(path.join(XL_META_FILE)).await? {
                entries.push(WalkEntry::Object(name));
            }

            // Every name below `key` starts with it, so the subtree is at or
            // before the marker unless the key sorts after it or prefixes it.
            let in_prefix = key.starts_with(prefix) || prefix.starts_with(key.as_str());
            let after_marker = key.as_str() > marker || marker.starts_with(key.as_str());
            if in_prefix && after_marker {
                entries.push(WalkEntry::Dir(path, key));
            }
        }

        entries.sort_by(|a, b| b.key().cmp(a.key()));
        Ok(entries)
    }

    pub fn metrics(&self) -> &DiskMetricsTracker {
        &self.metrics
    }

    fn is_valid_volname(volname: &str) -> bool {
        if volname.len() < 3 || volname.len() > 63 {
            return false;
        }
        if volname == SYSTEM_META_DIR || volname.starts_with('.') {
            return false;
        }
        !volname.contains(['/', '\\'])
    }

    fn get_bucket_path(&self, volume: &str) -> Result<PathBuf> {
        if !Self::is_valid_volname(volume) {
            return Err(DiskError::InvalidVolumeName(volume.to_string()));
        }
        Ok(self.root.join(volume))
    }

    fn get_object_path(&self, volume: &str, path: &str) -> Result<PathBuf> {
        let rel = Path::new(path);
        let valid = !path.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(DiskError::InvalidPath);
        }
        Ok(self.get_bucket_path(volume)?.join(rel))
    }

    fn tmp_dir(&self) -> PathBuf {
        self.root.join(SYSTEM_META_DIR).join(TMP_DIR)
    }

    async fn check_volume(&self, volume_dir: &Path) -> Result<()> {
        match tokio::fs::metadata(volume_dir).await {
            Ok(m) if m.is_dir() => Ok(()),
            Ok(_) => Err(DiskError::VolumeNotFound),
            Err(e) => Err(to_volume_error(e)),
        }
    }

    fn is_root_disk(&self, total: u64) -> bool {
        if self.root_disk_threshold > 0 {
            return total <= self.root_disk_threshold;
        }
        shardmeta_utils::os::same_disk(&self.root.to_string_lossy(), "/").unwrap_or_default()
    }
}

/// Writes through a temp file and a rename so readers never see a partial file.
async fn write_atomic(tmp_dir: &Path, dst: &Path, buf: &[u8]) -> Result<()> {
    let tmp = tmp_dir.join(Uuid::new_v4().to_string());
    let mut f = tokio::fs::File::create(&tmp).await.map_err(to_file_error)?;
    let res = async {
        f.write_all(buf).await?;
        f.sync_all().await?;
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&tmp, dst).await
    }
    .await;

    if let Err(e) = res {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(to_file_error(e));
    }
    Ok(())
}

// Removes now-empty directories from `dir` up to, not including, `stop`.
/// An object name, or a directory still to walk keyed by its `rel/` path.
#[derive(Debug)]
enum WalkEntry {
    Object(String),
    Dir(PathBuf, String),
}

impl WalkEntry {
    fn key(&self) -> &str {
        match self {
            WalkEntry::Object(name) => name,
            WalkEntry::Dir(_, key) => key,
        }
    }
}

async fn remove_empty_parents(mut dir: PathBuf, stop: &Path) {
    while dir != stop && dir.starts_with(stop) {
        if tokio::fs::remove_dir(&dir).await.is_err() {
            break;
        }
        if !dir.pop() {
            break;
        }
    }
}

fn modified_time(meta: &std::fs::Metadata) -> Option<OffsetDateTime> {
    meta.created().or_else(|_| meta.modified()).ok().map(OffsetDateTime::from)
}

#[async_trait::async_trait]
impl DiskAPI for LocalDisk {
    fn to_string(&self) -> String {
        self.root.to_string_lossy().to_string()
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    fn path(&self) -> PathBuf {
        self.root.clone()
    }

    async fn is_online(&self) -> bool {
        tokio::fs::metadata(self.root.join(SYSTEM_META_DIR).join(FORMAT_CONFIG_FILE))
            .await
            .is_ok()
    }

    async fn get_disk_id(&self) -> Result<Option<Uuid>> {
        Ok(Some(self.format.id))
    }

    #[tracing::instrument(skip(self))]
    async fn disk_info(&self) -> Result<DiskInfo> {
        let _timer = self.metrics.start(DiskApi::DiskInfo);

        let root = self.root.clone();
        let info = tokio::task::spawn_blocking(move || shardmeta_utils::os::get_info(root)).await??;
        let healing = tokio::fs::metadata(self.root.join(SYSTEM_META_DIR).join(HEALING_TRACKER_FILE))
            .await
            .is_ok();

        Ok(DiskInfo {
            total: info.total,
            free: info.free,
            used: info.used,
            used_inodes: info.used_inodes(),
            free_inodes: info.ffree,
            fs_type: info.fstype.clone(),
            root_disk: self.is_root_disk(info.total),
            healing,
            endpoint: self.endpoint.clone(),
            mount_path: self.root.to_string_lossy().to_string(),
            id: Some(self.format.id),
            metrics: self.metrics.snapshot(),
            error: String::new(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn make_volume(&self, volume: &str) -> Result<()> {
        let _timer = self.metrics.start(DiskApi::MakeVolume);
        let volume_dir = self.get_bucket_path(volume)?;

        tokio::fs::create_dir(&volume_dir).await.map_err(|e| {
            if e.kind() != ErrorKind::AlreadyExists {
                error!("local disk make volume failed: {e}");
            }
            to_volume_error(e)
        })
    }

    #[tracing::instrument(skip(self))]
    async fn list_volumes(&self) -> Result<Vec<VolInfo>> {
        let _timer = self.metrics.start(DiskApi::ListVolumes);
        let mut volumes = Vec::new();

        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(to_volume_error)?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !Self::is_valid_volname(&name) {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_dir() {
                continue;
            }
            volumes.push(VolInfo {
                name,
                created: modified_time(&meta),
            });
        }

        volumes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(volumes)
    }

    #[tracing::instrument(skip(self))]
    async fn stat_volume(&self, volume: &str) -> Result<VolInfo> {
        let _timer = self.metrics.start(DiskApi::StatVolume);
        let volume_dir = self.get_bucket_path(volume)?;
        let meta = tokio::fs::metadata(&volume_dir).await.map_err(to_volume_error)?;
        if !meta.is_dir() {
            return Err(DiskError::VolumeNotFound);
        }

        Ok(VolInfo {
            name: volume.to_string(),
            created: modified_time(&meta),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_volume(&self, volume: &str) -> Result<()> {
        let _timer = self.metrics.start(DiskApi::DeleteVolume);
        let volume_dir = self.get_bucket_path(volume)?;
        tokio::fs::remove_dir(&volume_dir).await.map_err(to_volume_error)
    }

    #[tracing::instrument(skip(self))]
    async fn read_versions(&self, volume: &str, path: &str) -> Result<FileInfoVersions> {
        let _timer = self.metrics.start(DiskApi::ReadVersions);
        let volume_dir = self.get_bucket_path(volume)?;
        let file_path = self.get_object_path(volume, path)?.join(XL_META_FILE);

        let buf = match tokio::fs::read(&file_path).await {
            Ok(buf) => buf,
            Err(e) => {
                self.check_volume(&volume_dir).await?;
                return Err(to_file_error(e));
            }
        };

        decode_xl_meta(&buf).inspect_err(|e| warn!(volume, path, "unreadable xl.meta: {e}"))
    }

    #[tracing::instrument(skip(self, versions))]
    async fn write_versions(&self, volume: &str, path: &str, versions: &FileInfoVersions) -> Result<()> {
        let _timer = self.metrics.start(DiskApi::WriteVersions);
        let volume_dir = self.get_bucket_path(volume)?;
        let file_path = self.get_object_path(volume, path)?.join(XL_META_FILE);
        self.check_volume(&volume_dir).await?;

        let buf = encode_xl_meta(versions)?;
        write_atomic(&self.tmp_dir(), &file_path, &buf).await?;
        debug!(volume, path, versions = versions.versions.len(), "wrote xl.meta");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_versions(&self, volume: &str, path: &str) -> Result<()> {
        let _timer = self.metrics.start(DiskApi::DeleteVersions);
        let volume_dir = self.get_bucket_path(volume)?;
        let object_dir = self.get_object_path(volume, path)?;

        if let Err(e) = tokio::fs::remove_file(object_dir.join(XL_META_FILE)).await {
            self.check_volume(&volume_dir).await?;
            return Err(to_file_error(e));
        }
        remove_empty_parents(object_dir, &volume_dir).await;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list_objects(&self, volume: &str, prefix: &str, marker: &str, limit: usize) -> Result<Vec<String>> {
        let _timer = self.metrics.start(DiskApi::ListObjects);
        let volume_dir = self.get_bucket_path(volume)?;
        self.check_volume(&volume_dir).await?;

        let mut names = Vec::new();
        if limit == 0 {
            return Ok(names);
        }

        // Depth-first in name order: each frame holds one directory's
        // entries sorted descending so `pop` yields the smallest key.
        let mut stack = vec![self.scan_dir(&volume_dir, "", prefix, marker).await?];
        while let Some(frame) = stack.last_mut() {
            let Some(entry) = frame.pop() else {
                stack.pop();
                continue;
            };
            match entry {
                WalkEntry::Object(name) => {
                    names.push(name);
                    if names.len() == limit {
                        break;
                    }
                }
                WalkEntry::Dir(path, key) => {
                    let frame = self.scan_dir(&path, &key, prefix, marker).await?;
                    stack.push(frame);
                }
            }
        }

        Ok(names)
    }
}
