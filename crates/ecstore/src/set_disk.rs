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

use crate::error::{Result, StorageError, to_object_err};
use crate::options::{ObjectOptions, stored_version_id};
use crate::quorum::{reduce_read_quorum_errs, reduce_versions, reduce_write_quorum_errs};
use futures::future::join_all;
use shardmeta_config::StorageConfig;
use shardmeta_disk::{DiskError, DiskInfo, DiskStore, VolInfo};
use shardmeta_filemeta::{FileInfo, FileInfoVersions, VersionPurgeStatusType};
use shardmeta_lock::{NamespaceLock, NamespaceLockGuard, ObjectKey};
use shardmeta_logger::{AuditEntry, TargetRegistry};
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// One erasure set: the disks holding every shard of an object.
///
/// Each object's version history is mutated under its exclusive lock and
/// persisted to all disks, succeeding only at write quorum.
#[derive(Debug)]
pub struct SetDisks {
    disks: Vec<DiskStore>,
    registry: Arc<TargetRegistry>,
    config: StorageConfig,
    ns_lock: NamespaceLock,
}

impl SetDisks {
    pub fn new(disks: Vec<DiskStore>, registry: Arc<TargetRegistry>, config: StorageConfig) -> Self {
        info!(set_drive_count = disks.len(), "erasure set ready");
        Self {
            disks,
            registry,
            config,
            ns_lock: NamespaceLock::new(),
        }
    }

    pub fn disks(&self) -> &[DiskStore] {
        &self.disks
    }

    pub fn set_drive_count(&self) -> usize {
        self.disks.len()
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn write_quorum(&self) -> usize {
        self.disks.len() / 2 + 1
    }

    pub fn read_quorum(&self) -> usize {
        self.disks.len().div_ceil(2).max(1)
    }

    /// Object keys currently locked or waited on.
    pub fn active_locks(&self) -> usize {
        self.ns_lock.active_keys()
    }

    fn lock_timeout(&self, opts: &ObjectOptions) -> Duration {
        opts.lock_timeout.unwrap_or(self.config.lock_acquire_timeout)
    }

    pub(crate) async fn read_lock(&self, bucket: &str, object: &str, owner: &str, timeout: Duration) -> Result<NamespaceLockGuard> {
        Ok(self
            .ns_lock
            .get_read_lock(ObjectKey::new(bucket, object), owner, timeout)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn make_volume(&self, volume: &str) -> Result<()> {
        let results = join_all(self.disks.iter().map(|disk| disk.make_volume(volume))).await;
        let errs: Vec<Option<DiskError>> = results.into_iter().map(|r| r.err()).collect();

        if let Some(err) = reduce_write_quorum_errs(&errs, &[], self.write_quorum()) {
            return Err(to_object_err(err, &[volume]));
        }
        Ok(())
    }

    /// Volumes as reported by the first disk that answers.
    pub async fn list_volumes(&self) -> Result<Vec<VolInfo>> {
        let mut errs = Vec::with_capacity(self.disks.len());
        for disk in self.disks.iter() {
            match disk.list_volumes().await {
                Ok(vols) => return Ok(vols),
                Err(err) => {
                    debug!(disk = %disk.endpoint(), "list volumes failed: {err}");
                    errs.push(Some(err));
                }
            }
        }

        Err(reduce_read_quorum_errs(&errs, &[], self.read_quorum()).unwrap_or(StorageError::ErasureReadQuorum))
    }

    #[instrument(skip(self))]
    pub async fn stat_volume(&self, volume: &str) -> Result<VolInfo> {
        let results = join_all(self.disks.iter().map(|disk| disk.stat_volume(volume))).await;

        let mut errs = Vec::with_capacity(results.len());
        let mut info = None;
        for result in results {
            match result {
                Ok(vol) => {
                    info.get_or_insert(vol);
                    errs.push(None);
                }
                Err(err) => errs.push(Some(err)),
            }
        }

        if let Some(err) = reduce_read_quorum_errs(&errs, &[], self.read_quorum()) {
            return Err(to_object_err(err, &[volume]));
        }
        info.ok_or(StorageError::ErasureReadQuorum)
    }

    #[instrument(skip(self))]
    pub async fn delete_volume(&self, volume: &str) -> Result<()> {
        let results = join_all(self.disks.iter().map(|disk| disk.delete_volume(volume))).await;
        let errs: Vec<Option<DiskError>> = results.into_iter().map(|r| r.err()).collect();

        if let Some(err) = reduce_write_quorum_errs(&errs, &[], self.write_quorum()) {
            return Err(to_object_err(err, &[volume]));
        }
        Ok(())
    }

    /// Appends a version with a freshly resolved erasure layout and returns it.
    ///
    /// Versioned volumes get a new random version id unless `opts` names one;
    /// otherwise the null version is replaced.
    #[instrument(level = "debug", skip(self, opts))]
    pub async fn put_object_version(&self, bucket: &str, object: &str, size: i64, opts: &ObjectOptions) -> Result<FileInfo> {
        let started = Instant::now();
        check_mod_time(opts)?;

        let part_size = usize::try_from(size).map_err(|_| StorageError::InvalidArgument(format!("negative object size {size}")))?;
        let version_id = match opts.version_id() {
            Some("") => String::new(),
            Some(id) => Uuid::parse_str(id)
                .map_err(|_| StorageError::InvalidArgument(format!("invalid version id {id:?}")))?
                .to_string(),
            None if opts.versioned => Uuid::new_v4().to_string(),
            None => String::new(),
        };

        let parity_blocks = self.config.parity_blocks(self.disks.len());
        let data_blocks = self.disks.len() - parity_blocks;
        let mut fi = FileInfo::new(object, data_blocks, parity_blocks)?;
        fi.volume = bucket.to_string();
        fi.version_id.clone_from(&version_id);
        fi.size = size;
        fi.data_dir = Uuid::new_v4().to_string();
        fi.metadata.clone_from(&opts.user_defined);
        fi.add_object_part(1, String::new(), part_size, size);

        let max_versions = self.config.max_versions;
        let mod_time = opts.mod_time;
        let stored = self
            .update_versions("PutObject", bucket, object, &version_id, opts, |versions| {
                fi.mod_time = Some(mod_time.unwrap_or_else(OffsetDateTime::now_utc));
                let version_id = fi.version_id.clone();
                versions.add_version(fi, max_versions)?;
                stored_version(versions, &version_id)
            })
            .await?;

        self.audit("PutObject", bucket, object, &stored.version_id, started).await;
        Ok(stored)
    }

    /// Deletes an object or one of its versions.
    ///
    /// Without a version id a versioned volume gets a delete marker and an
    /// unversioned one loses its null version. With a version id that version
    /// is removed, or marked deleted and pending purge when
    /// `opts.replicate_delete` is set. Returns the marker or affected version.
    #[instrument(level = "debug", skip(self, opts))]
    pub async fn delete_object(&self, bucket: &str, object: &str, opts: &ObjectOptions) -> Result<FileInfo> {
        let started = Instant::now();
        check_mod_time(opts)?;
        let max_versions = self.config.max_versions;
        let requested = opts.version_id().map(str::to_owned);
        let replicate_delete = opts.replicate_delete;

        let affected = match requested {
            None if opts.versioned => {
                let marker_id = Uuid::new_v4().to_string();
                let now = opts.mod_time.unwrap_or_else(OffsetDateTime::now_utc);
                self.update_versions("DeleteObject", bucket, object, "", opts, |versions| {
                    versions.append_delete_marker(&marker_id, now, max_versions)?;
                    stored_version(versions, &marker_id)
                })
                .await?
            }
            None => {
                self.update_versions("DeleteObject", bucket, object, "", opts, |versions| {
                    versions.remove_version("").ok_or(StorageError::Disk(DiskError::FileNotFound))
                })
                .await?
            }
            Some(version_id) => {
                self.update_versions("DeleteObject", bucket, object, &version_id, opts, |versions| {
                    if replicate_delete {
                        versions.mark_deleted(&version_id)?;
                        stored_version(versions, &version_id)
                    } else {
                        versions
                            .remove_version(&version_id)
                            .ok_or(StorageError::Disk(DiskError::FileVersionNotFound))
                    }
                })
                .await?
            }
        };

        self.audit("DeleteObject", bucket, object, &affected.version_id, started).await;
        Ok(affected)
    }

    /// Moves a version's purge status; versions whose purge completed are
    /// dropped from the history.
    #[instrument(level = "debug", skip(self, opts))]
    pub async fn transition_purge_status(
        &self,
        bucket: &str,
        object: &str,
        version_id: &str,
        target: VersionPurgeStatusType,
        opts: &ObjectOptions,
    ) -> Result<()> {
        let started = Instant::now();
        let version_id = stored_version_id(version_id);
        self.update_versions("PurgeTransition", bucket, object, version_id, opts, |versions| {
            versions.transition_purge_status(version_id, target.clone())?;
            if target.is_complete() {
                let purged = versions.purge_completed();
                debug!(bucket, object, purged = purged.len(), remaining = versions.versions.len(), "purged versions");
            }
            Ok(())
        })
        .await?;

        self.audit("PurgeTransition", bucket, object, version_id, started).await;
        Ok(())
    }

    /// Full version history of an object.
    #[instrument(level = "debug", skip(self, opts))]
    pub async fn get_object_versions(&self, bucket: &str, object: &str, opts: &ObjectOptions) -> Result<FileInfoVersions> {
        let _guard = self.read_lock(bucket, object, "GetObjectVersions", self.lock_timeout(opts)).await?;
        self.read_versions(bucket, object)
            .await?
            .ok_or_else(|| StorageError::ObjectNotFound(bucket.to_string(), object.to_string()))
    }

    /// The requested version, or the latest one when `opts` names none.
    ///
    /// A latest delete marker reads as a missing object.
    #[instrument(level = "debug", skip(self, opts))]
    pub async fn get_object_info(&self, bucket: &str, object: &str, opts: &ObjectOptions) -> Result<FileInfo> {
        let versions = self.get_object_versions(bucket, object, opts).await?;

        match opts.version_id() {
            Some(version_id) => versions
                .get(version_id)
                .cloned()
                .ok_or_else(|| StorageError::VersionNotFound(bucket.to_string(), object.to_string(), version_id.to_string())),
            None => versions
                .latest()
                .filter(|fi| !fi.deleted)
                .cloned()
                .ok_or_else(|| StorageError::ObjectNotFound(bucket.to_string(), object.to_string())),
        }
    }

    /// Point-in-time health of every disk; unreachable disks carry an error.
    pub async fn storage_info(&self) -> Vec<DiskInfo> {
        let timeout = self.config.health_check_timeout;
        join_all(self.disks.iter().map(|disk| shardmeta_disk::snapshot(disk, timeout))).await
    }

    /// Runs `apply` on the object's history under its exclusive lock and
    /// persists the result. Nothing changes when `apply` fails.
    async fn update_versions<T, F>(
        &self,
        api: &str,
        bucket: &str,
        object: &str,
        version_id: &str,
        opts: &ObjectOptions,
        apply: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut FileInfoVersions) -> Result<T>,
    {
        let _guard = self
            .ns_lock
            .get_write_lock(ObjectKey::new(bucket, object), api, self.lock_timeout(opts))
            .await?;

        let previous = self.read_versions(bucket, object).await?;
        let mut versions = previous.clone().unwrap_or_else(|| FileInfoVersions::new(bucket, object));

        let out = apply(&mut versions).map_err(|err| {
            if err.is_contract_violation() {
                error!(bucket, object, version_id, api, "rejected version history change: {err}");
            }
            to_object_err(err, &[bucket, object, version_id])
        })?;

        self.commit_versions(bucket, object, previous.as_ref(), &versions).await?;
        Ok(out)
    }

    /// Reads the history a read quorum of disks agrees on. `None` when the
    /// object does not exist.
    pub(crate) async fn read_versions(&self, bucket: &str, object: &str) -> Result<Option<FileInfoVersions>> {
        let results = join_all(self.disks.iter().map(|disk| disk.read_versions(bucket, object))).await;
        reduce_versions(results, self.read_quorum()).map_err(|err| to_object_err(err, &[bucket, object]))
    }

    /// Writes `next` to every disk. Below write quorum the disks that took
    /// the write get `previous` back.
    async fn commit_versions(
        &self,
        bucket: &str,
        object: &str,
        previous: Option<&FileInfoVersions>,
        next: &FileInfoVersions,
    ) -> Result<()> {
        let results = join_all(self.disks.iter().map(|disk| store_versions(disk, bucket, object, Some(next)))).await;
        let errs: Vec<Option<DiskError>> = results.into_iter().map(|r| r.err()).collect();

        let Some(err) = reduce_write_quorum_errs(&errs, &[], self.write_quorum()) else {
            for (disk, err) in self.disks.iter().zip(&errs) {
                if let Some(err) = err {
                    warn!(disk = %disk.endpoint(), bucket, object, "version metadata write missed: {err}");
                }
            }
            return Ok(());
        };

        warn!(bucket, object, "write quorum not reached, restoring previous versions: {err}");
        let restores = self
            .disks
            .iter()
            .zip(&errs)
            .filter(|(_, err)| err.is_none())
            .map(|(disk, _)| async move {
                if let Err(e) = store_versions(disk, bucket, object, previous).await {
                    error!(disk = %disk.endpoint(), bucket, object, "restoring versions failed: {e}");
                }
            });
        join_all(restores).await;

        Err(to_object_err(err, &[bucket, object]))
    }

    async fn audit(&self, api: &str, bucket: &str, object: &str, version_id: &str, started: Instant) {
        let entry = AuditEntry::new(api, bucket, object)
            .with_version_id(version_id)
            .with_status("OK")
            .with_time_to_response(started.elapsed());
        self.registry.send_audit(&entry).await;
    }
}

/// Writes `versions` to one disk; an absent or empty history removes the metadata.
async fn store_versions(
    disk: &DiskStore,
    bucket: &str,
    object: &str,
    versions: Option<&FileInfoVersions>,
) -> shardmeta_disk::Result<()> {
    match versions {
        Some(versions) if !versions.is_empty() => disk.write_versions(bucket, object, versions).await,
        _ => match disk.delete_versions(bucket, object).await {
            Err(DiskError::FileNotFound) => Ok(()),
            result => result,
        },
    }
}

fn check_mod_time(opts: &ObjectOptions) -> Result<()> {
    match opts.mod_time {
        Some(t) => Ok(shardmeta_filemeta::wire::validate_time(t)?),
        None => Ok(()),
    }
}

fn stored_version(versions: &FileInfoVersions, version_id: &str) -> Result<FileInfo> {
    versions
        .get(version_id)
        .cloned()
        .ok_or(StorageError::Meta(shardmeta_filemeta::Error::Unexpected))
}
