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

use crate::error::{Result, to_object_err};
use crate::quorum::reduce_read_quorum_errs;
use crate::set_disk::SetDisks;
use futures::future::join_all;
use shardmeta_config::DEFAULT_LIST_LIMIT;
use shardmeta_filemeta::{FileInfo, FileInfoVersions, FilesInfo, FilesInfoVersions};
use std::collections::BTreeSet;
use tracing::instrument;

/// Page size for a requested limit; 0 means the default page.
pub fn page_limit(limit: usize) -> usize {
    if limit == 0 { DEFAULT_LIST_LIMIT } else { limit }
}

impl SetDisks {
    /// Latest live version of each object under `prefix`, ordered by name
    /// and starting strictly after `marker`.
    ///
    /// Objects whose latest version is a delete marker are skipped. There is
    /// no global snapshot: entries past the marker may reflect concurrent
    /// writes.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_objects(&self, volume: &str, prefix: &str, marker: &str, limit: usize) -> Result<FilesInfo> {
        let (files, is_truncated) = self
            .list_page(volume, prefix, marker, page_limit(limit), |versions| latest_live(&versions))
            .await?;
        Ok(FilesInfo { files, is_truncated })
    }

    /// Like [`SetDisks::list_objects`] but returns whole histories, delete
    /// markers included.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_object_versions(
        &self,
        volume: &str,
        prefix: &str,
        marker: &str,
        limit: usize,
    ) -> Result<FilesInfoVersions> {
        let (files_versions, is_truncated) = self
            .list_page(volume, prefix, marker, page_limit(limit), Some)
            .await?;
        Ok(FilesInfoVersions {
            files_versions,
            is_truncated,
        })
    }

    /// Collects up to `limit` entries, reading one past it to learn whether
    /// the listing is truncated.
    async fn list_page<T>(
        &self,
        volume: &str,
        prefix: &str,
        marker: &str,
        limit: usize,
        mut pick: impl FnMut(FileInfoVersions) -> Option<T>,
    ) -> Result<(Vec<T>, bool)> {
        let max_keys_plus_one = limit + 1;
        let mut entries = Vec::new();
        let mut cursor = marker.to_string();

        loop {
            let want = max_keys_plus_one - entries.len();
            let names = self.merge_object_names(volume, prefix, &cursor, want).await?;
            let exhausted = names.len() < want;

            for name in names {
                if let Some(entry) = self.read_listed(volume, &name).await?.and_then(&mut pick) {
                    entries.push(entry);
                }
                cursor = name;
                if entries.len() == max_keys_plus_one {
                    break;
                }
            }

            if exhausted || entries.len() == max_keys_plus_one {
                break;
            }
        }

        let is_truncated = entries.len() > limit;
        entries.truncate(limit);
        Ok((entries, is_truncated))
    }

    /// First `count` object names after `marker`, merged across the disks.
    async fn merge_object_names(&self, volume: &str, prefix: &str, marker: &str, count: usize) -> Result<Vec<String>> {
        let results = join_all(
            self.disks()
                .iter()
                .map(|disk| disk.list_objects(volume, prefix, marker, count)),
        )
        .await;

        let mut names = BTreeSet::new();
        let mut errs = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(listed) => {
                    names.extend(listed);
                    errs.push(None);
                }
                Err(err) => errs.push(Some(err)),
            }
        }

        if let Some(err) = reduce_read_quorum_errs(&errs, &[], self.read_quorum()) {
            return Err(to_object_err(err, &[volume]));
        }
        Ok(names.into_iter().take(count).collect())
    }

    async fn read_listed(&self, volume: &str, name: &str) -> Result<Option<FileInfoVersions>> {
        let _guard = self
            .read_lock(volume, name, "ListObjects", self.config().lock_acquire_timeout)
            .await?;
        self.read_versions(volume, name).await
    }
}

fn latest_live(versions: &FileInfoVersions) -> Option<FileInfo> {
    versions.latest().filter(|fi| !fi.deleted && !fi.mark_deleted).cloned()
}
