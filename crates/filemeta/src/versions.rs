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

use crate::{Error, FileInfo, Result, VersionPurgeStatusType};
use time::OffsetDateTime;
use tracing::debug;

/// The version history of one object, oldest first.
///
/// Entries are ordered by modification time; versions sharing a time keep
/// the order they were added in, so the last entry is always the newest.
/// Derived fields (`is_latest`, `successor_mod_time`, `num_versions`,
/// `latest_mod_time`) are recomputed by [`FileInfoVersions::mark_latest`]
/// after every mutation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileInfoVersions {
    pub volume: String,
    pub name: String,
    pub is_empty_dir: bool,
    // Mod time of the latest version
    pub latest_mod_time: Option<OffsetDateTime>,
    pub versions: Vec<FileInfo>,
}

/// One page of version histories.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilesInfoVersions {
    pub files_versions: Vec<FileInfoVersions>,
    pub is_truncated: bool,
}

/// Index of `version_id` in `history`.
///
/// An absent history or an empty id is "not found": callers treat that as
/// "use the latest version".
pub fn find_version_index(history: Option<&FileInfoVersions>, version_id: &str) -> Option<usize> {
    history.and_then(|h| h.find_version_index(version_id))
}

impl FileInfoVersions {
    pub fn new(volume: &str, name: &str) -> Self {
        Self {
            volume: volume.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn find_version_index(&self, version_id: &str) -> Option<usize> {
        if version_id.is_empty() {
            return None;
        }
        self.position(version_id)
    }

    /// Exact match, including the null version `""`.
    fn position(&self, version_id: &str) -> Option<usize> {
        self.versions.iter().position(|v| v.version_id == version_id)
    }

    /// The version with `is_latest` set.
    pub fn latest(&self) -> Option<&FileInfo> {
        self.versions.iter().find(|v| v.is_latest)
    }

    /// Looks up a version; an empty id means the null version.
    pub fn get(&self, version_id: &str) -> Option<&FileInfo> {
        self.position(version_id).map(|i| &self.versions[i])
    }

    /// Calculate the total size of all versions for this object
    pub fn size(&self) -> i64 {
        self.versions.iter().map(|v| v.size).sum()
    }

    /// Restores ordering and recomputes every derived field.
    ///
    /// Afterwards exactly one entry is latest when the history is non-empty:
    /// the newest entry not pending purge, or the newest entry when all of
    /// them are. Running it twice changes nothing.
    pub fn mark_latest(&mut self) {
        self.versions.sort_by(|a, b| a.mod_time.cmp(&b.mod_time));

        let count = self.versions.len();
        let latest = self
            .versions
            .iter()
            .rposition(|v| !v.mark_deleted)
            .or_else(|| count.checked_sub(1));

        let successors: Vec<Option<OffsetDateTime>> = (0..count)
            .map(|i| self.versions.get(i + 1).and_then(|next| next.mod_time))
            .collect();

        for (i, (v, successor)) in self.versions.iter_mut().zip(successors).enumerate() {
            v.is_latest = Some(i) == latest;
            v.successor_mod_time = successor;
            v.num_versions = count;
            v.volume.clone_from(&self.volume);
            v.name.clone_from(&self.name);
        }

        self.latest_mod_time = latest.and_then(|i| self.versions[i].mod_time);
    }

    /// Adds `fi`, replacing any entry with the same version id.
    pub fn add_version(&mut self, fi: FileInfo, max_versions: usize) -> Result<()> {
        match self.position(&fi.version_id) {
            Some(idx) => {
                debug!(volume = %self.volume, name = %self.name, version_id = %fi.version_id, "replacing version");
                self.versions.remove(idx);
            }
            None => self.check_capacity(max_versions)?,
        }

        self.versions.push(fi);
        self.mark_latest();
        Ok(())
    }

    /// Appends a delete marker and returns its index.
    ///
    /// A `now` older than the current head (clock skew between nodes) is
    /// raised to the head's time so the marker still sorts last.
    pub fn append_delete_marker(&mut self, version_id: &str, now: OffsetDateTime, max_versions: usize) -> Result<usize> {
        if self.position(version_id).is_some() {
            return Err(Error::InvalidArgument(format!("version {version_id:?} already exists")));
        }
        self.check_capacity(max_versions)?;

        let head_time = self.versions.last().and_then(|v| v.mod_time);
        let mod_time = match head_time {
            Some(head) if head > now => {
                debug!(volume = %self.volume, name = %self.name, %head, %now, "delete marker clock behind head");
                head
            }
            _ => now,
        };

        self.versions.push(FileInfo {
            volume: self.volume.clone(),
            name: self.name.clone(),
            version_id: version_id.to_string(),
            deleted: true,
            mod_time: Some(mod_time),
            ..Default::default()
        });
        self.mark_latest();

        Ok(self.versions.len() - 1)
    }

    /// Moves the purge status of `version_id` to `target`.
    ///
    /// The history is unchanged when the move is illegal.
    pub fn transition_purge_status(&mut self, version_id: &str, target: VersionPurgeStatusType) -> Result<()> {
        let idx = self.position(version_id).ok_or(Error::FileVersionNotFound)?;
        let fi = &mut self.versions[idx];
        let next = fi.version_purge_status.transition(target)?;
        fi.set_version_purge_status(next);
        Ok(())
    }

    /// Marks `version_id` deleted and pending purge, keeping it in place.
    pub fn mark_deleted(&mut self, version_id: &str) -> Result<()> {
        let idx = self.position(version_id).ok_or(Error::FileVersionNotFound)?;
        let fi = &mut self.versions[idx];
        let next = fi.version_purge_status.transition(VersionPurgeStatusType::Pending)?;
        fi.mark_deleted = true;
        fi.set_version_purge_status(next);
        self.mark_latest();
        Ok(())
    }

    pub fn remove_version(&mut self, version_id: &str) -> Option<FileInfo> {
        let idx = self.position(version_id)?;
        let removed = self.versions.remove(idx);
        self.mark_latest();
        Some(removed)
    }

    /// Drops every version whose purge completed.
    pub fn purge_completed(&mut self) -> Vec<FileInfo> {
        let (purged, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.versions)
            .into_iter()
            .partition(|v| v.version_purge_status.is_complete());
        self.versions = kept;
        self.mark_latest();
        purged
    }

    fn check_capacity(&self, max_versions: usize) -> Result<()> {
        if self.versions.len() >= max_versions {
            return Err(Error::MaxVersionsExceeded { max: max_versions });
        }
        Ok(())
    }
}
