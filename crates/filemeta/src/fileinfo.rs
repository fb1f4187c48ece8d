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

use crate::{
    Error, ReplicationStatusType, Result, VERSION_PURGE_STATUS_KEY, VersionPurgeStatusType, is_valid_distribution,
    resolve_distribution,
};
use bytes::Bytes;
use shardmeta_utils::HashAlgorithm;
use std::collections::HashMap;
use time::OffsetDateTime;

pub const ERASURE_ALGORITHM: &str = "rs-vandermonde";
pub const BLOCK_SIZE_V2: usize = 1024 * 1024; // 1M

/// Version id of the unversioned object on the wire and in listings.
pub const NULL_VERSION_ID: &str = "null";

/// `get_data_dir` value of delete markers.
pub const DELETE_MARKER_DATA_DIR: &str = "delete-marker";

pub const TRANSITION_COMPLETE: &str = "complete";
pub const TRANSITION_PENDING: &str = "pending";

pub const RESERVED_METADATA_PREFIX_LOWER: &str = "x-shardmeta-internal-";

#[derive(Debug, PartialEq, Clone, Default)]
pub struct ObjectPartInfo {
    pub number: usize,
    pub size: usize,
    // Original data size
    pub actual_size: i64,
    pub etag: String,
    pub checksum: String,
}

#[derive(Debug, PartialEq, Default, Clone)]
// ChecksumInfo - carries checksums of individual scattered parts per disk.
pub struct ChecksumInfo {
    pub part_number: usize,
    pub algorithm: HashAlgorithm,
    pub hash: Bytes,
}

#[derive(Debug, PartialEq, Default, Clone)]
// ErasureInfo holds erasure coding and bitrot related information.
pub struct ErasureInfo {
    // Algorithm is the String representation of erasure-coding-algorithm
    pub algorithm: String,
    pub data_blocks: usize,
    pub parity_blocks: usize,
    // BlockSize is the size of one erasure-coded block
    pub block_size: usize,
    // Index is the index of the current disk, 0 when not bound to a disk
    pub index: usize,
    // Set once, read-only afterwards; see `set_distribution`.
    pub(crate) distribution: Vec<usize>,
    pub checksums: Vec<ChecksumInfo>,
}

pub fn calc_shard_size(block_size: usize, data_shards: usize) -> usize {
    (block_size.div_ceil(data_shards) + 1) & !1
}

impl ErasureInfo {
    /// Erasure parameters for a new version, distribution left unset.
    pub fn new(data_blocks: usize, parity_blocks: usize) -> Self {
        Self {
            algorithm: ERASURE_ALGORITHM.to_string(),
            data_blocks,
            parity_blocks,
            block_size: BLOCK_SIZE_V2,
            ..Default::default()
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.data_blocks + self.parity_blocks
    }

    /// Shard position to disk slot mapping (1-based slots).
    pub fn distribution(&self) -> &[usize] {
        &self.distribution
    }

    /// Fixes the layout of this version. Only the first call succeeds.
    pub fn set_distribution(&mut self, distribution: Vec<usize>) -> Result<()> {
        if !self.distribution.is_empty() {
            return Err(Error::DistributionImmutable);
        }
        if !is_valid_distribution(&distribution, self.total_blocks()) {
            return Err(Error::InvalidArgument(format!(
                "distribution {distribution:?} is not a permutation of 1..={}",
                self.total_blocks()
            )));
        }
        self.distribution = distribution;
        Ok(())
    }

    pub fn get_checksum_info(&self, part_number: usize) -> ChecksumInfo {
        for sum in &self.checksums {
            if sum.part_number == part_number {
                return sum.clone();
            }
        }

        ChecksumInfo {
            part_number,
            algorithm: HashAlgorithm::HighwayHash256,
            ..Default::default()
        }
    }

    /// Calculate the size of each shard.
    pub fn shard_size(&self) -> usize {
        calc_shard_size(self.block_size, self.data_blocks)
    }

    /// Returns the final erasure size from the original size
    pub fn shard_file_size(&self, total_length: i64) -> i64 {
        if total_length == 0 {
            return 0;
        }

        if total_length < 0 {
            return total_length;
        }

        let total_length = total_length as usize;

        let num_shards = total_length / self.block_size;
        let last_block_size = total_length % self.block_size;
        let last_shard_size = calc_shard_size(last_block_size, self.data_blocks);
        (num_shards * self.shard_size() + last_shard_size) as i64
    }

    pub fn equals(&self, other: &ErasureInfo) -> bool {
        self.algorithm == other.algorithm
            && self.data_blocks == other.data_blocks
            && self.parity_blocks == other.parity_blocks
            && self.block_size == other.block_size
            && self.index == other.index
            && self.distribution == other.distribution
    }
}

/// One version of one object.
///
/// `version_id` is empty for the unversioned (null) version.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct FileInfo {
    pub volume: String,
    pub name: String,
    pub version_id: String,
    pub is_latest: bool,
    // Delete marker of a versioned bucket
    pub deleted: bool,
    pub transition_status: String,
    pub data_dir: String,
    // Still in the legacy single-version format
    pub xlv1: bool,
    // For delete markers: when the object was deleted
    pub mod_time: Option<OffsetDateTime>,
    pub size: i64,
    // File mode bits
    pub mode: u32,
    pub metadata: HashMap<String, String>,
    pub parts: Vec<ObjectPartInfo>,
    pub erasure: ErasureInfo,
    // MarkDeleted marks this version as deleted, waiting for purge
    pub mark_deleted: bool,
    pub delete_marker_replication_status: ReplicationStatusType,
    pub version_purge_status: VersionPurgeStatusType,
    pub data: Option<Bytes>,
    pub num_versions: usize,
    pub successor_mod_time: Option<OffsetDateTime>,
}

impl FileInfo {
    /// Allocates a version record with a freshly resolved erasure layout.
    pub fn new(object: &str, data_blocks: usize, parity_blocks: usize) -> Result<Self> {
        let mut erasure = ErasureInfo::new(data_blocks, parity_blocks);
        erasure.set_distribution(resolve_distribution(object, erasure.total_blocks())?)?;

        Ok(Self {
            name: object.to_string(),
            erasure,
            ..Default::default()
        })
    }

    pub fn is_valid(&self) -> bool {
        if self.deleted {
            return true;
        }

        let data_blocks = self.erasure.data_blocks;
        let parity_blocks = self.erasure.parity_blocks;
        let total = data_blocks + parity_blocks;

        data_blocks >= parity_blocks
            && data_blocks > 0
            && self.erasure.index <= total
            && is_valid_distribution(&self.erasure.distribution, total)
    }

    pub fn get_etag(&self) -> Option<String> {
        self.metadata.get("etag").cloned()
    }

    pub fn write_quorum(&self, quorum: usize) -> usize {
        if self.deleted {
            return quorum;
        }

        if self.erasure.data_blocks == self.erasure.parity_blocks {
            return self.erasure.data_blocks + 1;
        }

        self.erasure.data_blocks
    }

    /// Read quorum returns expected read quorum for this FileInfo
    pub fn read_quorum(&self, dquorum: usize) -> usize {
        if self.deleted {
            return dquorum;
        }
        self.erasure.data_blocks
    }

    /// Adds or replaces part `num`; parts stay sorted by number.
    pub fn add_object_part(&mut self, num: usize, etag: String, part_size: usize, actual_size: i64) {
        let part = ObjectPartInfo {
            number: num,
            size: part_size,
            actual_size,
            etag,
            ..Default::default()
        };

        for p in self.parts.iter_mut() {
            if p.number == num {
                *p = part;
                return;
            }
        }

        self.parts.push(part);

        self.parts.sort_by(|a, b| a.number.cmp(&b.number));
    }

    // to_part_offset gets the part index where offset is located, returns part index and offset
    pub fn to_part_offset(&self, offset: usize) -> Result<(usize, usize)> {
        if offset == 0 {
            return Ok((0, 0));
        }

        let mut part_offset = offset;
        for (i, part) in self.parts.iter().enumerate() {
            if part_offset < part.size {
                return Ok((i, part_offset));
            }

            part_offset -= part.size
        }

        Err(Error::other("part not found"))
    }

    pub fn set_inline_data(&mut self) {
        self.metadata
            .insert(format!("{RESERVED_METADATA_PREFIX_LOWER}inline-data"), "true".to_owned());
    }

    pub fn inline_data(&self) -> bool {
        self.metadata
            .contains_key(format!("{RESERVED_METADATA_PREFIX_LOWER}inline-data").as_str())
            && !self.is_remote()
    }

    /// Check if the object is remote (transitioned to another tier)
    pub fn is_remote(&self) -> bool {
        self.transition_status == TRANSITION_COMPLETE
    }

    pub fn get_data_dir(&self) -> String {
        if self.deleted {
            return DELETE_MARKER_DATA_DIR.to_string();
        }
        self.data_dir.clone()
    }

    /// Sets the purge status and mirrors it into the metadata.
    pub fn set_version_purge_status(&mut self, status: VersionPurgeStatusType) {
        if status.is_empty() {
            self.metadata.remove(VERSION_PURGE_STATUS_KEY);
        } else {
            self.metadata
                .insert(VERSION_PURGE_STATUS_KEY.to_string(), status.as_str().to_string());
        }
        self.version_purge_status = status;
    }

    /// Create a shallow copy with minimal information for READ MRF checks
    pub fn shallow_copy(&self) -> Self {
        Self {
            volume: self.volume.clone(),
            name: self.name.clone(),
            version_id: self.version_id.clone(),
            deleted: self.deleted,
            erasure: self.erasure.clone(),
            ..Default::default()
        }
    }

    /// Version id as shown to clients: `null` for the unversioned object.
    pub fn display_version_id(&self) -> &str {
        if self.version_id.is_empty() {
            NULL_VERSION_ID
        } else {
            &self.version_id
        }
    }
}

/// One page of latest versions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilesInfo {
    pub files: Vec<FileInfo>,
    pub is_truncated: bool,
}
