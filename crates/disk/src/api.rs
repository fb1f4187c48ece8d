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

use crate::error::Result;
use serde::{Deserialize, Serialize};
use shardmeta_filemeta::FileInfoVersions;
use shardmeta_filemeta::wire::{TupleDecode, TupleEncode, TupleReader, TupleWriter};
use shardmeta_madmin::DiskMetrics;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

pub const FORMAT_CONFIG_FILE: &str = "format.json";

pub type DiskStore = Arc<dyn DiskAPI>;

/// Storage operations of one disk. Object paths are relative to a volume.
#[async_trait::async_trait]
pub trait DiskAPI: Debug + Send + Sync + 'static {
    fn to_string(&self) -> String;
    fn endpoint(&self) -> String;
    fn path(&self) -> PathBuf;
    async fn is_online(&self) -> bool;
    async fn get_disk_id(&self) -> Result<Option<Uuid>>;

    /// Capacity, inode and API metrics of this disk.
    async fn disk_info(&self) -> Result<DiskInfo>;

    async fn make_volume(&self, volume: &str) -> Result<()>;
    async fn list_volumes(&self) -> Result<Vec<VolInfo>>;
    async fn stat_volume(&self, volume: &str) -> Result<VolInfo>;
    async fn delete_volume(&self, volume: &str) -> Result<()>;

    /// Version history of one object; `FileNotFound` when none is stored.
    async fn read_versions(&self, volume: &str, path: &str) -> Result<FileInfoVersions>;
    /// Replaces the stored history of one object.
    async fn write_versions(&self, volume: &str, path: &str, versions: &FileInfoVersions) -> Result<()>;
    /// Removes the stored history of one object.
    async fn delete_versions(&self, volume: &str, path: &str) -> Result<()>;

    /// Names of stored objects under `prefix`, sorted, strictly after
    /// `marker`, at most `limit` of them.
    async fn list_objects(&self, volume: &str, prefix: &str, marker: &str, limit: usize) -> Result<Vec<String>>;
}

/// Point-in-time report of one disk, rebuilt on every poll.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiskInfo {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_inodes: u64,
    pub free_inodes: u64,
    pub fs_type: String,
    pub root_disk: bool,
    pub healing: bool,
    pub endpoint: String,
    pub mount_path: String,
    pub id: Option<Uuid>,
    pub metrics: DiskMetrics,
    /// Set instead of failing when the disk could not be read.
    pub error: String,
}

impl DiskInfo {
    pub fn is_err(&self) -> bool {
        !self.error.is_empty()
    }

    pub fn marshal_msg(&self) -> shardmeta_filemeta::Result<Vec<u8>> {
        self.to_tuple_bytes()
    }

    pub fn unmarshal(buf: &[u8]) -> shardmeta_filemeta::Result<Self> {
        Self::from_tuple_bytes(buf)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolInfo {
    pub name: String,
    pub created: Option<OffsetDateTime>,
}

const DISK_INFO_FIELDS: u32 = 13;

// free_inodes was appended after error; older peers stop reading at error.
impl TupleEncode for DiskInfo {
    fn encode_tuple(&self, w: &mut TupleWriter) -> shardmeta_filemeta::Result<()> {
        let id = self.id.map(|id| id.to_string()).unwrap_or_default();
        w.begin(DISK_INFO_FIELDS)?
            .u64(self.total)?
            .u64(self.free)?
            .u64(self.used)?
            .u64(self.used_inodes)?
            .str(&self.fs_type)?
            .bool(self.root_disk)?
            .bool(self.healing)?
            .str(&self.endpoint)?
            .str(&self.mount_path)?
            .str(&id)?
            .record(&MetricsRecord(self.metrics.clone()))?
            .str(&self.error)?
            .u64(self.free_inodes)?;
        Ok(())
    }
}

impl TupleDecode for DiskInfo {
    fn decode_tuple(r: &mut TupleReader<'_>) -> shardmeta_filemeta::Result<Self> {
        r.begin()?;
        let total = r.u64()?;
        let free = r.u64()?;
        let used = r.u64()?;
        let used_inodes = r.u64()?;
        let fs_type = r.str()?;
        let root_disk = r.bool()?;
        let healing = r.bool()?;
        let endpoint = r.str()?;
        let mount_path = r.str()?;
        let id = r.str()?;
        let id = if id.is_empty() {
            None
        } else {
            Some(Uuid::parse_str(&id).map_err(shardmeta_filemeta::Error::other)?)
        };
        let metrics = r.record::<MetricsRecord>()?.0;
        let error = r.str()?;
        let free_inodes = r.u64()?;
        r.end()?;
        Ok(DiskInfo {
            total,
            free,
            used,
            used_inodes,
            free_inodes,
            fs_type,
            root_disk,
            healing,
            endpoint,
            mount_path,
            id,
            metrics,
            error,
        })
    }
}

#[derive(Default)]
struct MetricsRecord(DiskMetrics);

impl TupleEncode for MetricsRecord {
    fn encode_tuple(&self, w: &mut TupleWriter) -> shardmeta_filemeta::Result<()> {
        w.begin(2)?.str_map(&self.0.api_latencies)?.u64_map(&self.0.api_calls)?;
        Ok(())
    }
}

impl TupleDecode for MetricsRecord {
    fn decode_tuple(r: &mut TupleReader<'_>) -> shardmeta_filemeta::Result<Self> {
        r.begin()?;
        let api_latencies = r.str_btree()?;
        let api_calls = r.u64_map()?;
        r.end()?;
        Ok(MetricsRecord(DiskMetrics { api_latencies, api_calls }))
    }
}

impl TupleEncode for VolInfo {
    fn encode_tuple(&self, w: &mut TupleWriter) -> shardmeta_filemeta::Result<()> {
        w.begin(2)?.str(&self.name)?.time(self.created)?;
        Ok(())
    }
}

impl TupleDecode for VolInfo {
    fn decode_tuple(r: &mut TupleReader<'_>) -> shardmeta_filemeta::Result<Self> {
        r.begin()?;
        let name = r.str()?;
        let created = r.time()?;
        r.end()?;
        Ok(VolInfo { name, created })
    }
}
