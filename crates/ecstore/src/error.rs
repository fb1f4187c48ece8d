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

use shardmeta_disk::DiskError;
use shardmeta_lock::LockError;

pub type Error = StorageError;
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Erasure write quorum not reached")]
    ErasureWriteQuorum,

    #[error("Erasure read quorum not reached")]
    ErasureReadQuorum,

    #[error("Volume not found: {0}")]
    VolumeNotFound(String),

    #[error("Volume exists: {0}")]
    VolumeExists(String),

    #[error("Volume not empty: {0}")]
    VolumeNotEmpty(String),

    #[error("Object not found: {0}/{1}")]
    ObjectNotFound(String, String),

    #[error("Version not found: {0}/{1}-{2}")]
    VersionNotFound(String, String, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Too many versions, the limit is {0}")]
    MaxVersionsExceeded(usize),

    /// An illegal state-machine move on version metadata. Never retried.
    #[error("Contract violation: {0}")]
    ContractViolation(shardmeta_filemeta::Error),

    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Disk error: {0}")]
    Disk(DiskError),

    #[error("Metadata error: {0}")]
    Meta(shardmeta_filemeta::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::ObjectNotFound(..) | StorageError::VersionNotFound(..) | StorageError::VolumeNotFound(_)
        )
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, StorageError::ContractViolation(_))
    }

    pub fn is_quorum_error(&self) -> bool {
        matches!(self, StorageError::ErasureWriteQuorum | StorageError::ErasureReadQuorum)
    }
}

impl From<DiskError> for StorageError {
    fn from(e: DiskError) -> Self {
        match e {
            DiskError::InvalidVolumeName(name) => StorageError::InvalidArgument(format!("invalid volume name {name:?}")),
            e => StorageError::Disk(e),
        }
    }
}

impl From<shardmeta_filemeta::Error> for StorageError {
    fn from(e: shardmeta_filemeta::Error) -> Self {
        use shardmeta_filemeta::Error as MetaError;
        match e {
            MetaError::InvalidArgument(msg) => StorageError::InvalidArgument(msg),
            MetaError::MaxVersionsExceeded { max } => StorageError::MaxVersionsExceeded(max),
            MetaError::FileNotFound => StorageError::Disk(DiskError::FileNotFound),
            MetaError::FileVersionNotFound => StorageError::Disk(DiskError::FileVersionNotFound),
            e @ (MetaError::DistributionImmutable | MetaError::IllegalPurgeTransition { .. }) => StorageError::ContractViolation(e),
            e => StorageError::Meta(e),
        }
    }
}

/// Gives disk-level errors their volume/object context.
///
/// `params` is `[volume, object, version_id]`, any of them optional.
pub fn to_object_err(err: Error, params: &[&str]) -> Error {
    let param = |i: usize| params.get(i).copied().unwrap_or_default().to_owned();

    match err {
        StorageError::Disk(DiskError::FileNotFound) => StorageError::ObjectNotFound(param(0), param(1)),
        StorageError::Disk(DiskError::FileVersionNotFound) => StorageError::VersionNotFound(param(0), param(1), param(2)),
        StorageError::Disk(DiskError::VolumeNotFound) => StorageError::VolumeNotFound(param(0)),
        StorageError::Disk(DiskError::VolumeExists) => StorageError::VolumeExists(param(0)),
        StorageError::Disk(DiskError::VolumeNotEmpty) => StorageError::VolumeNotEmpty(param(0)),
        StorageError::Disk(DiskError::InvalidPath) => StorageError::InvalidArgument(format!("invalid object name {:?}", param(1))),
        err => err,
    }
}
