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

use std::io::{self, ErrorKind};

pub type Error = DiskError;
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum DiskError {
    #[error("maximum versions exceeded, please delete few versions to proceed")]
    MaxVersionsExceeded,

    #[error("unexpected error")]
    Unexpected,

    #[error("corrupted format")]
    CorruptedFormat,

    #[error("unformatted disk error")]
    UnformattedDisk,

    #[error("disk not a dir")]
    DiskNotDir,

    #[error("disk not found")]
    DiskNotFound,

    #[error("drive is faulty")]
    FaultyDisk,

    #[error("file not found")]
    FileNotFound,

    #[error("file version not found")]
    FileVersionNotFound,

    #[error("file access denied")]
    FileAccessDenied,

    #[error("file is corrupted")]
    FileCorrupt,

    #[error("volume already exists")]
    VolumeExists,

    #[error("volume not found")]
    VolumeNotFound,

    #[error("volume is not empty")]
    VolumeNotEmpty,

    #[error("volume access denied")]
    VolumeAccessDenied,

    #[error("invalid volume name: {0}")]
    InvalidVolumeName(String),

    #[error("invalid path")]
    InvalidPath,

    #[error("timeout")]
    Timeout,

    #[error("io error {0}")]
    Io(io::Error),
}

impl DiskError {
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        DiskError::Io(io::Error::other(error))
    }

    /// True for outcomes that mean "nothing stored here" rather than a broken disk.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DiskError::FileNotFound | DiskError::FileVersionNotFound | DiskError::VolumeNotFound
        )
    }
}

pub fn to_file_error(e: io::Error) -> DiskError {
    match e.kind() {
        ErrorKind::NotFound => DiskError::FileNotFound,
        ErrorKind::PermissionDenied => DiskError::FileAccessDenied,
        ErrorKind::NotADirectory => DiskError::FileNotFound,
        _ => DiskError::Io(e),
    }
}

pub fn to_volume_error(e: io::Error) -> DiskError {
    match e.kind() {
        ErrorKind::NotFound => DiskError::VolumeNotFound,
        ErrorKind::PermissionDenied => DiskError::VolumeAccessDenied,
        ErrorKind::DirectoryNotEmpty => DiskError::VolumeNotEmpty,
        ErrorKind::AlreadyExists => DiskError::VolumeExists,
        _ => DiskError::Io(e),
    }
}

impl From<shardmeta_filemeta::Error> for DiskError {
    fn from(e: shardmeta_filemeta::Error) -> Self {
        match e {
            shardmeta_filemeta::Error::Io(e) => DiskError::Io(e),
            shardmeta_filemeta::Error::FileNotFound => DiskError::FileNotFound,
            shardmeta_filemeta::Error::FileVersionNotFound => DiskError::FileVersionNotFound,
            shardmeta_filemeta::Error::FileCorrupt | shardmeta_filemeta::Error::Unexpected => DiskError::FileCorrupt,
            shardmeta_filemeta::Error::MaxVersionsExceeded { .. } => DiskError::MaxVersionsExceeded,
            e => DiskError::other(e),
        }
    }
}

impl From<io::Error> for DiskError {
    fn from(e: io::Error) -> Self {
        e.downcast::<DiskError>().unwrap_or_else(DiskError::Io)
    }
}

impl From<DiskError> for io::Error {
    fn from(e: DiskError) -> Self {
        match e {
            DiskError::Io(io_error) => io_error,
            e => io::Error::other(e),
        }
    }
}

impl From<serde_json::Error> for DiskError {
    fn from(e: serde_json::Error) -> Self {
        DiskError::other(e)
    }
}

impl From<tokio::task::JoinError> for DiskError {
    fn from(e: tokio::task::JoinError) -> Self {
        DiskError::other(e)
    }
}

impl Clone for DiskError {
    fn clone(&self) -> Self {
        match self {
            DiskError::Io(io_error) => DiskError::Io(io::Error::new(io_error.kind(), io_error.to_string())),
            DiskError::MaxVersionsExceeded => DiskError::MaxVersionsExceeded,
            DiskError::Unexpected => DiskError::Unexpected,
            DiskError::CorruptedFormat => DiskError::CorruptedFormat,
            DiskError::UnformattedDisk => DiskError::UnformattedDisk,
            DiskError::DiskNotDir => DiskError::DiskNotDir,
            DiskError::DiskNotFound => DiskError::DiskNotFound,
            DiskError::FaultyDisk => DiskError::FaultyDisk,
            DiskError::FileNotFound => DiskError::FileNotFound,
            DiskError::FileVersionNotFound => DiskError::FileVersionNotFound,
            DiskError::FileAccessDenied => DiskError::FileAccessDenied,
            DiskError::FileCorrupt => DiskError::FileCorrupt,
            DiskError::VolumeExists => DiskError::VolumeExists,
            DiskError::VolumeNotFound => DiskError::VolumeNotFound,
            DiskError::VolumeNotEmpty => DiskError::VolumeNotEmpty,
            DiskError::VolumeAccessDenied => DiskError::VolumeAccessDenied,
            DiskError::InvalidVolumeName(name) => DiskError::InvalidVolumeName(name.clone()),
            DiskError::InvalidPath => DiskError::InvalidPath,
            DiskError::Timeout => DiskError::Timeout,
        }
    }
}

impl PartialEq for DiskError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DiskError::Io(e1), DiskError::Io(e2)) => e1.kind() == e2.kind() && e1.to_string() == e2.to_string(),
            (DiskError::InvalidVolumeName(a), DiskError::InvalidVolumeName(b)) => a == b,
            (e1, e2) => std::mem::discriminant(e1) == std::mem::discriminant(e2),
        }
    }
}

impl Eq for DiskError {}
