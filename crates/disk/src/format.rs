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

use crate::error::{DiskError, Result};
use serde::{Deserialize, Serialize};
use shardmeta_filemeta::FileInfoVersions;
use uuid::Uuid;

// xl.meta header: magic, then major and minor format version (little endian).
pub const XL_FILE_HEADER: [u8; 4] = [b'X', b'L', b'2', b' '];
pub const XL_FILE_VERSION_MAJOR: u16 = 1;
pub const XL_FILE_VERSION_MINOR: u16 = 0;
const XL_HEADER_LEN: usize = 8;
const XL_CRC_LEN: usize = 4;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
pub enum FormatMetaVersion {
    #[serde(rename = "1")]
    V1,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
pub enum FormatBackend {
    #[serde(rename = "xl")]
    Erasure,
}

/// Contents of `format.json`: identifies a disk across restarts.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct FormatV1 {
    pub version: FormatMetaVersion,
    pub format: FormatBackend,
    pub id: Uuid,
}

impl FormatV1 {
    pub fn new() -> Self {
        Self {
            version: FormatMetaVersion::V1,
            format: FormatBackend::Erasure,
            id: Uuid::new_v4(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(buf: &[u8]) -> Result<Self> {
        serde_json::from_slice(buf).map_err(|_| DiskError::CorruptedFormat)
    }
}

impl Default for FormatV1 {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames an encoded history as an `xl.meta` file: header, payload, CRC32 of the payload.
pub fn encode_xl_meta(versions: &FileInfoVersions) -> Result<Vec<u8>> {
    let payload = versions.marshal_msg()?;
    let mut buf = Vec::with_capacity(XL_HEADER_LEN + payload.len() + XL_CRC_LEN);
    buf.extend_from_slice(&XL_FILE_HEADER);
    buf.extend_from_slice(&XL_FILE_VERSION_MAJOR.to_le_bytes());
    buf.extend_from_slice(&XL_FILE_VERSION_MINOR.to_le_bytes());
    buf.extend_from_slice(&payload);
    buf.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    Ok(buf)
}

pub fn decode_xl_meta(buf: &[u8]) -> Result<FileInfoVersions> {
    if buf.len() < XL_HEADER_LEN + XL_CRC_LEN || buf[0..4] != XL_FILE_HEADER {
        return Err(DiskError::FileCorrupt);
    }
    let major = u16::from_le_bytes([buf[4], buf[5]]);
    if major > XL_FILE_VERSION_MAJOR {
        return Err(DiskError::other(format!("xl.meta major version {major} is newer than supported")));
    }

    let (payload, crc) = buf[XL_HEADER_LEN..].split_at(buf.len() - XL_HEADER_LEN - XL_CRC_LEN);
    let want = u32::from_le_bytes([crc[0], crc[1], crc[2], crc[3]]);
    if crc32fast::hash(payload) != want {
        return Err(DiskError::FileCorrupt);
    }

    Ok(FileInfoVersions::unmarshal(payload)?)
}
