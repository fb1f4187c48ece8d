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

//! Positional MessagePack encoding of the records exchanged between nodes
//! and persisted on disk.
//!
//! Every record is a MessagePack array whose elements are its fields in a
//! fixed order. The order is the compatibility contract: new fields are only
//! ever appended. A reader fills fields missing from a shorter array (older
//! writer) with defaults and skips extra trailing elements (newer writer).

use crate::{
    ChecksumInfo, Error, ErasureInfo, FileInfo, FileInfoVersions, ObjectPartInfo, ReplicationStatusType, Result,
    VersionPurgeStatusType,
};
use bytes::Bytes;
use rmp::Marker;
use shardmeta_utils::HashAlgorithm;
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};
use time::OffsetDateTime;

pub trait TupleEncode {
    fn encode_tuple(&self, w: &mut TupleWriter) -> Result<()>;

    fn to_tuple_bytes(&self) -> Result<Vec<u8>> {
        let mut w = TupleWriter::new();
        self.encode_tuple(&mut w)?;
        Ok(w.into_inner())
    }
}

pub trait TupleDecode: Sized {
    fn decode_tuple(r: &mut TupleReader<'_>) -> Result<Self>;

    fn from_tuple_bytes(buf: &[u8]) -> Result<Self> {
        let mut r = TupleReader::new(buf);
        Self::decode_tuple(&mut r)
    }
}

/// Checks that `t` survives the wire: it must fit in i64 Unix nanoseconds
/// (roughly 1678 to 2262) and must not be the epoch, which encodes "unset".
pub fn validate_time(t: OffsetDateTime) -> Result<()> {
    time_to_nanos(Some(t)).map(|_| ())
}

fn time_to_nanos(t: Option<OffsetDateTime>) -> Result<i64> {
    let Some(t) = t else {
        return Ok(0);
    };
    let nanos = i64::try_from(t.unix_timestamp_nanos())
        .map_err(|_| Error::InvalidArgument(format!("time {t} is outside the encodable range")))?;
    if nanos == 0 {
        return Err(Error::InvalidArgument("the Unix epoch is reserved for an unset time".into()));
    }
    Ok(nanos)
}

fn nanos_to_time(n: i64) -> Result<Option<OffsetDateTime>> {
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(OffsetDateTime::from_unix_timestamp_nanos(n as i128)?))
}

#[derive(Debug, Default)]
pub struct TupleWriter {
    wr: Vec<u8>,
}

impl TupleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.wr
    }

    /// Starts a record of `fields` elements.
    pub fn begin(&mut self, fields: u32) -> Result<&mut Self> {
        rmp::encode::write_array_len(&mut self.wr, fields)?;
        Ok(self)
    }

    pub fn str(&mut self, v: &str) -> Result<&mut Self> {
        rmp::encode::write_str(&mut self.wr, v)?;
        Ok(self)
    }

    pub fn bool(&mut self, v: bool) -> Result<&mut Self> {
        rmp::encode::write_bool(&mut self.wr, v)?;
        Ok(self)
    }

    pub fn u64(&mut self, v: u64) -> Result<&mut Self> {
        rmp::encode::write_uint(&mut self.wr, v)?;
        Ok(self)
    }

    pub fn usize(&mut self, v: usize) -> Result<&mut Self> {
        self.u64(v as u64)
    }

    pub fn i64(&mut self, v: i64) -> Result<&mut Self> {
        rmp::encode::write_sint(&mut self.wr, v)?;
        Ok(self)
    }

    pub fn bin(&mut self, v: &[u8]) -> Result<&mut Self> {
        rmp::encode::write_bin(&mut self.wr, v)?;
        Ok(self)
    }

    /// `nil` for `None`.
    pub fn opt_bin(&mut self, v: Option<&[u8]>) -> Result<&mut Self> {
        match v {
            Some(v) => self.bin(v),
            None => {
                rmp::encode::write_nil(&mut self.wr)?;
                Ok(self)
            }
        }
    }

    /// Unix nanoseconds, 0 when unset.
    pub fn time(&mut self, v: Option<OffsetDateTime>) -> Result<&mut Self> {
        self.i64(time_to_nanos(v)?)
    }

    /// String map with keys written in sorted order.
    pub fn str_map<'m, I>(&mut self, entries: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'m String, &'m String)>,
    {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        rmp::encode::write_map_len(&mut self.wr, entries.len() as u32)?;
        for (k, v) in entries {
            rmp::encode::write_str(&mut self.wr, k)?;
            rmp::encode::write_str(&mut self.wr, v)?;
        }
        Ok(self)
    }

    pub fn u64_map(&mut self, m: &BTreeMap<String, u64>) -> Result<&mut Self> {
        rmp::encode::write_map_len(&mut self.wr, m.len() as u32)?;
        for (k, v) in m {
            rmp::encode::write_str(&mut self.wr, k)?;
            rmp::encode::write_uint(&mut self.wr, *v)?;
        }
        Ok(self)
    }

    pub fn usizes(&mut self, v: &[usize]) -> Result<&mut Self> {
        rmp::encode::write_array_len(&mut self.wr, v.len() as u32)?;
        for n in v {
            rmp::encode::write_uint(&mut self.wr, *n as u64)?;
        }
        Ok(self)
    }

    pub fn record<T: TupleEncode>(&mut self, v: &T) -> Result<&mut Self> {
        v.encode_tuple(self)?;
        Ok(self)
    }

    pub fn records<T: TupleEncode>(&mut self, v: &[T]) -> Result<&mut Self> {
        rmp::encode::write_array_len(&mut self.wr, v.len() as u32)?;
        for item in v {
            item.encode_tuple(self)?;
        }
        Ok(self)
    }
}

/// Reads records written by [`TupleWriter`], tolerating schema drift at the tail.
pub struct TupleReader<'a> {
    cur: Cursor<&'a [u8]>,
    // Unread element count of each open record, innermost last.
    frames: Vec<u32>,
}

impl<'a> TupleReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            cur: Cursor::new(buf),
            frames: Vec::new(),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.cur.position()
    }

    pub fn begin(&mut self) -> Result<()> {
        let n = rmp::decode::read_array_len(&mut self.cur)?;
        self.frames.push(n);
        Ok(())
    }

    /// Closes the current record, skipping fields this reader does not know.
    pub fn end(&mut self) -> Result<()> {
        let rest = self.frames.pop().ok_or_else(|| Error::other("tuple end without begin"))?;
        for _ in 0..rest {
            rmp_serde::decode::from_read::<_, serde::de::IgnoredAny>(&mut self.cur)?;
        }
        Ok(())
    }

    // Claims the next field of the current record; false once the writer's
    // record is exhausted.
    fn take(&mut self) -> bool {
        match self.frames.last_mut() {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    fn remaining(&self) -> usize {
        let len = self.cur.get_ref().len() as u64;
        len.saturating_sub(self.cur.position()) as usize
    }

    // Declared lengths are untrusted; nothing longer than the input is allocated.
    fn read_exact_len(&mut self, len: usize) -> Result<Vec<u8>> {
        let left = self.remaining();
        if len > left {
            return Err(Error::other(format!("declared length {len} exceeds the {left} bytes left")));
        }
        let mut buf = vec![0u8; len];
        self.cur.read_exact(&mut buf)?;
        Ok(buf)
    }

    // Every element takes at least one byte.
    fn capacity_for(&self, n: u32) -> usize {
        (n as usize).min(self.remaining())
    }

    fn read_raw_str(&mut self) -> Result<String> {
        let len = rmp::decode::read_str_len(&mut self.cur)? as usize;
        let buf = self.read_exact_len(len)?;
        Ok(String::from_utf8(buf)?)
    }

    fn peek_nil(&mut self) -> Result<bool> {
        let pos = self.cur.position();
        let marker = rmp::decode::read_marker(&mut self.cur)?;
        if marker == Marker::Null {
            return Ok(true);
        }
        self.cur.set_position(pos);
        Ok(false)
    }

    pub fn str(&mut self) -> Result<String> {
        if !self.take() {
            return Ok(String::new());
        }
        self.read_raw_str()
    }

    pub fn bool(&mut self) -> Result<bool> {
        if !self.take() {
            return Ok(false);
        }
        Ok(rmp::decode::read_bool(&mut self.cur)?)
    }

    pub fn u64(&mut self) -> Result<u64> {
        if !self.take() {
            return Ok(0);
        }
        Ok(rmp::decode::read_int(&mut self.cur)?)
    }

    pub fn u32(&mut self) -> Result<u32> {
        if !self.take() {
            return Ok(0);
        }
        Ok(rmp::decode::read_int(&mut self.cur)?)
    }

    pub fn usize(&mut self) -> Result<usize> {
        let v = self.u64()?;
        usize::try_from(v).map_err(|_| Error::other(format!("value {v} overflows usize")))
    }

    pub fn i64(&mut self) -> Result<i64> {
        if !self.take() {
            return Ok(0);
        }
        Ok(rmp::decode::read_int(&mut self.cur)?)
    }

    pub fn bin(&mut self) -> Result<Vec<u8>> {
        Ok(self.opt_bin()?.unwrap_or_default())
    }

    pub fn opt_bin(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.take() || self.peek_nil()? {
            return Ok(None);
        }
        let len = rmp::decode::read_bin_len(&mut self.cur)? as usize;
        Ok(Some(self.read_exact_len(len)?))
    }

    pub fn time(&mut self) -> Result<Option<OffsetDateTime>> {
        nanos_to_time(self.i64()?)
    }

    pub fn str_map(&mut self) -> Result<HashMap<String, String>> {
        Ok(self.str_btree()?.into_iter().collect())
    }

    pub fn str_btree(&mut self) -> Result<BTreeMap<String, String>> {
        let mut m = BTreeMap::new();
        if !self.take() || self.peek_nil()? {
            return Ok(m);
        }
        let n = rmp::decode::read_map_len(&mut self.cur)?;
        for _ in 0..n {
            let k = self.read_raw_str()?;
            let v = self.read_raw_str()?;
            m.insert(k, v);
        }
        Ok(m)
    }

    pub fn u64_map(&mut self) -> Result<BTreeMap<String, u64>> {
        let mut m = BTreeMap::new();
        if !self.take() || self.peek_nil()? {
            return Ok(m);
        }
        let n = rmp::decode::read_map_len(&mut self.cur)?;
        for _ in 0..n {
            let k = self.read_raw_str()?;
            let v: u64 = rmp::decode::read_int(&mut self.cur)?;
            m.insert(k, v);
        }
        Ok(m)
    }

    pub fn usizes(&mut self) -> Result<Vec<usize>> {
        if !self.take() || self.peek_nil()? {
            return Ok(Vec::new());
        }
        let n = rmp::decode::read_array_len(&mut self.cur)?;
        let mut out = Vec::with_capacity(self.capacity_for(n));
        for _ in 0..n {
            let v: u64 = rmp::decode::read_int(&mut self.cur)?;
            out.push(usize::try_from(v).map_err(|_| Error::other(format!("value {v} overflows usize")))?);
        }
        Ok(out)
    }

    pub fn record<T: TupleDecode + Default>(&mut self) -> Result<T> {
        if !self.take() {
            return Ok(T::default());
        }
        T::decode_tuple(self)
    }

    pub fn records<T: TupleDecode>(&mut self) -> Result<Vec<T>> {
        if !self.take() || self.peek_nil()? {
            return Ok(Vec::new());
        }
        let n = rmp::decode::read_array_len(&mut self.cur)?;
        let mut out = Vec::with_capacity(self.capacity_for(n));
        for _ in 0..n {
            out.push(T::decode_tuple(self)?);
        }
        Ok(out)
    }
}

const OBJECT_PART_INFO_FIELDS: u32 = 5;

impl TupleEncode for ObjectPartInfo {
    fn encode_tuple(&self, w: &mut TupleWriter) -> Result<()> {
        w.begin(OBJECT_PART_INFO_FIELDS)?
            .usize(self.number)?
            .usize(self.size)?
            .i64(self.actual_size)?
            .str(&self.etag)?
            .str(&self.checksum)?;
        Ok(())
    }
}

impl TupleDecode for ObjectPartInfo {
    fn decode_tuple(r: &mut TupleReader<'_>) -> Result<Self> {
        r.begin()?;
        let v = ObjectPartInfo {
            number: r.usize()?,
            size: r.usize()?,
            actual_size: r.i64()?,
            etag: r.str()?,
            checksum: r.str()?,
        };
        r.end()?;
        Ok(v)
    }
}

const CHECKSUM_INFO_FIELDS: u32 = 3;

impl TupleEncode for ChecksumInfo {
    fn encode_tuple(&self, w: &mut TupleWriter) -> Result<()> {
        w.begin(CHECKSUM_INFO_FIELDS)?
            .usize(self.part_number)?
            .str(self.algorithm.as_str())?
            .bin(&self.hash)?;
        Ok(())
    }
}

impl TupleDecode for ChecksumInfo {
    fn decode_tuple(r: &mut TupleReader<'_>) -> Result<Self> {
        r.begin()?;
        let v = ChecksumInfo {
            part_number: r.usize()?,
            algorithm: HashAlgorithm::from_name(&r.str()?),
            hash: Bytes::from(r.bin()?),
        };
        r.end()?;
        Ok(v)
    }
}

const ERASURE_INFO_FIELDS: u32 = 7;

impl TupleEncode for ErasureInfo {
    fn encode_tuple(&self, w: &mut TupleWriter) -> Result<()> {
        w.begin(ERASURE_INFO_FIELDS)?
            .str(&self.algorithm)?
            .usize(self.data_blocks)?
            .usize(self.parity_blocks)?
            .usize(self.block_size)?
            .usize(self.index)?
            .usizes(&self.distribution)?
            .records(&self.checksums)?;
        Ok(())
    }
}

impl TupleDecode for ErasureInfo {
    fn decode_tuple(r: &mut TupleReader<'_>) -> Result<Self> {
        r.begin()?;
        let v = ErasureInfo {
            algorithm: r.str()?,
            data_blocks: r.usize()?,
            parity_blocks: r.usize()?,
            block_size: r.usize()?,
            index: r.usize()?,
            distribution: r.usizes()?,
            checksums: r.records()?,
        };
        r.end()?;
        Ok(v)
    }
}

const FILE_INFO_FIELDS: u32 = 20;

impl TupleEncode for FileInfo {
    fn encode_tuple(&self, w: &mut TupleWriter) -> Result<()> {
        w.begin(FILE_INFO_FIELDS)?
            .str(&self.volume)?
            .str(&self.name)?
            .str(&self.version_id)?
            .bool(self.is_latest)?
            .bool(self.deleted)?
            .str(&self.transition_status)?
            .str(&self.data_dir)?
            .bool(self.xlv1)?
            .time(self.mod_time)?
            .i64(self.size)?
            .u64(self.mode as u64)?
            .str_map(&self.metadata)?
            .records(&self.parts)?
            .record(&self.erasure)?
            .bool(self.mark_deleted)?
            .str(self.delete_marker_replication_status.as_str())?
            .str(self.version_purge_status.as_str())?
            .opt_bin(self.data.as_deref())?
            .usize(self.num_versions)?
            .time(self.successor_mod_time)?;
        Ok(())
    }
}

impl TupleDecode for FileInfo {
    fn decode_tuple(r: &mut TupleReader<'_>) -> Result<Self> {
        r.begin()?;
        let v = FileInfo {
            volume: r.str()?,
            name: r.str()?,
            version_id: r.str()?,
            is_latest: r.bool()?,
            deleted: r.bool()?,
            transition_status: r.str()?,
            data_dir: r.str()?,
            xlv1: r.bool()?,
            mod_time: r.time()?,
            size: r.i64()?,
            mode: r.u32()?,
            metadata: r.str_map()?,
            parts: r.records()?,
            erasure: r.record()?,
            mark_deleted: r.bool()?,
            delete_marker_replication_status: ReplicationStatusType::from(r.str()?.as_str()),
            version_purge_status: VersionPurgeStatusType::from(r.str()?.as_str()),
            data: r.opt_bin()?.map(Bytes::from),
            num_versions: r.usize()?,
            successor_mod_time: r.time()?,
        };
        r.end()?;
        Ok(v)
    }
}

const FILE_INFO_VERSIONS_FIELDS: u32 = 5;

impl TupleEncode for FileInfoVersions {
    fn encode_tuple(&self, w: &mut TupleWriter) -> Result<()> {
        w.begin(FILE_INFO_VERSIONS_FIELDS)?
            .str(&self.volume)?
            .str(&self.name)?
            .bool(self.is_empty_dir)?
            .time(self.latest_mod_time)?
            .records(&self.versions)?;
        Ok(())
    }
}

impl TupleDecode for FileInfoVersions {
    fn decode_tuple(r: &mut TupleReader<'_>) -> Result<Self> {
        r.begin()?;
        let v = FileInfoVersions {
            volume: r.str()?,
            name: r.str()?,
            is_empty_dir: r.bool()?,
            latest_mod_time: r.time()?,
            versions: r.records()?,
        };
        r.end()?;
        Ok(v)
    }
}

impl FileInfo {
    pub fn marshal_msg(&self) -> Result<Vec<u8>> {
        self.to_tuple_bytes()
    }

    pub fn unmarshal(buf: &[u8]) -> Result<Self> {
        Self::from_tuple_bytes(buf)
    }
}

impl FileInfoVersions {
    pub fn marshal_msg(&self) -> Result<Vec<u8>> {
        self.to_tuple_bytes()
    }

    pub fn unmarshal(buf: &[u8]) -> Result<Self> {
        Self::from_tuple_bytes(buf)
    }
}
