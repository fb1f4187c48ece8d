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

use super::DiskInfo;
use rustix::fs::statvfs;
use std::io::Error;
use std::path::Path;

/// Returns total and free bytes available in a directory, e.g. `/`.
pub fn get_info(p: impl AsRef<Path>) -> std::io::Result<DiskInfo> {
    let path_display = p.as_ref().display();
    let stat = statvfs(p.as_ref())?;

    // f_blocks is counted in f_frsize units; f_bsize only as a fallback.
    let bsize = if stat.f_frsize > 0 {
        stat.f_frsize as u64
    } else {
        stat.f_bsize as u64
    };

    let bfree = stat.f_bfree as u64;
    let bavail = stat.f_bavail as u64;
    let blocks = stat.f_blocks as u64;

    let Some(reserved) = bfree.checked_sub(bavail) else {
        return Err(Error::other(format!(
            "detected f_bavail space ({bavail}) > f_bfree space ({bfree}), fs corruption at ({path_display}). please run 'fsck'",
        )));
    };

    let Some(total) = blocks.checked_sub(reserved).map(|b| b * bsize) else {
        return Err(Error::other(format!(
            "detected reserved space ({reserved}) > blocks space ({blocks}), fs corruption at ({path_display}). please run 'fsck'",
        )));
    };

    let free = bavail * bsize;
    let Some(used) = total.checked_sub(free) else {
        return Err(Error::other(format!(
            "detected free space ({free}) > total drive space ({total}), fs corruption at ({path_display}). please run 'fsck'"
        )));
    };

    let st = rustix::fs::stat(p.as_ref())?;

    Ok(DiskInfo {
        total,
        free,
        used,
        files: stat.f_files as u64,
        ffree: stat.f_ffree as u64,
        fstype: get_fs_type(p.as_ref()).to_string(),
        major: rustix::fs::major(st.st_dev as _) as u64,
        minor: rustix::fs::minor(st.st_dev as _) as u64,
    })
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn get_fs_type(p: &Path) -> &'static str {
    let Ok(st) = rustix::fs::statfs(p) else {
        return "UNKNOWN";
    };
    match st.f_type as i64 {
        0x01021994 => "TMPFS",
        0x4d44 => "MSDOS",
        0x58465342 => "XFS",
        0x6969 => "NFS",
        0xef53 => "EXT4",
        0x137d => "EXT",
        0xef51 => "EXT2OLD",
        0x9123683e => "BTRFS",
        0x2fc12fc1 => "zfs",
        0xf15f => "ecryptfs",
        0x794c7630 => "overlayfs",
        0x52654973 => "REISERFS",
        0xff534d42 => "cifs",
        0x53464846 => "wslfs",
        0x61756673 => "AUFS",
        _ => "UNKNOWN",
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn get_fs_type(_p: &Path) -> &'static str {
    "UNKNOWN"
}

/// Whether two paths live on the same device.
pub fn same_disk(disk1: &str, disk2: &str) -> std::io::Result<bool> {
    let stat1 = rustix::fs::stat(disk1)?;
    let stat2 = rustix::fs::stat(disk2)?;

    Ok(stat1.st_dev == stat2.st_dev)
}
