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

use crate::error::StorageError;
use shardmeta_disk::DiskError;
use shardmeta_filemeta::FileInfoVersions;

/// Most frequent outcome among per-disk results, `None` meaning success.
///
/// Ties favour success, then the error seen first.
pub(crate) fn reduce_errs(errs: &[Option<DiskError>], ignored_errs: &[DiskError]) -> (usize, Option<DiskError>) {
    let mut counts: Vec<(Option<&DiskError>, usize)> = Vec::new();
    for err in errs.iter().map(Option::as_ref) {
        if err.is_some_and(|e| is_ignored_err(ignored_errs, e)) {
            continue;
        }
        match counts.iter_mut().find(|(seen, _)| *seen == err) {
            Some((_, count)) => *count += 1,
            None => counts.push((err, 1)),
        }
    }

    let mut best: Option<(Option<&DiskError>, usize)> = None;
    for (err, count) in counts {
        let better = match best {
            None => true,
            Some((best_err, best_count)) => count > best_count || (count == best_count && err.is_none() && best_err.is_some()),
        };
        if better {
            best = Some((err, count));
        }
    }

    best.map_or((0, None), |(err, count)| (count, err.cloned()))
}

pub(crate) fn is_ignored_err(ignored_errs: &[DiskError], err: &DiskError) -> bool {
    ignored_errs.iter().any(|e| e == err)
}

fn reduce_quorum_errs(
    errs: &[Option<DiskError>],
    ignored_errs: &[DiskError],
    quorum: usize,
    quorum_err: StorageError,
) -> Option<StorageError> {
    let (max_count, err) = reduce_errs(errs, ignored_errs);
    if max_count >= quorum {
        err.map(StorageError::from)
    } else {
        Some(quorum_err)
    }
}

pub(crate) fn reduce_read_quorum_errs(errs: &[Option<DiskError>], ignored_errs: &[DiskError], quorum: usize) -> Option<StorageError> {
    reduce_quorum_errs(errs, ignored_errs, quorum, StorageError::ErasureReadQuorum)
}

pub(crate) fn reduce_write_quorum_errs(errs: &[Option<DiskError>], ignored_errs: &[DiskError], quorum: usize) -> Option<StorageError> {
    reduce_quorum_errs(errs, ignored_errs, quorum, StorageError::ErasureWriteQuorum)
}

/// The version history at least `quorum` disks agree on, `None` when a
/// quorum of disks has no such object.
///
/// Identical answers are grouped. The largest group wins, ties going to the
/// longer history and then to the more recently modified one. A disk that
/// missed a write therefore never outvotes the disks that took it.
pub(crate) fn reduce_versions(
    results: Vec<Result<FileInfoVersions, DiskError>>,
    quorum: usize,
) -> Result<Option<FileInfoVersions>, StorageError> {
    let mut groups: Vec<(FileInfoVersions, usize)> = Vec::new();
    let mut errs = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(versions) => {
                errs.push(None);
                match groups.iter_mut().find(|(seen, _)| *seen == versions) {
                    Some((_, count)) => *count += 1,
                    None => groups.push((versions, 1)),
                }
            }
            Err(err) => errs.push(Some(err)),
        }
    }

    let winner = groups.into_iter().max_by(|(a, a_count), (b, b_count)| {
        a_count
            .cmp(b_count)
            .then(a.versions.len().cmp(&b.versions.len()))
            .then(a.latest_mod_time.cmp(&b.latest_mod_time))
    });
    if let Some((versions, count)) = winner {
        if count >= quorum {
            return Ok(Some(versions));
        }
    }

    let failures: Vec<Option<DiskError>> = errs.into_iter().filter(Option::is_some).collect();
    match reduce_errs(&failures, &[]) {
        (count, Some(DiskError::FileNotFound)) if count >= quorum => Ok(None),
        (count, Some(err)) if count >= quorum => Err(err.into()),
        _ => Err(StorageError::ErasureReadQuorum),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_errs_counts_most_common() {
        let errs = vec![
            Some(DiskError::FileNotFound),
            Some(DiskError::FileNotFound),
            Some(DiskError::FaultyDisk),
            None,
        ];
        assert_eq!(reduce_errs(&errs, &[]), (2, Some(DiskError::FileNotFound)));
    }

    #[test]
    fn test_reduce_errs_prefers_success_on_tie() {
        let errs = vec![Some(DiskError::FaultyDisk), None, Some(DiskError::FaultyDisk), None];
        assert_eq!(reduce_errs(&errs, &[]), (2, None));
    }

    #[test]
    fn test_reduce_errs_skips_ignored() {
        let errs = vec![Some(DiskError::DiskNotFound), Some(DiskError::DiskNotFound), None];
        assert_eq!(reduce_errs(&errs, &[DiskError::DiskNotFound]), (1, None));
        assert_eq!(reduce_errs(&[], &[]), (0, None));
    }

    #[test]
    fn test_write_quorum() {
        let ok = vec![None, None, None, Some(DiskError::FaultyDisk)];
        assert!(reduce_write_quorum_errs(&ok, &[], 3).is_none());

        let short = vec![None, None, Some(DiskError::FaultyDisk), Some(DiskError::DiskNotFound)];
        assert!(matches!(
            reduce_write_quorum_errs(&short, &[], 3),
            Some(StorageError::ErasureWriteQuorum)
        ));

        let missing = vec![Some(DiskError::VolumeNotFound); 4];
        assert!(matches!(
            reduce_write_quorum_errs(&missing, &[], 3),
            Some(StorageError::Disk(DiskError::VolumeNotFound))
        ));
    }

    #[test]
    fn test_read_quorum() {
        let errs = vec![Some(DiskError::FaultyDisk), Some(DiskError::FileNotFound), Some(DiskError::FileNotFound)];
        assert!(matches!(
            reduce_read_quorum_errs(&errs, &[], 2),
            Some(StorageError::Disk(DiskError::FileNotFound))
        ));
        assert!(matches!(
            reduce_read_quorum_errs(&errs, &[], 3),
            Some(StorageError::ErasureReadQuorum)
        ));
    }

    fn history(ids: &[&str]) -> FileInfoVersions {
        let mut versions = FileInfoVersions::new("photos", "cat.png");
        for (i, id) in ids.iter().enumerate() {
            let mut fi = shardmeta_filemeta::FileInfo::new("cat.png", 2, 1).unwrap();
            fi.version_id = id.to_string();
            fi.mod_time = Some(time::OffsetDateTime::from_unix_timestamp(1_700_000_000 + i as i64).unwrap());
            versions.add_version(fi, 10).unwrap();
        }
        versions
    }

    #[test]
    fn test_reduce_versions_outvotes_stale_disk() {
        let results = vec![Ok(history(&["v1"])), Ok(history(&["v1", "v2"])), Ok(history(&["v1", "v2"]))];
        let picked = reduce_versions(results, 2).unwrap().unwrap();
        assert_eq!(picked, history(&["v1", "v2"]));
    }

    #[test]
    fn test_reduce_versions_tie_prefers_longer_history() {
        let results = vec![
            Ok(history(&["v1"])),
            Ok(history(&["v1"])),
            Ok(history(&["v1", "v2"])),
            Ok(history(&["v1", "v2"])),
        ];
        let picked = reduce_versions(results, 2).unwrap().unwrap();
        assert_eq!(picked.versions.len(), 2);
    }

    #[test]
    fn test_reduce_versions_without_agreement() {
        let results = vec![
            Ok(history(&["v1"])),
            Err(DiskError::FileNotFound),
            Err(DiskError::FileNotFound),
        ];
        assert!(reduce_versions(results, 2).unwrap().is_none());

        let results = vec![Ok(history(&["v1"])), Ok(history(&["v2"])), Err(DiskError::FaultyDisk)];
        assert!(matches!(reduce_versions(results, 2), Err(StorageError::ErasureReadQuorum)));

        let results = vec![Err(DiskError::FaultyDisk), Err(DiskError::FaultyDisk), Ok(history(&["v1"]))];
        assert!(matches!(reduce_versions(results, 2), Err(StorageError::Disk(DiskError::FaultyDisk))));
    }
}
