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

mod common;

use common::{BUCKET, default_set, new_set};
use shardmeta_config::StorageConfig;
use shardmeta_disk::DiskError;
use shardmeta_ecstore::{ObjectOptions, StorageError};
use shardmeta_filemeta::{VersionPurgeStatusType, is_valid_distribution};
use std::collections::HashSet;
use std::time::Duration;

#[tokio::test]
async fn test_report_csv_delete_marker_end_to_end() {
    let config = StorageConfig {
        default_parity_blocks: Some(2),
        ..Default::default()
    };
    let t = new_set(6, config).await;
    let opts = ObjectOptions::versioned();

    let fi = t.set.put_object_version(BUCKET, "report.csv", 1024, &opts).await.unwrap();
    assert_eq!(fi.erasure.data_blocks, 4);
    assert_eq!(fi.erasure.parity_blocks, 2);
    assert_eq!(fi.erasure.distribution().len(), 6);
    assert!(is_valid_distribution(fi.erasure.distribution(), 6));
    assert!(fi.is_latest);

    let marker = t.set.delete_object(BUCKET, "report.csv", &opts).await.unwrap();
    assert!(marker.deleted);

    let history = t.set.get_object_versions(BUCKET, "report.csv", &opts).await.unwrap();
    assert_eq!(history.versions.len(), 2);
    assert!(!history.versions[0].is_latest);
    assert!(history.versions[1].deleted);
    assert!(history.versions[1].is_latest);
    assert_eq!(history.versions[0].successor_mod_time, history.versions[1].mod_time);
    assert_eq!(history.versions[0].num_versions, 2);

    let err = t.set.get_object_info(BUCKET, "report.csv", &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound(..)));

    let by_id = opts.clone().with_version_id(fi.version_id.clone());
    let old = t.set.get_object_info(BUCKET, "report.csv", &by_id).await.unwrap();
    assert_eq!(old.size, 1024);
    assert_eq!(old.erasure.distribution(), fi.erasure.distribution());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_puts_serialize_per_object() {
    let t = default_set(4).await;
    let n = 16;

    let handles: Vec<_> = (0..n)
        .map(|i| {
            let set = t.set.clone();
            tokio::spawn(async move {
                set.put_object_version(BUCKET, "hot/key", i, &ObjectOptions::versioned())
                    .await
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let history = t
        .set
        .get_object_versions(BUCKET, "hot/key", &ObjectOptions::default())
        .await
        .unwrap();
    assert_eq!(history.versions.len(), n as usize);
    let ids: HashSet<_> = history.versions.iter().map(|v| v.version_id.clone()).collect();
    assert_eq!(ids.len(), n as usize);
    assert_eq!(history.versions.iter().filter(|v| v.is_latest).count(), 1);
    assert_eq!(t.set.active_locks(), 0);
}

#[tokio::test]
async fn test_unversioned_put_replaces_null_version() {
    let t = default_set(4).await;
    let opts = ObjectOptions::default();

    t.set.put_object_version(BUCKET, "notes.txt", 10, &opts).await.unwrap();
    let fi = t.set.put_object_version(BUCKET, "notes.txt", 20, &opts).await.unwrap();
    assert_eq!(fi.version_id, "");

    let history = t.set.get_object_versions(BUCKET, "notes.txt", &opts).await.unwrap();
    assert_eq!(history.versions.len(), 1);
    assert_eq!(history.versions[0].size, 20);

    let removed = t.set.delete_object(BUCKET, "notes.txt", &opts).await.unwrap();
    assert_eq!(removed.size, 20);
    let err = t.set.get_object_info(BUCKET, "notes.txt", &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound(..)));

    let err = t.set.delete_object(BUCKET, "notes.txt", &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound(..)));

    for disk in &t.disks {
        let err = shardmeta_disk::DiskAPI::read_versions(disk.as_ref(), BUCKET, "notes.txt")
            .await
            .unwrap_err();
        assert_eq!(err, DiskError::FileNotFound);
    }
}

#[tokio::test]
async fn test_delete_specific_version() {
    let t = default_set(4).await;
    let opts = ObjectOptions::versioned();

    let v1 = t.set.put_object_version(BUCKET, "doc", 1, &opts).await.unwrap();
    let v2 = t.set.put_object_version(BUCKET, "doc", 2, &opts).await.unwrap();

    let removed = t
        .set
        .delete_object(BUCKET, "doc", &opts.clone().with_version_id(v2.version_id.clone()))
        .await
        .unwrap();
    assert_eq!(removed.version_id, v2.version_id);

    let latest = t.set.get_object_info(BUCKET, "doc", &opts).await.unwrap();
    assert_eq!(latest.version_id, v1.version_id);
    assert!(latest.is_latest);

    let err = t
        .set
        .delete_object(BUCKET, "doc", &opts.clone().with_version_id(v2.version_id.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::VersionNotFound(_, _, ref v) if *v == v2.version_id));
}

#[tokio::test]
async fn test_replicated_delete_waits_for_purge() {
    let t = default_set(4).await;
    let opts = ObjectOptions::versioned();

    let v1 = t.set.put_object_version(BUCKET, "doc", 1, &opts).await.unwrap();
    let v2 = t.set.put_object_version(BUCKET, "doc", 2, &opts).await.unwrap();

    let mut replicate = opts.clone().with_version_id(v2.version_id.clone());
    replicate.replicate_delete = true;
    let marked = t.set.delete_object(BUCKET, "doc", &replicate).await.unwrap();
    assert!(marked.mark_deleted);
    assert!(marked.version_purge_status.is_pending());

    let history = t.set.get_object_versions(BUCKET, "doc", &opts).await.unwrap();
    assert_eq!(history.versions.len(), 2);
    assert_eq!(history.latest().unwrap().version_id, v1.version_id);

    t.set
        .transition_purge_status(BUCKET, "doc", &v2.version_id, VersionPurgeStatusType::Failed, &opts)
        .await
        .unwrap();
    t.set
        .transition_purge_status(BUCKET, "doc", &v2.version_id, VersionPurgeStatusType::Complete, &opts)
        .await
        .unwrap();

    let history = t.set.get_object_versions(BUCKET, "doc", &opts).await.unwrap();
    assert_eq!(history.versions.len(), 1);
    assert_eq!(history.versions[0].version_id, v1.version_id);

    let err = t
        .set
        .transition_purge_status(BUCKET, "doc", &v2.version_id, VersionPurgeStatusType::Pending, &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::VersionNotFound(..)));
}

#[tokio::test]
async fn test_purging_last_version_removes_object() {
    let t = default_set(4).await;
    let opts = ObjectOptions::versioned();

    let v1 = t.set.put_object_version(BUCKET, "solo", 1, &opts).await.unwrap();
    t.set
        .transition_purge_status(BUCKET, "solo", &v1.version_id, VersionPurgeStatusType::Complete, &opts)
        .await
        .unwrap();

    let err = t.set.get_object_versions(BUCKET, "solo", &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound(..)));
}

#[tokio::test]
async fn test_purge_transition_accepts_null_version_id() {
    let t = default_set(4).await;
    let opts = ObjectOptions::default();

    t.set.put_object_version(BUCKET, "plain", 1, &opts).await.unwrap();
    let mut replicate = opts.clone().with_version_id("null");
    replicate.replicate_delete = true;
    let marked = t.set.delete_object(BUCKET, "plain", &replicate).await.unwrap();
    assert!(marked.version_purge_status.is_pending());

    t.set
        .transition_purge_status(BUCKET, "plain", "null", VersionPurgeStatusType::Complete, &opts)
        .await
        .unwrap();
    let err = t.set.get_object_versions(BUCKET, "plain", &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound(..)));
}

#[tokio::test]
async fn test_write_quorum_failure_leaves_history_unchanged() {
    let t = default_set(4).await;
    let opts = ObjectOptions::versioned();

    t.set.put_object_version(BUCKET, "ledger", 1, &opts).await.unwrap();
    let before = t.set.get_object_versions(BUCKET, "ledger", &opts).await.unwrap();

    t.disks[0].set_fail_writes(true);
    t.disks[1].set_fail_writes(true);

    let err = t.set.put_object_version(BUCKET, "ledger", 2, &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::ErasureWriteQuorum));
    let err = t.set.put_object_version(BUCKET, "fresh", 2, &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::ErasureWriteQuorum));

    t.disks[0].set_fail_writes(false);
    t.disks[1].set_fail_writes(false);

    for disk in &t.disks {
        let on_disk = shardmeta_disk::DiskAPI::read_versions(disk.as_ref(), BUCKET, "ledger")
            .await
            .unwrap();
        assert_eq!(on_disk, before);
        let err = shardmeta_disk::DiskAPI::read_versions(disk.as_ref(), BUCKET, "fresh")
            .await
            .unwrap_err();
        assert_eq!(err, DiskError::FileNotFound);
    }
}

#[tokio::test]
async fn test_single_disk_fault_still_reaches_quorum() {
    let t = default_set(4).await;
    let opts = ObjectOptions::versioned();

    t.disks[0].set_offline(true);
    let fi = t.set.put_object_version(BUCKET, "ledger", 1, &opts).await.unwrap();
    t.disks[0].set_offline(false);

    let info = t.set.get_object_info(BUCKET, "ledger", &opts).await.unwrap();
    assert_eq!(info.version_id, fi.version_id);
}

#[tokio::test]
async fn test_disk_that_missed_a_write_does_not_lose_versions() {
    let t = default_set(3).await;
    let opts = ObjectOptions::versioned();

    let v1 = t.set.put_object_version(BUCKET, "ledger", 1, &opts).await.unwrap();
    t.disks[0].set_fail_writes(true);
    let v2 = t.set.put_object_version(BUCKET, "ledger", 2, &opts).await.unwrap();
    t.disks[0].set_fail_writes(false);

    let history = t.set.get_object_versions(BUCKET, "ledger", &opts).await.unwrap();
    assert_eq!(history.versions.len(), 2);

    let v3 = t.set.put_object_version(BUCKET, "ledger", 3, &opts).await.unwrap();
    let history = t.set.get_object_versions(BUCKET, "ledger", &opts).await.unwrap();
    let ids: Vec<&str> = history.versions.iter().map(|fi| fi.version_id.as_str()).collect();
    assert_eq!(ids, [v1.version_id.as_str(), v2.version_id.as_str(), v3.version_id.as_str()]);

    for disk in &t.disks {
        let stored = shardmeta_disk::DiskAPI::read_versions(disk.as_ref(), BUCKET, "ledger")
            .await
            .unwrap();
        assert_eq!(stored.versions.len(), 3);
    }
}

#[tokio::test]
async fn test_read_without_agreeing_quorum_fails() {
    let t = default_set(3).await;
    let opts = ObjectOptions::versioned();

    t.set.put_object_version(BUCKET, "ledger", 1, &opts).await.unwrap();
    t.disks[0].set_fail_writes(true);
    t.set.put_object_version(BUCKET, "ledger", 2, &opts).await.unwrap();
    t.disks[0].set_fail_writes(false);
    t.disks[1].set_offline(true);

    let err = t.set.get_object_versions(BUCKET, "ledger", &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::ErasureReadQuorum));
}

#[tokio::test]
async fn test_lock_timeout_has_no_side_effects() {
    let t = default_set(4).await;
    let opts = ObjectOptions::versioned();

    t.set.put_object_version(BUCKET, "slow", 1, &opts).await.unwrap();
    for disk in &t.disks {
        disk.set_write_delay(Duration::from_millis(300));
    }

    let set = t.set.clone();
    let writer = tokio::spawn(async move {
        set.put_object_version(BUCKET, "slow", 2, &ObjectOptions::versioned()).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let hurried = ObjectOptions::versioned().with_lock_timeout(Duration::from_millis(20));
    let err = t.set.delete_object(BUCKET, "slow", &hurried).await.unwrap_err();
    assert!(matches!(err, StorageError::Lock(ref e) if e.is_timeout()));

    writer.await.unwrap().unwrap();
    for disk in &t.disks {
        disk.set_write_delay(Duration::ZERO);
    }

    let history = t.set.get_object_versions(BUCKET, "slow", &opts).await.unwrap();
    assert_eq!(history.versions.len(), 2);
    assert!(history.versions.iter().all(|v| !v.deleted));
}

#[tokio::test]
async fn test_mutations_are_audited() {
    let t = default_set(4).await;
    let opts = ObjectOptions::versioned();

    let fi = t.set.put_object_version(BUCKET, "a/b.txt", 3, &opts).await.unwrap();
    let marker = t.set.delete_object(BUCKET, "a/b.txt", &opts).await.unwrap();
    t.set.get_object_versions(BUCKET, "a/b.txt", &opts).await.unwrap();

    assert_eq!(t.audit.api_names(), vec!["PutObject", "DeleteObject"]);
    let seen = t.audit.seen.lock();
    assert_eq!(seen[0].bucket, BUCKET);
    assert_eq!(seen[0].object, "a/b.txt");
    assert_eq!(seen[0].version_id, fi.version_id);
    assert_eq!(seen[1].version_id, marker.version_id);
    assert_eq!(seen[1].status, "OK");
}

#[tokio::test]
async fn test_invalid_put_arguments() {
    let t = default_set(4).await;

    let err = t
        .set
        .put_object_version(BUCKET, "neg", -1, &ObjectOptions::versioned())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));

    let err = t
        .set
        .put_object_version(BUCKET, "bad-id", 1, &ObjectOptions::versioned().with_version_id("not-a-uuid"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));

    let err = t
        .set
        .put_object_version("missing", "obj", 1, &ObjectOptions::versioned())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::VolumeNotFound(ref v) if v == "missing"));

    let far_future = time::Date::from_calendar_date(2300, time::Month::January, 1)
        .unwrap()
        .midnight()
        .assume_utc();
    for mod_time in [far_future, time::OffsetDateTime::UNIX_EPOCH] {
        let mut opts = ObjectOptions::versioned();
        opts.mod_time = Some(mod_time);
        let err = t.set.put_object_version(BUCKET, "when", 1, &opts).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
        let err = t.set.delete_object(BUCKET, "when", &opts).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
    }
    let err = t.set.get_object_versions(BUCKET, "when", &ObjectOptions::versioned()).await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound(..)));
}

#[tokio::test]
async fn test_max_versions_enforced() {
    let config = StorageConfig {
        max_versions: 2,
        ..Default::default()
    };
    let t = new_set(4, config).await;
    let opts = ObjectOptions::versioned();

    t.set.put_object_version(BUCKET, "capped", 1, &opts).await.unwrap();
    t.set.put_object_version(BUCKET, "capped", 2, &opts).await.unwrap();
    let err = t.set.put_object_version(BUCKET, "capped", 3, &opts).await.unwrap_err();
    assert!(matches!(err, StorageError::MaxVersionsExceeded(2)));

    let history = t.set.get_object_versions(BUCKET, "capped", &opts).await.unwrap();
    assert_eq!(history.versions.len(), 2);
}
