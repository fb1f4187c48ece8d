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

use proptest::prelude::*;
use shardmeta_filemeta::{
    Error, FileInfo, FileInfoVersions, VersionPurgeStatusType, find_version_index, is_valid_distribution,
};
use time::OffsetDateTime;

fn at(secs: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000 + secs).unwrap()
}

#[test]
fn test_create_then_delete_marker() {
    let mut fi = FileInfo::new("report.csv", 4, 2).unwrap();
    assert_eq!(fi.erasure.distribution().len(), 6);
    assert!(is_valid_distribution(fi.erasure.distribution(), 6));

    fi.version_id = "v1".into();
    fi.mod_time = Some(at(0));

    let mut history = FileInfoVersions::new("bucket", "report.csv");
    history.add_version(fi, 100).unwrap();
    history.append_delete_marker("dm1", at(60), 100).unwrap();

    assert_eq!(history.versions.len(), 2);
    assert!(!history.versions[0].is_latest);
    assert!(history.versions[1].deleted);
    assert!(history.versions[1].is_latest);
    assert_eq!(history.versions[0].successor_mod_time, history.versions[1].mod_time);

    // survives a trip through the on-disk encoding unchanged
    let decoded = FileInfoVersions::unmarshal(&history.marshal_msg().unwrap()).unwrap();
    assert_eq!(decoded, history);
}

#[test]
fn test_find_version_index_absent_inputs() {
    assert_eq!(find_version_index(None, "anything"), None);
    let h = FileInfoVersions::new("bucket", "obj");
    assert_eq!(find_version_index(Some(&h), ""), None);
}

#[test]
fn test_purge_path_and_terminal_state() {
    let mut h = FileInfoVersions::new("bucket", "obj");
    h.add_version(
        FileInfo {
            version_id: "v1".into(),
            mod_time: Some(at(1)),
            ..Default::default()
        },
        10,
    )
    .unwrap();

    for s in [
        VersionPurgeStatusType::Pending,
        VersionPurgeStatusType::Failed,
        VersionPurgeStatusType::Pending,
        VersionPurgeStatusType::Complete,
    ] {
        h.transition_purge_status("v1", s).unwrap();
    }
    for s in [
        VersionPurgeStatusType::Pending,
        VersionPurgeStatusType::Failed,
        VersionPurgeStatusType::Complete,
        VersionPurgeStatusType::Empty,
    ] {
        assert!(matches!(
            h.transition_purge_status("v1", s),
            Err(Error::IllegalPurgeTransition { .. })
        ));
    }
}

#[derive(Debug, Clone)]
enum Op {
    Put(u8, i64),
    Delete(i64),
    Remove(u8),
    MarkDeleted(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, 0i64..50).prop_map(|(id, t)| Op::Put(id, t)),
        (0i64..50).prop_map(Op::Delete),
        (0u8..6).prop_map(Op::Remove),
        (0u8..6).prop_map(Op::MarkDeleted),
    ]
}

proptest! {
    #[test]
    fn prop_exactly_one_latest(ops in prop::collection::vec(op(), 1..40)) {
        let mut h = FileInfoVersions::new("bucket", "obj");
        let mut markers = 0;
        for op in ops {
            match op {
                Op::Put(id, t) => {
                    let _ = h.add_version(FileInfo {
                        version_id: format!("v{id}"),
                        mod_time: Some(at(t)),
                        ..Default::default()
                    }, 1000);
                }
                Op::Delete(t) => {
                    markers += 1;
                    let _ = h.append_delete_marker(&format!("dm{markers}"), at(t), 1000);
                }
                Op::Remove(id) => {
                    h.remove_version(&format!("v{id}"));
                }
                Op::MarkDeleted(id) => {
                    let _ = h.mark_deleted(&format!("v{id}"));
                }
            }

            if h.versions.is_empty() {
                continue;
            }
            prop_assert_eq!(h.versions.iter().filter(|v| v.is_latest).count(), 1);
            for w in h.versions.windows(2) {
                prop_assert!(w[0].mod_time <= w[1].mod_time);
                prop_assert_eq!(w[0].successor_mod_time, w[1].mod_time);
            }

            let before = h.clone();
            h.mark_latest();
            prop_assert_eq!(&h, &before);
        }
    }
}
