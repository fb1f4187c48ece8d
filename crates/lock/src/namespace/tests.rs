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

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn key(object: &str) -> ObjectKey {
    ObjectKey::new("bucket", object)
}

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_write_lock_excludes_writer() {
    let ns = NamespaceLock::new();
    let guard = ns.get_write_lock(key("obj"), "owner1", WAIT).await.unwrap();
    assert_eq!(guard.owner(), "owner1");
    assert_eq!(guard.lock_type(), LockType::Exclusive);
    assert_eq!(guard.key().to_string(), "bucket/obj");

    let err = ns
        .get_write_lock(key("obj"), "owner2", Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    drop(guard);
    let again = ns.get_write_lock(key("obj"), "owner2", WAIT).await;
    assert!(again.is_ok());
}

#[tokio::test]
async fn test_read_locks_share() {
    let ns = NamespaceLock::new();
    let r1 = ns.get_read_lock(key("obj"), "r1", WAIT).await.unwrap();
    let r2 = ns.get_read_lock(key("obj"), "r2", WAIT).await.unwrap();
    assert_eq!(r1.lock_type(), LockType::Shared);

    let err = ns.get_write_lock(key("obj"), "w", Duration::from_millis(50)).await;
    assert!(matches!(err, Err(LockError::Timeout { .. })));

    r1.release();
    r2.release();
    assert!(ns.get_write_lock(key("obj"), "w", WAIT).await.is_ok());
}

#[tokio::test]
async fn test_distinct_keys_do_not_contend() {
    let ns = NamespaceLock::new();
    let _a = ns.get_write_lock(key("a"), "o", WAIT).await.unwrap();
    let b = ns.get_write_lock(key("b"), "o", Duration::from_millis(10)).await;
    assert!(b.is_ok());

    let other_bucket = ns
        .get_write_lock(ObjectKey::new("other", "a"), "o", Duration::from_millis(10))
        .await;
    assert!(other_bucket.is_ok());
}

#[tokio::test]
async fn test_entries_removed_after_release_and_timeout() {
    let ns = NamespaceLock::new();
    let guard = ns.get_write_lock(key("obj"), "o", WAIT).await.unwrap();
    assert_eq!(ns.active_keys(), 1);

    // a waiter that gives up must not leave its own reference behind
    let _ = ns.get_write_lock(key("obj"), "late", Duration::from_millis(10)).await;
    assert_eq!(ns.active_keys(), 1);

    drop(guard);
    assert_eq!(ns.active_keys(), 0);
}

#[tokio::test]
async fn test_cancelled_waiter_cleans_up() {
    let ns = NamespaceLock::new();
    let guard = ns.get_write_lock(key("obj"), "o", WAIT).await.unwrap();

    let waiter = {
        let ns = ns.clone();
        tokio::spawn(async move { ns.get_write_lock(key("obj"), "w", WAIT).await.map(|_| ()) })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    waiter.abort();
    let _ = waiter.await;

    drop(guard);
    assert_eq!(ns.active_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_writers_are_serialized() {
    let ns = NamespaceLock::new();
    let inside = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let tasks = (0..32).map(|i| {
        let ns = ns.clone();
        let inside = inside.clone();
        let max_seen = max_seen.clone();
        async move {
            let _g = ns.get_write_lock(key("hot"), &format!("w{i}"), WAIT).await.unwrap();
            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            inside.fetch_sub(1, Ordering::SeqCst);
        }
    });
    futures::future::join_all(tasks.map(tokio::spawn)).await;

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    assert_eq!(ns.active_keys(), 0);
}
