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

//! Per-disk API call counters and moving-average latencies.
//!
//! Every counter is a plain atomic so request paths never wait on a reader;
//! [`DiskMetricsTracker::snapshot`] copies the atomics one by one.

use shardmeta_madmin::DiskMetrics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Disk operations that are timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiskApi {
    MakeVolume,
    ListVolumes,
    StatVolume,
    DeleteVolume,
    ReadVersions,
    WriteVersions,
    DeleteVersions,
    ListObjects,
    DiskInfo,
}

impl DiskApi {
    pub const ALL: [DiskApi; 9] = [
        DiskApi::MakeVolume,
        DiskApi::ListVolumes,
        DiskApi::StatVolume,
        DiskApi::DeleteVolume,
        DiskApi::ReadVersions,
        DiskApi::WriteVersions,
        DiskApi::DeleteVersions,
        DiskApi::ListObjects,
        DiskApi::DiskInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiskApi::MakeVolume => "MakeVolume",
            DiskApi::ListVolumes => "ListVolumes",
            DiskApi::StatVolume => "StatVolume",
            DiskApi::DeleteVolume => "DeleteVolume",
            DiskApi::ReadVersions => "ReadVersions",
            DiskApi::WriteVersions => "WriteVersions",
            DiskApi::DeleteVersions => "DeleteVersions",
            DiskApi::ListObjects => "ListObjects",
            DiskApi::DiskInfo => "DiskInfo",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// Weight of a new sample in the moving average, as a shift: 1/8.
const EWMA_SHIFT: u32 = 3;

#[derive(Debug, Default)]
struct ApiCounter {
    calls: AtomicU64,
    avg_nanos: AtomicU64,
}

impl ApiCounter {
    fn observe(&self, elapsed: Duration) {
        let sample = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        // The closure always returns Some, so the update cannot fail.
        let _ = self.avg_nanos.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |old| {
            if old == 0 {
                Some(sample)
            } else {
                Some(old - (old >> EWMA_SHIFT) + (sample >> EWMA_SHIFT))
            }
        });
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

/// Lock-free counters for one disk. Values reset when the process restarts.
#[derive(Debug, Default)]
pub struct DiskMetricsTracker {
    apis: [ApiCounter; DiskApi::ALL.len()],
}

impl DiskMetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, api: DiskApi, elapsed: Duration) {
        self.apis[api.index()].observe(elapsed);
    }

    /// Starts timing one call; the sample is recorded when the timer drops.
    pub fn start(&self, api: DiskApi) -> ApiTimer<'_> {
        ApiTimer {
            tracker: self,
            api,
            started: Instant::now(),
        }
    }

    pub fn calls(&self, api: DiskApi) -> u64 {
        self.apis[api.index()].calls.load(Ordering::Relaxed)
    }

    pub fn avg_latency(&self, api: DiskApi) -> Duration {
        Duration::from_nanos(self.apis[api.index()].avg_nanos.load(Ordering::Relaxed))
    }

    /// Copies the counters of every API that has been called at least once.
    pub fn snapshot(&self) -> DiskMetrics {
        let mut metrics = DiskMetrics::default();
        for api in DiskApi::ALL {
            let calls = self.calls(api);
            if calls > 0 {
                metrics.record(api.as_str(), calls, self.avg_latency(api));
            }
        }
        metrics
    }
}

pub struct ApiTimer<'a> {
    tracker: &'a DiskMetricsTracker,
    api: DiskApi,
    started: Instant,
}

impl Drop for ApiTimer<'_> {
    fn drop(&mut self) {
        self.tracker.observe(self.api, self.started.elapsed());
    }
}
