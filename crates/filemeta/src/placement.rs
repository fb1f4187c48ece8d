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

//! Deterministic assignment of erasure shards to disk slots.

use crate::{Error, Result};
use shardmeta_utils::{Sha256Provider, default_sha256};
use siphasher::sip::SipHasher;

/// Computes the shard distribution of `object` over `cardinality` disks.
///
/// The result is a permutation of `1..=cardinality`: position `i` holds the
/// disk slot of shard `i`. It depends only on the key and the count, so every
/// node derives the same layout without coordination.
pub fn resolve_distribution(object: &str, cardinality: usize) -> Result<Vec<usize>> {
    resolve_distribution_with(default_sha256(), object, cardinality)
}

/// [`resolve_distribution`] with an explicit hash provider.
///
/// The SHA-256 of the key seeds a SipHash-2-4 keystream (key: the first 16
/// digest bytes, input: a little-endian step counter) that drives a
/// Fisher-Yates shuffle. Nothing here depends on an RNG crate, so the layout
/// of a key never changes across releases.
pub fn resolve_distribution_with(hasher: &dyn Sha256Provider, object: &str, cardinality: usize) -> Result<Vec<usize>> {
    if cardinality == 0 {
        return Err(Error::InvalidArgument(format!(
            "cannot distribute {object:?} over zero shards"
        )));
    }

    let seed = hasher.sum256(object.as_bytes());
    let mut key = [0u8; 16];
    key.copy_from_slice(&seed[..16]);
    let sip = SipHasher::new_with_key(&key);

    let mut nums: Vec<usize> = (1..=cardinality).collect();
    let mut step: u64 = 0;
    for i in (1..cardinality).rev() {
        let r = sip.hash(&step.to_le_bytes());
        step += 1;
        let j = (r % (i as u64 + 1)) as usize;
        nums.swap(i, j);
    }

    Ok(nums)
}

/// Whether `distribution` is a permutation of `1..=cardinality`.
pub fn is_valid_distribution(distribution: &[usize], cardinality: usize) -> bool {
    if cardinality == 0 || distribution.len() != cardinality {
        return false;
    }

    let mut seen = vec![false; cardinality];
    for &slot in distribution {
        if slot == 0 || slot > cardinality || seen[slot - 1] {
            return false;
        }
        seen[slot - 1] = true;
    }
    true
}
