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

use highway::{HighwayHash, HighwayHasher, Key};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The fixed key for HighwayHash256. DO NOT change for compatibility.
const HIGHWAY_HASH256_KEY: [u64; 4] = [3, 4, 2, 1];

/// SHA-256 of the empty string.
pub const EMPTY_STRING_SHA256_HASH: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// A collision-resistant 256-bit digest.
///
/// Callers that need a stable hash of object keys (placement in particular)
/// depend on this trait only. Which implementation backs it is decided at
/// build time by the `fips` feature.
pub trait Sha256Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn sum256(&self, data: &[u8]) -> [u8; 32];
}

/// RustCrypto `sha2` implementation, used unless `fips` is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha2Provider;

impl Sha256Provider for Sha2Provider {
    fn name(&self) -> &'static str {
        "sha2"
    }

    fn sum256(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }
}

/// aws-lc-rs implementation, FIPS validated module.
#[cfg(feature = "fips")]
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsLcProvider;

#[cfg(feature = "fips")]
impl Sha256Provider for AwsLcProvider {
    fn name(&self) -> &'static str {
        "aws-lc-rs"
    }

    fn sum256(&self, data: &[u8]) -> [u8; 32] {
        let digest = aws_lc_rs::digest::digest(&aws_lc_rs::digest::SHA256, data);
        let mut out = [0u8; 32];
        out.copy_from_slice(digest.as_ref());
        out
    }
}

#[cfg(not(feature = "fips"))]
static DEFAULT_SHA256: Sha2Provider = Sha2Provider;
#[cfg(feature = "fips")]
static DEFAULT_SHA256: AwsLcProvider = AwsLcProvider;

/// The SHA-256 provider selected for this build.
pub fn default_sha256() -> &'static dyn Sha256Provider {
    &DEFAULT_SHA256
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone, Eq, Hash)]
/// Supported hash algorithms for part checksums.
pub enum HashAlgorithm {
    SHA256,
    #[default]
    HighwayHash256,
    /// BLAKE3, 256-bit output.
    Blake3,
    /// No hash (for testing or unprotected data)
    None,
}

enum HashEncoded {
    Sha256([u8; 32]),
    HighwayHash256([u8; 32]),
    Blake3(blake3::Hash),
    None,
}

impl AsRef<[u8]> for HashEncoded {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        match self {
            HashEncoded::Sha256(hash) => hash.as_ref(),
            HashEncoded::HighwayHash256(hash) => hash.as_ref(),
            HashEncoded::Blake3(hash) => hash.as_bytes(),
            HashEncoded::None => &[],
        }
    }
}

#[inline]
fn u8x32_from_u64x4(input: [u64; 4]) -> [u8; 32] {
    let mut output = [0u8; 32];
    for (i, &n) in input.iter().enumerate() {
        output[i * 8..(i + 1) * 8].copy_from_slice(&n.to_le_bytes());
    }
    output
}

impl HashAlgorithm {
    /// Hash `data`; the result borrows as a byte slice of [`HashAlgorithm::size`] bytes.
    pub fn hash_encode(&self, data: &[u8]) -> impl AsRef<[u8]> {
        match self {
            HashAlgorithm::SHA256 => HashEncoded::Sha256(default_sha256().sum256(data)),
            HashAlgorithm::HighwayHash256 => {
                let mut hasher = HighwayHasher::new(Key(HIGHWAY_HASH256_KEY));
                hasher.append(data);
                HashEncoded::HighwayHash256(u8x32_from_u64x4(hasher.finalize256()))
            }
            HashAlgorithm::Blake3 => HashEncoded::Blake3(blake3::hash(data)),
            HashAlgorithm::None => HashEncoded::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::SHA256 => "sha256",
            HashAlgorithm::HighwayHash256 => "highwayhash256",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::None => "",
        }
    }

    /// Inverse of [`HashAlgorithm::as_str`]; unknown names map to `None`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "sha256" => HashAlgorithm::SHA256,
            "highwayhash256" => HashAlgorithm::HighwayHash256,
            "blake3" => HashAlgorithm::Blake3,
            _ => HashAlgorithm::None,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            HashAlgorithm::SHA256 | HashAlgorithm::HighwayHash256 | HashAlgorithm::Blake3 => 32,
            HashAlgorithm::None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn test_default_provider_matches_known_digest() {
        let p = default_sha256();
        assert_eq!(hex(&p.sum256(b"")), EMPTY_STRING_SHA256_HASH);
        assert_eq!(
            hex(&p.sum256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[cfg(feature = "fips")]
    #[test]
    fn test_providers_agree() {
        for data in [&b""[..], b"report.csv", b"bucket/object/with/slashes"] {
            assert_eq!(Sha2Provider.sum256(data), AwsLcProvider.sum256(data));
        }
    }

    #[test]
    fn test_hash_algorithm_sizes() {
        assert_eq!(HashAlgorithm::HighwayHash256.size(), 32);
        assert_eq!(HashAlgorithm::SHA256.size(), 32);
        assert_eq!(HashAlgorithm::Blake3.size(), 32);
        assert_eq!(HashAlgorithm::None.size(), 0);
    }

    #[test]
    fn test_hash_encode_lengths_and_determinism() {
        let data = b"test data";
        for algo in [HashAlgorithm::SHA256, HashAlgorithm::HighwayHash256, HashAlgorithm::Blake3, HashAlgorithm::None] {
            let a = algo.hash_encode(data);
            let b = algo.hash_encode(data);
            assert_eq!(a.as_ref().len(), algo.size());
            assert_eq!(a.as_ref(), b.as_ref());
        }
    }

    #[test]
    fn test_hash_algorithm_names() {
        for algo in [HashAlgorithm::SHA256, HashAlgorithm::HighwayHash256, HashAlgorithm::Blake3, HashAlgorithm::None] {
            assert_eq!(HashAlgorithm::from_name(algo.as_str()), algo);
        }
        assert_eq!(HashAlgorithm::from_name("md5"), HashAlgorithm::None);
    }

    #[test]
    fn test_different_data_different_hashes() {
        for algo in [HashAlgorithm::SHA256, HashAlgorithm::HighwayHash256, HashAlgorithm::Blake3] {
            let h1 = algo.hash_encode(b"test data 1");
            let h2 = algo.hash_encode(b"test data 2");
            assert_ne!(h1.as_ref(), h2.as_ref(), "{algo:?}");
        }
    }
}
