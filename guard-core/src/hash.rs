//! Hashing utilities
//!
//! This module provides:
//! - A small algorithm table (MD5 through SHA-512) selectable by enum or name
//! - Hex encoding/decoding with an optional byte separator
//! - A constant-time digest comparison

use crate::{Error, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashAlgorithm {
    /// MD5 (legacy stores only)
    Md5,
    /// SHA-1 (legacy stores only)
    Sha1,
    /// SHA-256 (default)
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Canonical algorithm name, also the lookup key for [`from_name`](Self::from_name)
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Parse from canonical name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "MD5" => Ok(HashAlgorithm::Md5),
            "SHA-1" => Ok(HashAlgorithm::Sha1),
            "SHA-256" => Ok(HashAlgorithm::Sha256),
            "SHA-384" => Ok(HashAlgorithm::Sha384),
            "SHA-512" => Ok(HashAlgorithm::Sha512),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }

    /// Digest width in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Sha256
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        HashAlgorithm::from_name(&value)
    }
}

impl From<HashAlgorithm> for String {
    fn from(value: HashAlgorithm) -> Self {
        value.name().to_string()
    }
}

/// Hash arbitrary bytes with the selected algorithm
pub fn compute_hash(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Md5 => Md5::digest(data).to_vec(),
        HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Fold a sequence of byte chunks into one digest
///
/// The digest is seeded with the algorithm name so that an empty sequence
/// still hashes differently per algorithm.
pub fn fold_hash<'a, I>(algorithm: HashAlgorithm, chunks: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    fn fold<'a, D: Digest, I: IntoIterator<Item = &'a [u8]>>(seed: &str, chunks: I) -> Vec<u8> {
        let mut hasher = D::new();
        hasher.update(seed.as_bytes());
        for chunk in chunks {
            hasher.update(chunk);
        }
        hasher.finalize().to_vec()
    }

    let seed = algorithm.name();
    match algorithm {
        HashAlgorithm::Md5 => fold::<Md5, _>(seed, chunks),
        HashAlgorithm::Sha1 => fold::<Sha1, _>(seed, chunks),
        HashAlgorithm::Sha256 => fold::<Sha256, _>(seed, chunks),
        HashAlgorithm::Sha384 => fold::<Sha384, _>(seed, chunks),
        HashAlgorithm::Sha512 => fold::<Sha512, _>(seed, chunks),
    }
}

/// Digest of a serializable value sequence in traversal order
///
/// Each value is hashed over its canonical bincode bytes, then the per-value
/// digests are folded in order. Used by every guarded container.
pub(crate) fn digest_sequence<'a, T, I>(algorithm: HashAlgorithm, values: I) -> Vec<u8>
where
    T: Serialize + 'a,
    I: Iterator<Item = &'a T>,
{
    let chunks: Vec<Vec<u8>> = values
        .map(|value| {
            let bytes = bincode::serialize(value).expect("serialization cannot fail");
            compute_hash(algorithm, &bytes)
        })
        .collect();
    fold_hash(algorithm, chunks.iter().map(|c| c.as_slice()))
}

/// Encode bytes as hex, optionally separated and uppercased
pub fn to_hex(bytes: &[u8], upper: bool, separator: Option<char>) -> String {
    let encoded = if upper {
        hex::encode_upper(bytes)
    } else {
        hex::encode(bytes)
    };

    match separator {
        None => encoded,
        Some(sep) => {
            let mut out = String::with_capacity(encoded.len() + bytes.len());
            for (i, pair) in encoded.as_bytes().chunks(2).enumerate() {
                if i > 0 {
                    out.push(sep);
                }
                // chunks(2) over hex output is always valid UTF-8
                out.push(pair[0] as char);
                if pair.len() > 1 {
                    out.push(pair[1] as char);
                }
            }
            out
        }
    }
}

/// Decode a hex string, stripping an optional separator first
///
/// An odd number of hex digits or a non-hex character is a precondition
/// violation and reported as [`Error::InvalidHex`].
pub fn from_hex(input: &str, separator: Option<char>) -> Result<Vec<u8>> {
    let stripped: String = match separator {
        None => input.to_string(),
        Some(sep) => input.chars().filter(|c| *c != sep).collect(),
    };

    hex::decode(&stripped).map_err(|e| Error::InvalidHex(format!("{}: {:?}", e, input)))
}

/// Constant-time digest comparison
///
/// Length check first, then XOR-accumulate every byte pair without
/// short-circuiting, to resist timing side channels.
pub fn compare_hashes(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_names_round_trip() {
        for algorithm in [
            HashAlgorithm::Md5,
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            assert_eq!(HashAlgorithm::from_name(algorithm.name()).unwrap(), algorithm);
        }

        assert!(HashAlgorithm::from_name("SHA-224").is_err());
    }

    #[test]
    fn test_compute_hash_deterministic() {
        let data = b"score:1500";
        for algorithm in [
            HashAlgorithm::Md5,
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            let h1 = compute_hash(algorithm, data);
            let h2 = compute_hash(algorithm, data);
            assert_eq!(h1, h2);
            assert_eq!(h1.len(), algorithm.digest_len());
        }
    }

    #[test]
    fn test_compute_hash_differs_across_algorithms() {
        let data = b"score:1500";
        let sha256 = compute_hash(HashAlgorithm::Sha256, data);
        let sha512 = compute_hash(HashAlgorithm::Sha512, data);
        assert_ne!(sha256, sha512[..32].to_vec());
    }

    #[test]
    fn test_fold_hash_empty_sequences_differ_per_algorithm() {
        let empty: Vec<&[u8]> = vec![];
        let a = fold_hash(HashAlgorithm::Sha256, empty.clone());
        let b = fold_hash(HashAlgorithm::Sha384, empty);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fold_hash_order_sensitive() {
        let x: &[u8] = b"x";
        let y: &[u8] = b"y";
        let xy = fold_hash(HashAlgorithm::Sha256, [x, y]);
        let yx = fold_hash(HashAlgorithm::Sha256, [y, x]);
        assert_ne!(xy, yx);
    }

    #[test]
    fn test_to_hex_plain_and_separated() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        assert_eq!(to_hex(&bytes, false, None), "deadbeef");
        assert_eq!(to_hex(&bytes, true, None), "DEADBEEF");
        assert_eq!(to_hex(&bytes, false, Some(':')), "de:ad:be:ef");
        assert_eq!(to_hex(&bytes, true, Some('-')), "DE-AD-BE-EF");
    }

    #[test]
    fn test_from_hex_round_trip() {
        let bytes = compute_hash(HashAlgorithm::Sha384, b"payload");
        let encoded = to_hex(&bytes, false, Some(':'));
        let decoded = from_hex(&encoded, Some(':')).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_from_hex_odd_length_is_loud() {
        assert!(matches!(from_hex("abc", None), Err(Error::InvalidHex(_))));
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        assert!(from_hex("zz", None).is_err());
    }

    #[test]
    fn test_compare_hashes() {
        let a = compute_hash(HashAlgorithm::Sha256, b"a");
        let b = compute_hash(HashAlgorithm::Sha256, b"b");
        assert!(compare_hashes(&a, &a));
        assert!(!compare_hashes(&a, &b));
        assert!(!compare_hashes(&a, &a[..31]));
    }
}
