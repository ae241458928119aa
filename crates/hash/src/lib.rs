#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Content addressing for crumbs
//!
//! Hashes file contents so that exact-copy lookups over a repository
//! snapshot do not need a linear scan per published file. xxHash 128 is the
//! default; BLAKE3 is available when a cryptographic digest is preferred.

mod index;

pub use index::ContentIndex;

use crumbs_errors::Error;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128;

/// Hash algorithm used for content addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "xxh3")]
    XxHash128,
    Blake3,
}

impl std::str::FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xxh3" | "xxhash128" => Ok(Self::XxHash128),
            "blake3" => Ok(Self::Blake3),
            other => Err(Error::internal(format!("unknown hash algorithm: {other}"))),
        }
    }
}

/// A content hash tagged with the algorithm that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl Hash {
    #[must_use]
    pub fn from_data_with_algorithm(data: &[u8], algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::XxHash128 => Self::xxhash128_from_data(data),
            HashAlgorithm::Blake3 => Self::blake3_from_data(data),
        }
    }

    #[must_use]
    pub fn xxhash128_from_data(data: &[u8]) -> Self {
        Self {
            algorithm: HashAlgorithm::XxHash128,
            bytes: xxh3_128(data).to_be_bytes().to_vec(),
        }
    }

    #[must_use]
    pub fn blake3_from_data(data: &[u8]) -> Self {
        Self {
            algorithm: HashAlgorithm::Blake3,
            bytes: blake3::hash(data).as_bytes().to_vec(),
        }
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
