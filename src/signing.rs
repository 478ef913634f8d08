//! Hashing and signing of persisted configuration
//!
//! A configuration is serialized to JSON, the bytes are run through a
//! [`HashFunction`] and the digest is signed by a [`Signer`]. Hash and
//! signature are stored hex encoded next to the value in a [`Signed`]
//! envelope.

use alloy_primitives::keccak256;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::liquidity::Signed;

/// Digest over arbitrary bytes
pub type HashFunction = fn(&[u8]) -> Vec<u8>;

pub fn keccak256_hash(data: &[u8]) -> Vec<u8> {
    keccak256(data).to_vec()
}

pub fn sha256_hash(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// Lowercase hex keccak256 of a cold wallet address
pub fn address_hash(address: &str) -> String {
    hex::encode(keccak256(address.as_bytes()))
}

/// Produces signatures over already hashed data
pub trait Signer: Send + Sync {
    fn sign_bytes(&self, digest: &[u8]) -> Result<Vec<u8>>;
}

/// Local ed25519 signer
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Build from a hex encoded 32 byte seed
    pub fn from_hex(seed_hex: &str) -> Result<Self> {
        let bytes = hex::decode(seed_hex.trim().trim_start_matches("0x"))
            .map_err(|e| Error::Signing(format!("invalid signer key hex: {}", e)))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::Signing(format!("signer key must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Self::new(SigningKey::from_bytes(&seed)))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl Signer for Ed25519Signer {
    fn sign_bytes(&self, digest: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(digest).to_bytes().to_vec())
    }
}

/// Serialize, hash and sign `value` into a [`Signed`] envelope
pub fn sign_configuration<T: Serialize>(
    signer: &dyn Signer,
    hash_function: HashFunction,
    value: T,
) -> Result<Signed<T>> {
    let bytes = serde_json::to_vec(&value)?;
    let digest = hash_function(&bytes);
    let signature = signer.sign_bytes(&digest)?;

    debug!("Signed configuration ({} bytes)", bytes.len());

    Ok(Signed {
        value,
        hash: hex::encode(digest),
        signature: hex::encode(signature),
    })
}
