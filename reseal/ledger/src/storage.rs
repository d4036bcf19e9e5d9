//! Blob storage for asset images and encrypted payloads.
//!
//! The ledger only keeps references; the bytes live in a [`BlobStore`].
//! How a reference looks depends on [`StorageConfig`]:
//!
//! ```text
//! bucket:  {endpoint}/{bucket}/{folder}/{name}
//! walrus:  {aggregator_url}/v1/{blob_id}      blob_id = hex(sha256(bytes))
//! ```

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::config::StorageConfig;
use crate::ledger::LedgerError;

/// Suffix of the encrypted payload next to its public image.
pub const CIPHERTEXT_SUFFIX: &str = "_ciphertext";

pub trait BlobStore {
    /// Store `data` under `name` and return its reference.
    fn put(&mut self, name: &str, data: &[u8]) -> Result<String, LedgerError>;

    /// Fetch the bytes behind a reference.
    fn get(&self, reference: &str) -> Result<Vec<u8>, LedgerError>;

    /// Drop a blob. Deleting a missing reference is an error.
    fn delete(&mut self, reference: &str) -> Result<(), LedgerError>;
}

/// Store an asset's public image and its encrypted payload.
///
/// # Returns
/// `(image_url, ciphertext_url)`, ready for an [`AssetRecord`](crate::AssetRecord).
pub fn store_asset_blobs<S: BlobStore>(
    store: &mut S,
    name: &str,
    image: &[u8],
    encrypted_payload: &[u8],
) -> Result<(String, String), LedgerError> {
    let image_url = store.put(name, image)?;
    let ciphertext_url = store.put(&format!("{name}{CIPHERTEXT_SUFFIX}"), encrypted_payload)?;
    Ok((image_url, ciphertext_url))
}

/// Blob store held in memory, shaping references per its [`StorageConfig`].
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    config: StorageConfig,
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new(config: StorageConfig) -> Self {
        MemoryBlobStore {
            config,
            blobs: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    fn reference_for(&self, name: &str, data: &[u8]) -> Result<String, LedgerError> {
        match &self.config {
            StorageConfig::Bucket {
                endpoint,
                bucket,
                folder,
                ..
            } => {
                if name.is_empty() || name.contains('/') {
                    return Err(LedgerError::Storage(format!("invalid object name: {name:?}")));
                }
                Ok(format!(
                    "{}/{bucket}/{folder}/{name}",
                    endpoint.trim_end_matches('/')
                ))
            }
            StorageConfig::Walrus { aggregator_url, .. } => Ok(format!(
                "{}/v1/{}",
                aggregator_url.trim_end_matches('/'),
                blob_id(data)
            )),
        }
    }
}

/// Content address of a blob: hex SHA-256 of its bytes.
pub fn blob_id(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, name: &str, data: &[u8]) -> Result<String, LedgerError> {
        let reference = self.reference_for(name, data)?;
        log::trace!(target: "reseal::ledger", "put blob: {} ({} bytes)", reference, data.len());
        self.blobs.insert(reference.clone(), data.to_vec());
        Ok(reference)
    }

    fn get(&self, reference: &str) -> Result<Vec<u8>, LedgerError> {
        self.blobs
            .get(reference)
            .cloned()
            .ok_or_else(|| LedgerError::Storage(format!("blob not found: {reference}")))
    }

    fn delete(&mut self, reference: &str) -> Result<(), LedgerError> {
        self.blobs
            .remove(reference)
            .map(|_| ())
            .ok_or_else(|| LedgerError::Storage(format!("blob not found: {reference}")))
    }
}
