//! # reseal-ledger — Reference Ledger Collaborator
//!
//! An in-memory stand-in for the on-chain side of confidential asset
//! transfers. It keeps one [`AssetRecord`] per asset (owner plus the single
//! current sealed key), applies transfer requests atomically after the proof
//! verifies, and shapes blob references for the asset's public image and
//! encrypted payload.
//!
//! ## Transfer Application
//!
//! [`MemoryLedger::submit`] moves a [`Transfer`](reseal_primitives::Transfer)
//! from `Submitted` to `Verified` or `Rejected`. On `Verified` the owner and
//! sealed key are replaced together; on `Rejected` nothing changes.
//!
//! Checks, in order:
//! 1. the asset exists
//! 2. the sender is the current owner
//! 3. the old sealed key is the current one (a consumed transfer cannot replay)
//! 4. the new ephemeral was never used for this asset
//! 5. the proof verifies
//!
//! ## Storage
//!
//! Blobs live behind [`BlobStore`]; [`StorageConfig`] decides how references
//! look (object-store paths or content-addressed blob ids).

pub mod config;
pub mod ledger;
pub mod records;
pub mod storage;

pub use config::{ConfigError, LedgerConfig, Network, StorageConfig};
pub use ledger::{LedgerError, LedgerEvent, MemoryLedger};
pub use records::AssetRecord;
pub use storage::{store_asset_blobs, BlobStore, MemoryBlobStore};

/// Ledger wired to the real transfer proof verifier.
pub type DefaultLedger = MemoryLedger<reseal_verifier::ResealVerifier>;
