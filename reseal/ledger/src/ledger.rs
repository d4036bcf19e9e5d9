use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use parity_scale_codec::Decode;
use thiserror::Error;

use reseal_primitives::{
    AssetId, Error, InvalidTransition, PublicKey, SealedKey, Transfer, TransferRequest,
    TransferVerifier, POINT_SIZE,
};

use crate::config::LedgerConfig;
use crate::records::AssetRecord;

const LOG_TARGET: &str = "reseal::ledger";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] Error),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("unknown asset")]
    UnknownAsset,
    #[error("asset already exists")]
    AssetExists,
    #[error("sender is not the current owner")]
    NotOwner,
    #[error("old sealed key is not the asset's current sealed key")]
    StaleSealedKey,
    #[error("storage: {0}")]
    Storage(String),
    #[error("config: {0}")]
    Config(String),
}

/// What happened, in order. Mirrors the event log a chain would keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    AssetMinted {
        asset_id: AssetId,
        owner: PublicKey,
    },
    TransferVerified {
        asset_id: AssetId,
        from: PublicKey,
        to: PublicKey,
    },
    TransferRejected {
        asset_id: AssetId,
        reason: LedgerError,
    },
}

/// In-memory asset registry.
///
/// `V` verifies transfer proofs; production code uses
/// [`ResealVerifier`](reseal_verifier::ResealVerifier), tests may plug in
/// their own.
pub struct MemoryLedger<V> {
    config: LedgerConfig,
    assets: BTreeMap<AssetId, AssetRecord>,
    /// Every ephemeral an asset's sealed keys have used, mint included.
    /// Grows by one entry per accepted transfer and is never pruned: a new
    /// sealed key whose ephemeral is already here is `RandomnessReuse`.
    ephemerals: BTreeMap<AssetId, BTreeSet<[u8; POINT_SIZE]>>,
    events: Vec<LedgerEvent>,
    _verifier: PhantomData<V>,
}

impl<V: TransferVerifier> MemoryLedger<V> {
    /// Create an empty ledger.
    ///
    /// # Errors
    /// Returns the config's validation error as `LedgerError::Config`.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        config
            .validate()
            .map_err(|e| LedgerError::Config(e.to_string()))?;
        log::debug!(
            target: LOG_TARGET,
            "ledger up: network={:?} package={}",
            config.network,
            config.package_id
        );
        Ok(MemoryLedger {
            config,
            assets: BTreeMap::new(),
            ephemerals: BTreeMap::new(),
            events: Vec::new(),
            _verifier: PhantomData,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Register a freshly minted asset.
    ///
    /// # Errors
    /// * `LedgerError::AssetExists` - the id is taken
    /// * `Error::InvalidKey` - the owner key is not a valid public key
    /// * `Error::Malformed` - the sealed key's ephemeral or masked key is not
    ///   a valid point
    pub fn mint(&mut self, record: AssetRecord) -> Result<(), LedgerError> {
        if self.assets.contains_key(&record.id) {
            return Err(LedgerError::AssetExists);
        }
        record.owner.decompress()?;
        record.sealed_key.ephemeral_point()?;
        record.sealed_key.masked_key_point()?;

        log::debug!(
            target: LOG_TARGET,
            "mint: asset={} owner={}",
            record.id.to_hex(),
            record.owner.to_hex()
        );

        self.ephemerals
            .entry(record.id.clone())
            .or_default()
            .insert(*record.sealed_key.ephemeral());
        self.events.push(LedgerEvent::AssetMinted {
            asset_id: record.id.clone(),
            owner: record.owner,
        });
        self.assets.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn get(&self, asset_id: &AssetId) -> Option<&AssetRecord> {
        self.assets.get(asset_id)
    }

    /// All assets currently owned by `owner`, ordered by id.
    pub fn owned_by(&self, owner: &PublicKey) -> Vec<&AssetRecord> {
        self.assets.values().filter(|r| r.owner == *owner).collect()
    }

    /// Current sealed key of an asset.
    pub fn sealed_key(&self, asset_id: &AssetId) -> Option<&SealedKey> {
        self.assets.get(asset_id).map(|r| &r.sealed_key)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Submit a proposed transfer and apply it if it checks out.
    ///
    /// The transfer moves `Proposed → Submitted`, then `Verified` or
    /// `Rejected`. Either way the call is final: a rejected transfer must be
    /// proposed again with fresh randomness.
    ///
    /// # Errors
    /// * `LedgerError::Transition` - the transfer was not `Proposed`
    /// * `LedgerError::UnknownAsset`, `NotOwner`, `StaleSealedKey`
    /// * `Error::RandomnessReuse` - the new ephemeral was seen before for this asset
    /// * any error from the verifier, e.g. `Error::ProofInvalid`
    pub fn submit(&mut self, transfer: &mut Transfer) -> Result<(), LedgerError> {
        transfer.mark_submitted()?;

        let outcome = self.apply(transfer.request());
        let asset_id = transfer.request().asset_id.clone();
        match &outcome {
            Ok(()) => {
                transfer.mark_verified()?;
                let req = transfer.request();
                log::debug!(
                    target: LOG_TARGET,
                    "transfer verified: asset={} from={} to={}",
                    asset_id.to_hex(),
                    req.sender_pk.to_hex(),
                    req.receiver_pk.to_hex()
                );
                self.events.push(LedgerEvent::TransferVerified {
                    asset_id,
                    from: req.sender_pk,
                    to: req.receiver_pk,
                });
            }
            Err(reason) => {
                transfer.mark_rejected()?;
                log::debug!(
                    target: LOG_TARGET,
                    "transfer rejected: asset={} reason={}",
                    asset_id.to_hex(),
                    reason
                );
                self.events.push(LedgerEvent::TransferRejected {
                    asset_id,
                    reason: reason.clone(),
                });
            }
        }
        outcome
    }

    /// Decode a SCALE-encoded [`TransferRequest`] and submit it.
    ///
    /// # Returns
    /// The transfer, now `Verified`.
    ///
    /// # Errors
    /// `Error::Malformed` if the bytes do not decode; otherwise as [`Self::submit`].
    pub fn submit_encoded(&mut self, mut bytes: &[u8]) -> Result<Transfer, LedgerError> {
        let request = TransferRequest::decode(&mut bytes)
            .map_err(|_| Error::Malformed("transfer request"))?;
        if !bytes.is_empty() {
            return Err(Error::Malformed("trailing bytes").into());
        }
        let mut transfer = Transfer::proposed(request);
        self.submit(&mut transfer)?;
        Ok(transfer)
    }

    /// All checks, then the state change. Nothing is written unless every
    /// check passes.
    fn apply(&mut self, req: &TransferRequest) -> Result<(), LedgerError> {
        let record = self
            .assets
            .get(&req.asset_id)
            .ok_or(LedgerError::UnknownAsset)?;
        if record.owner != req.sender_pk {
            return Err(LedgerError::NotOwner);
        }
        if record.sealed_key != req.old_sealed_key {
            return Err(LedgerError::StaleSealedKey);
        }
        let new_ephemeral = *req.new_sealed_key.ephemeral();
        if self
            .ephemerals
            .get(&req.asset_id)
            .is_some_and(|seen| seen.contains(&new_ephemeral))
        {
            return Err(Error::RandomnessReuse.into());
        }

        V::verify_transfer(req)?;

        if let Some(record) = self.assets.get_mut(&req.asset_id) {
            record.owner = req.receiver_pk;
            record.sealed_key = req.new_sealed_key;
        }
        self.ephemerals
            .entry(req.asset_id.clone())
            .or_default()
            .insert(new_ephemeral);
        Ok(())
    }
}
