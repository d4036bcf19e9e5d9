use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};

use reseal_primitives::{AssetId, Error};

use crate::{propose_transfer, seal, MasterKey, Randomness, SecretKey, TransferInput};

/// Fixed-key walkthrough of one asset's life: mint to owner 0, then a chain
/// of transfers 0 → 1 → 2. All fields are hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferVectors {
    pub asset_id: String,
    pub master_key: String,
    pub owners: Vec<OwnerVector>,
    pub minted_sealed_key: String,
    pub transfers: Vec<TransferVector>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerVector {
    pub secret_key: String,
    pub public_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferVector {
    pub randomness: String,
    pub sender_pk: String,
    pub receiver_pk: String,
    pub old_sealed_key: String,
    pub new_sealed_key: String,
    pub proof: String,
}

fn seed(tag: u8) -> [u8; 32] {
    let mut s = [0u8; 32];
    s[0] = tag;
    s
}

/// Build the deterministic vectors. Secrets 5, 9 and 13, master key from
/// seed `0x00..1f`, randomness seeds `[7, 0, ..]`, `[8, 0, ..]`, `[9, 0, ..]`.
pub fn transfer_vectors() -> Result<TransferVectors, Error> {
    let asset_id = AssetId::from("asset-A");
    let owners = [5u64, 9, 13]
        .into_iter()
        .map(|x| SecretKey::from_scalar(Scalar::from(x)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut master_seed = [0u8; 32];
    for (i, b) in master_seed.iter_mut().enumerate() {
        *b = i as u8;
    }
    let master = MasterKey::from_seed(master_seed);

    let mint_seed = seed(7);
    let minted = seal(&master, &owners[0].public(), &Randomness::from_seed(mint_seed))?;

    let mut current = minted;
    let mut transfers = Vec::new();
    for (i, pair) in owners.windows(2).enumerate() {
        let transfer_seed = seed(8 + i as u8);
        let transfer = propose_transfer(&TransferInput {
            asset_id: &asset_id,
            old_sealed_key: &current,
            sender_sk: &pair[0],
            receiver_pk: &pair[1].public(),
            randomness: &Randomness::from_seed(transfer_seed),
        })?;
        let req = transfer.into_request();
        transfers.push(TransferVector {
            randomness: hex::encode(transfer_seed),
            sender_pk: req.sender_pk.to_hex(),
            receiver_pk: req.receiver_pk.to_hex(),
            old_sealed_key: req.old_sealed_key.to_hex(),
            new_sealed_key: req.new_sealed_key.to_hex(),
            proof: req.proof.to_hex(),
        });
        current = req.new_sealed_key;
    }

    Ok(TransferVectors {
        asset_id: asset_id.to_hex(),
        master_key: hex::encode(master.as_bytes()),
        owners: owners
            .iter()
            .map(|sk| OwnerVector {
                secret_key: hex::encode(sk.scalar().as_bytes()),
                public_key: sk.public().to_hex(),
            })
            .collect(),
        minted_sealed_key: minted.to_hex(),
        transfers,
    })
}

/// The vectors as pretty-printed JSON.
pub fn some_valid_proofs() -> Result<String, Error> {
    let vectors = transfer_vectors()?;
    serde_json::to_string_pretty(&vectors).map_err(|_| Error::Malformed("vector encoding"))
}
