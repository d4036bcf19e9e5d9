use serde::{Deserialize, Serialize};

use reseal_primitives::{AssetId, PublicKey, SealedKey};

/// A confidential asset as the ledger stores it.
///
/// The image is public; the payload behind `ciphertext_url` is encrypted
/// under the master key, which only the holder of `owner`'s secret can
/// recover from `sealed_key`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: AssetId,
    pub name: String,
    pub image_url: String,
    pub ciphertext_url: String,
    pub owner: PublicKey,
    pub sealed_key: SealedKey,
}
