use alloc::{string::String, vec::Vec};
use core::convert::TryFrom;

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar, traits::IsIdentity};
use parity_scale_codec::{Decode, Encode};

use crate::{
    decode_hex, point_from_bytes, point_to_bytes, scalar_from_bytes, Error, CIPHERTEXT_SIZE,
    KEY_CHECK_SIZE, POINT_SIZE, SCALAR_SIZE, SEALED_KEY_SIZE, TRANSFER_PROOF_SIZE,
};

/// Serialize fixed-size wire types as hex strings (JSON, TOML) rather than
/// byte arrays, and reject anything of the wrong length on the way back in.
#[cfg(feature = "std")]
macro_rules! impl_hex_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let hex = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_hex(&hex).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ========================= Asset identifier =========================

/// Opaque identifier of a confidential asset.
///
/// Only ever used for domain separation: it is absorbed into the transfer
/// transcript so a proof for one asset cannot be replayed against another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub struct AssetId(Vec<u8>);

impl AssetId {
    pub fn new(bytes: Vec<u8>) -> Self {
        AssetId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        hex::decode(hex)
            .map(AssetId)
            .map_err(|_| Error::Malformed("hex"))
    }
}

impl From<Vec<u8>> for AssetId {
    fn from(bytes: Vec<u8>) -> Self {
        AssetId(bytes)
    }
}

impl From<&[u8]> for AssetId {
    fn from(bytes: &[u8]) -> Self {
        AssetId(bytes.to_vec())
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        AssetId(id.as_bytes().to_vec())
    }
}

#[cfg(feature = "std")]
impl_hex_serde!(AssetId);

// ========================= Public key =========================

/// Compressed Ristretto255 public key, `x·G`.
///
/// Held as raw bytes so that values received off the wire can be carried
/// around unvalidated; [`PublicKey::decompress`] is the single gate that turns
/// them into a usable group element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub struct PublicKey([u8; POINT_SIZE]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; POINT_SIZE]) -> Self {
        PublicKey(bytes)
    }

    pub fn from_point(point: &RistrettoPoint) -> Self {
        PublicKey(point_to_bytes(point))
    }

    pub fn as_bytes(&self) -> &[u8; POINT_SIZE] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; POINT_SIZE] {
        self.0
    }

    /// Parse a public key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings. The encoding is
    /// not checked for group validity here.
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        decode_hex(hex).map(PublicKey)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode into a group element.
    ///
    /// # Errors
    /// * `Error::InvalidKey` - not a canonical Ristretto encoding, or the identity
    pub fn decompress(&self) -> Result<RistrettoPoint, Error> {
        let point = point_from_bytes(&self.0).map_err(|_| Error::InvalidKey)?;
        if point.is_identity() {
            return Err(Error::InvalidKey);
        }
        Ok(point)
    }
}

impl From<[u8; POINT_SIZE]> for PublicKey {
    fn from(bytes: [u8; POINT_SIZE]) -> Self {
        PublicKey(bytes)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = Error;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; POINT_SIZE]>::try_from(bytes)
            .map(PublicKey)
            .map_err(|_| Error::Malformed("public key length"))
    }
}

#[cfg(feature = "std")]
impl_hex_serde!(PublicKey);

// ========================= Sealed key =========================

/// A master key sealed under one public key.
///
/// `ephemeral` is `R = r·G` and `masked_key` is `D = M + r·PK`, an ElGamal
/// encryption of the master point `M`. `key_check` is a digest of `M` alone:
/// it lets the holder of the right secret key tell a correct opening from a
/// wrong one, and it stays the same across every transfer of an asset. A
/// sealed key is never mutated; a transfer replaces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, Decode)]
pub struct SealedKey {
    ephemeral: [u8; POINT_SIZE],
    masked_key: [u8; POINT_SIZE],
    key_check: [u8; KEY_CHECK_SIZE],
}

impl SealedKey {
    pub fn from_parts(
        ephemeral: [u8; POINT_SIZE],
        masked_key: [u8; POINT_SIZE],
        key_check: [u8; KEY_CHECK_SIZE],
    ) -> Self {
        SealedKey {
            ephemeral,
            masked_key,
            key_check,
        }
    }

    /// Build from the two ledger-facing fields, `ephemeral` and `ciphertext`.
    pub fn new(ephemeral: [u8; POINT_SIZE], ciphertext: &[u8; CIPHERTEXT_SIZE]) -> Self {
        let mut masked_key = [0u8; POINT_SIZE];
        let mut key_check = [0u8; KEY_CHECK_SIZE];
        masked_key.copy_from_slice(&ciphertext[..POINT_SIZE]);
        key_check.copy_from_slice(&ciphertext[POINT_SIZE..]);
        Self::from_parts(ephemeral, masked_key, key_check)
    }

    pub fn ephemeral(&self) -> &[u8; POINT_SIZE] {
        &self.ephemeral
    }

    pub fn masked_key(&self) -> &[u8; POINT_SIZE] {
        &self.masked_key
    }

    pub fn key_check(&self) -> &[u8; KEY_CHECK_SIZE] {
        &self.key_check
    }

    /// `masked_key || key_check`, the ledger's `ciphertext` field.
    pub fn ciphertext(&self) -> [u8; CIPHERTEXT_SIZE] {
        let mut out = [0u8; CIPHERTEXT_SIZE];
        out[..POINT_SIZE].copy_from_slice(&self.masked_key);
        out[POINT_SIZE..].copy_from_slice(&self.key_check);
        out
    }

    pub fn ephemeral_point(&self) -> Result<RistrettoPoint, Error> {
        point_from_bytes(&self.ephemeral)
    }

    pub fn masked_key_point(&self) -> Result<RistrettoPoint, Error> {
        point_from_bytes(&self.masked_key)
    }

    pub fn to_bytes(&self) -> [u8; SEALED_KEY_SIZE] {
        let mut out = [0u8; SEALED_KEY_SIZE];
        out[..POINT_SIZE].copy_from_slice(&self.ephemeral);
        out[POINT_SIZE..].copy_from_slice(&self.ciphertext());
        out
    }

    pub fn from_bytes(bytes: &[u8; SEALED_KEY_SIZE]) -> Self {
        let mut ephemeral = [0u8; POINT_SIZE];
        let mut ciphertext = [0u8; CIPHERTEXT_SIZE];
        ephemeral.copy_from_slice(&bytes[..POINT_SIZE]);
        ciphertext.copy_from_slice(&bytes[POINT_SIZE..]);
        Self::new(ephemeral, &ciphertext)
    }

    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        decode_hex::<SEALED_KEY_SIZE>(hex).map(|b| Self::from_bytes(&b))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl TryFrom<&[u8]> for SealedKey {
    type Error = Error;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; SEALED_KEY_SIZE]>::try_from(bytes)
            .map(|b| Self::from_bytes(&b))
            .map_err(|_| Error::Malformed("sealed key length"))
    }
}

#[cfg(feature = "std")]
impl_hex_serde!(SealedKey);

// ========================= Transfer proof =========================

/// Five-scalar Σ-proof transcript `(s1, s2, u1, u2, v)`.
///
/// - `s1`, `s2`: responses for the sender's secret key `x` and the new
///   ephemeral exponent `r` in `PK_A = x·G` and `R1 = r·G`
/// - `u1`, `u2`: responses for the same two witnesses in the master-key
///   equation `D0 − D1 = x·R0 − r·PK_B`, tied to `s1`, `s2` by the linking
///   announcements
/// - `v`: the Fiat–Shamir challenge binding the whole statement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, Decode)]
pub struct TransferProof {
    pub s1: [u8; SCALAR_SIZE],
    pub s2: [u8; SCALAR_SIZE],
    pub u1: [u8; SCALAR_SIZE],
    pub u2: [u8; SCALAR_SIZE],
    pub v: [u8; SCALAR_SIZE],
}

impl TransferProof {
    pub fn from_scalars(s1: &Scalar, s2: &Scalar, u1: &Scalar, u2: &Scalar, v: &Scalar) -> Self {
        TransferProof {
            s1: s1.to_bytes(),
            s2: s2.to_bytes(),
            u1: u1.to_bytes(),
            u2: u2.to_bytes(),
            v: v.to_bytes(),
        }
    }

    /// Decode all five scalars, in wire order.
    ///
    /// # Errors
    /// * `Error::MalformedProof` - any scalar is not reduced mod the group order
    pub fn scalars(&self) -> Result<[Scalar; 5], Error> {
        let mut out = [Scalar::ZERO; 5];
        for (slot, bytes) in out
            .iter_mut()
            .zip([&self.s1, &self.s2, &self.u1, &self.u2, &self.v])
        {
            *slot = scalar_from_bytes(bytes).ok_or(Error::MalformedProof)?;
        }
        Ok(out)
    }

    pub fn to_bytes(&self) -> [u8; TRANSFER_PROOF_SIZE] {
        let mut out = [0u8; TRANSFER_PROOF_SIZE];
        for (chunk, field) in out
            .chunks_exact_mut(SCALAR_SIZE)
            .zip([&self.s1, &self.s2, &self.u1, &self.u2, &self.v])
        {
            chunk.copy_from_slice(field);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8; TRANSFER_PROOF_SIZE]) -> Self {
        let mut fields = [[0u8; SCALAR_SIZE]; 5];
        for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(SCALAR_SIZE)) {
            field.copy_from_slice(chunk);
        }
        let [s1, s2, u1, u2, v] = fields;
        TransferProof { s1, s2, u1, u2, v }
    }

    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        decode_hex::<TRANSFER_PROOF_SIZE>(hex).map(|b| Self::from_bytes(&b))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl TryFrom<&[u8]> for TransferProof {
    type Error = Error;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; TRANSFER_PROOF_SIZE]>::try_from(bytes)
            .map(|b| Self::from_bytes(&b))
            .map_err(|_| Error::Malformed("transfer proof length"))
    }
}

#[cfg(feature = "std")]
impl_hex_serde!(TransferProof);

// ========================= Ledger submission =========================

/// Everything the ledger needs to accept a transfer: the public statement
/// plus the proof. Contains no secret material.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferRequest {
    pub asset_id: AssetId,
    pub sender_pk: PublicKey,
    pub receiver_pk: PublicKey,
    pub old_sealed_key: SealedKey,
    pub new_sealed_key: SealedKey,
    pub proof: TransferProof,
}
