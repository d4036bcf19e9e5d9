//! # reseal-primitives — shared wire types and transcript for sealed-key transfers
//!
//! A confidential asset carries a secret group element `M`, ElGamal-sealed
//! under its owner's Ristretto255 public key; the 32-byte symmetric master key
//! is derived from `M`. Transferring the asset re-seals the *same* `M` under
//! the receiver's key and attaches a Σ-proof that both sealed keys enclose
//! one value. This crate holds everything the prover and the verifier must
//! agree on byte-for-byte:
//!
//! - wire types: [`PublicKey`], [`SealedKey`], [`TransferProof`], [`AssetId`],
//!   and the ledger submission shape [`TransferRequest`]
//! - the Fiat–Shamir transcript ([`new_transcript`], [`append_announcements`],
//!   [`challenge_scalar`])
//! - the shared [`Error`] kinds and the per-transfer state machine
//!
//! ## Byte Layouts
//!
//! **Sealed key (96 bytes):**
//! ```text
//! ephemeral R(32) || masked key D(32) || key check K(32)
//!
//! R = r·G    D = M + r·PK    K = blake2s(check label || M)
//! ```
//!
//! `K` depends on `M` alone, so it is carried unchanged through every
//! transfer of an asset.
//!
//! **Transfer proof (160 bytes):**
//! ```text
//! s1(32) || s2(32) || u1(32) || u2(32) || v(32)
//! ```
//!
//! All points are compressed Ristretto encodings and all scalars are canonical
//! little-endian encodings. Non-canonical values are rejected, never reduced.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;
mod transfer;
mod types;


pub use error::Error;
pub use transfer::{InvalidTransition, Transfer, TransferState, TransferVerifier};
pub use types::{AssetId, PublicKey, SealedKey, TransferProof, TransferRequest};

use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use merlin::Transcript;

/// Size of a compressed Ristretto point in bytes
pub const POINT_SIZE: usize = 32;
/// Size of a canonical scalar encoding in bytes
pub const SCALAR_SIZE: usize = 32;
/// Size of the symmetric master key in bytes
pub const MASTER_KEY_SIZE: usize = 32;
/// Size of the ChaCha20-Poly1305 authentication tag in bytes
pub const AEAD_TAG_SIZE: usize = 16;
/// Size of the key-check digest carried in every sealed key
pub const KEY_CHECK_SIZE: usize = 32;
/// Size of [`SealedKey::ciphertext`]: masked key point || key check
pub const CIPHERTEXT_SIZE: usize = POINT_SIZE + KEY_CHECK_SIZE;
/// Size of a serialized [`SealedKey`]
pub const SEALED_KEY_SIZE: usize = POINT_SIZE + CIPHERTEXT_SIZE;
/// Size of a serialized [`TransferProof`] (five scalars)
pub const TRANSFER_PROOF_SIZE: usize = 5 * SCALAR_SIZE;

/// Transcript and derivation labels. Changing any of these breaks every
/// previously issued proof.
pub mod labels {
    pub const PROTOCOL: &[u8] = b"reseal/transfer";
    pub const PROTOCOL_V: &[u8] = b"v1";

    pub const SENDER_PK: &[u8] = b"sender_pk";
    pub const RECEIVER_PK: &[u8] = b"receiver_pk";
    pub const OLD_SEALED_KEY: &[u8] = b"old_sealed_key";
    pub const NEW_SEALED_KEY: &[u8] = b"new_sealed_key";
    pub const ASSET_ID: &[u8] = b"asset_id";

    pub const ANNOUNCEMENTS: [&[u8]; 5] = [b"a1", b"a2", b"a3", b"a4", b"a5"];
    pub const CHAL: &[u8] = b"chal";

    /// Expands a 32-byte seed into the master point `M`.
    pub const MASTER_KEY_SEED: &[u8] = b"reseal/master-key/seed";
    /// KDF domain for the symmetric master key derived from `M`.
    pub const MASTER_KEY_KDF: &[u8] = b"reseal/master-key/kdf";
    /// Domain of the key check `K` stored next to every masked key.
    pub const KEY_CHECK: &[u8] = b"reseal/master-key/check";
}

/// Public statement of a transfer, in the exact order it is absorbed into
/// the transcript.
pub struct TransferContext<'a> {
    pub sender_pk: &'a PublicKey,
    pub receiver_pk: &'a PublicKey,
    pub old_sealed_key: &'a SealedKey,
    pub new_sealed_key: &'a SealedKey,
    pub asset_id: &'a AssetId,
}

impl<'a> TransferContext<'a> {
    pub fn from_request(req: &'a TransferRequest) -> Self {
        TransferContext {
            sender_pk: &req.sender_pk,
            receiver_pk: &req.receiver_pk,
            old_sealed_key: &req.old_sealed_key,
            new_sealed_key: &req.new_sealed_key,
            asset_id: &req.asset_id,
        }
    }
}

/// Start the Fiat–Shamir transcript for a transfer. Prover and verifier must
/// both go through here so the challenge is derived from identical bytes.
pub fn new_transcript(ctx: &TransferContext<'_>) -> Transcript {
    let mut t = Transcript::new(labels::PROTOCOL);
    t.append_message(b"proto", labels::PROTOCOL_V);
    t.append_message(labels::SENDER_PK, ctx.sender_pk.as_bytes());
    t.append_message(labels::RECEIVER_PK, ctx.receiver_pk.as_bytes());
    t.append_message(labels::OLD_SEALED_KEY, &ctx.old_sealed_key.to_bytes());
    t.append_message(labels::NEW_SEALED_KEY, &ctx.new_sealed_key.to_bytes());
    t.append_message(labels::ASSET_ID, ctx.asset_id.as_bytes());
    t
}

pub fn append_point(t: &mut Transcript, label: &'static [u8], p: &RistrettoPoint) {
    t.append_message(label, p.compress().as_bytes());
}

/// Absorb the five Σ-announcements `A1..A5` in order.
pub fn append_announcements(t: &mut Transcript, announcements: &[RistrettoPoint; 5]) {
    for (label, a) in labels::ANNOUNCEMENTS.iter().zip(announcements.iter()) {
        append_point(t, *label, a);
    }
}

/// Squeeze a uniformly distributed challenge scalar (64 bytes, wide reduction).
pub fn challenge_scalar(t: &mut Transcript, label: &'static [u8]) -> Scalar {
    let mut buf = [0u8; 64];
    t.challenge_bytes(label, &mut buf);
    Scalar::from_bytes_mod_order_wide(&buf)
}

pub fn point_to_bytes(p: &RistrettoPoint) -> [u8; POINT_SIZE] {
    p.compress().to_bytes()
}

/// Decode a compressed Ristretto point. Ristretto decoding only accepts the
/// canonical encoding, so malleated encodings never reach the group law.
pub fn point_from_bytes(bytes: &[u8; POINT_SIZE]) -> Result<RistrettoPoint, Error> {
    CompressedRistretto(*bytes)
        .decompress()
        .ok_or(Error::Malformed("ristretto point"))
}

/// Decode a scalar, rejecting anything not already reduced mod ℓ.
pub fn scalar_from_bytes(bytes: &[u8; SCALAR_SIZE]) -> Option<Scalar> {
    Scalar::from_canonical_bytes(*bytes).into()
}

/// Parse an optionally `0x`-prefixed hex string into a fixed-size buffer.
pub(crate) fn decode_hex<const N: usize>(hex: &str) -> Result<[u8; N], Error> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut buf = [0u8; N];
    hex::decode_to_slice(hex, &mut buf).map_err(|_| Error::Malformed("hex"))?;
    Ok(buf)
}
