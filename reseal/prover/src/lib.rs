//! # reseal-prover — Holder-Side Sealing and Transfer Proofs
//!
//! This crate runs on the asset holder's side. It seals an asset's master key
//! to a public key, reseals it to the next owner, and proves that the reseal
//! was honest without revealing the key.
//!
//! ## Transfer Flow
//!
//! **Step 1 - Reseal:**
//! - [`reseal`] opens the current sealed key with the sender's secret and
//!   seals the same master key to the receiver
//!
//! **Step 2 - Prove:**
//! - [`prove`] produces the five proof scalars `(s1, s2, u1, u2, v)` binding
//!   the old and new sealed keys to one master key
//!
//! [`propose_transfer`] runs both steps and hands back a
//! [`Transfer`] in the `Proposed` state, ready for the ledger.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reseal_prover::{propose_transfer, seal, MasterKey, Randomness, SecretKey, TransferInput};
//! use rand_core::OsRng;
//!
//! let alice = SecretKey::generate(&mut OsRng);
//! let bob = SecretKey::generate(&mut OsRng);
//!
//! // Mint: seal a fresh master key to Alice
//! let master = MasterKey::generate(&mut OsRng);
//! let sealed0 = seal(&master, &alice.public(), &Randomness::generate(&mut OsRng))?;
//!
//! // Alice hands the asset to Bob
//! let transfer = propose_transfer(&TransferInput {
//!     asset_id: &"asset-A".into(),
//!     old_sealed_key: &sealed0,
//!     sender_sk: &alice,
//!     receiver_pk: &bob.public(),
//!     randomness: &Randomness::generate(&mut OsRng),
//! })?;
//!
//! // Submit transfer.request() to the ledger
//! ```
//!
//! ## Proof Byte Layout
//!
//! ```text
//! s1(32) || s2(32) || u1(32) || u2(32) || v(32)
//! ```
//!
//! ## Security Notes
//!
//! - Secret keys, master keys and randomness are wiped on drop
//! - A [`Randomness`] seed must be used for exactly one transfer
//! - Σ-nonces are derived from the transcript RNG, rekeyed with every witness
//! - Only public data is ever logged

mod codec;
mod keys;

pub mod bench_vectors;
pub mod payload;
#[cfg(test)]
mod tests;

use curve25519_dalek::{constants::RISTRETTO_BASEPOINT_POINT as G, scalar::Scalar};
use rand_core::RngCore;
use zeroize::Zeroize;

use reseal_primitives::{
    append_announcements, challenge_scalar, labels, new_transcript,
    AssetId, Error, PublicKey, SealedKey, Transfer, TransferContext, TransferProof,
    TransferRequest,
};

pub use codec::{open, reseal, seal};
pub use keys::{MasterKey, Randomness, SecretKey, RANDOMNESS_SIZE};

const LOG_TARGET: &str = "reseal::prover";

/// Generate a random scalar with full 256-bit entropy.
///
/// Draws 512 bits and reduces mod ℓ, so the result is statistically uniform.
fn random_scalar<R: RngCore>(rng: &mut R) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    let s = Scalar::from_bytes_mod_order_wide(&bytes);
    bytes.zeroize();
    s
}

// ========================= Transfer proof =========================

/// Prove that `old_sealed_key` and `new_sealed_key` seal the same master key.
///
/// `randomness` must be the seed that produced `new_sealed_key` (via
/// [`reseal`]); its first draw is the new ephemeral exponent `r`, and the
/// rest of its stream seeds the Σ-nonces.
///
/// # Arguments
/// * `old_sealed_key` - current sealed key, under the sender's public key
/// * `new_sealed_key` - reseal of the same master key under `receiver_pk`
/// * `sender_sk` - the sender's secret key
/// * `receiver_pk` - the receiver's public key
/// * `asset_id` - asset being transferred; the proof is bound to it
/// * `randomness` - the seed passed to the matching `reseal`
///
/// # Returns
/// The proof `(s1, s2, u1, u2, v)`.
///
/// # Errors
/// * `Error::InvalidKey` - `receiver_pk` is not a valid public key
/// * `Error::InvalidSecretKey` - `sender_sk` cannot open `old_sealed_key`
/// * `Error::InconsistentReseal` - `new_sealed_key` was not produced from
///   this master key, receiver and randomness
pub fn prove(
    old_sealed_key: &SealedKey,
    new_sealed_key: &SealedKey,
    sender_sk: &SecretKey,
    receiver_pk: &PublicKey,
    asset_id: &AssetId,
    randomness: &Randomness,
) -> Result<TransferProof, Error> {
    let receiver_point = receiver_pk.decompress()?;
    let master = open(old_sealed_key, sender_sk).map_err(|_| Error::InvalidSecretKey)?;
    let old_ephemeral = old_sealed_key
        .ephemeral_point()
        .map_err(|_| Error::InvalidSecretKey)?;

    // r is the first draw; the nonces continue the same stream.
    let mut stream = randomness.stream();
    let mut r = random_scalar(&mut stream);

    let expected = codec::seal_with_ephemeral(&master, &receiver_point, &r);
    let consistency = if expected.ephemeral() != new_sealed_key.ephemeral() {
        Err(Error::InconsistentReseal("ephemeral"))
    } else if expected.masked_key() != new_sealed_key.masked_key() {
        Err(Error::InconsistentReseal("masked key"))
    } else if expected.key_check() != new_sealed_key.key_check() {
        Err(Error::InconsistentReseal("key check"))
    } else {
        Ok(())
    };
    if let Err(e) = consistency {
        r.zeroize();
        return Err(e);
    }

    let sender_pk = sender_sk.public();
    let mut t = new_transcript(&TransferContext {
        sender_pk: &sender_pk,
        receiver_pk,
        old_sealed_key,
        new_sealed_key,
        asset_id,
    });

    let x = sender_sk.scalar();

    let mut nonce_rng = t
        .build_rng()
        .rekey_with_witness_bytes(b"x", x.as_bytes())
        .rekey_with_witness_bytes(b"r", r.as_bytes())
        .rekey_with_witness_bytes(b"m", master.as_bytes())
        .finalize(&mut stream);
    let mut kx = random_scalar(&mut nonce_rng);
    let mut kr = random_scalar(&mut nonce_rng);
    let mut ku = random_scalar(&mut nonce_rng);
    let mut kw = random_scalar(&mut nonce_rng);

    // A1, A2: the two keys. A3: D0 − D1 = x·R0 − r·PK_B.
    // A4, A5: the A3 witnesses are the A1, A2 witnesses.
    let a1 = kx * G;
    let a2 = kr * G;
    let a3 = ku * old_ephemeral - kw * receiver_point;
    let a4 = (ku - kx) * G;
    let a5 = (kw - kr) * G;

    append_announcements(&mut t, &[a1, a2, a3, a4, a5]);
    let c = challenge_scalar(&mut t, labels::CHAL);

    let s1 = kx + c * x;
    let s2 = kr + c * r;
    let u1 = ku + c * x;
    let u2 = kw + c * r;

    for secret in [&mut r, &mut kx, &mut kr, &mut ku, &mut kw] {
        secret.zeroize();
    }

    log::debug!(
        target: LOG_TARGET,
        "transfer proof: asset={} sender={} receiver={}",
        asset_id.to_hex(),
        sender_pk.to_hex(),
        receiver_pk.to_hex(),
    );

    Ok(TransferProof::from_scalars(&s1, &s2, &u1, &u2, &c))
}

// ========================= Proposal =========================

/// Everything the sender holds when starting a transfer.
pub struct TransferInput<'a> {
    pub asset_id: &'a AssetId,
    /// The asset's current sealed key, as the ledger holds it.
    pub old_sealed_key: &'a SealedKey,
    pub sender_sk: &'a SecretKey,
    pub receiver_pk: &'a PublicKey,
    /// Fresh, single-use seed for this transfer.
    pub randomness: &'a Randomness,
}

/// Reseal and prove in one go.
///
/// # Returns
/// A [`Transfer`] in the `Proposed` state carrying the full ledger request.
///
/// # Errors
/// * `Error::InvalidKey` - `receiver_pk` is not a valid public key
/// * `Error::InvalidSecretKey` - `sender_sk` cannot open the current sealed key
pub fn propose_transfer(input: &TransferInput<'_>) -> Result<Transfer, Error> {
    let new_sealed_key = reseal(
        input.old_sealed_key,
        input.sender_sk,
        input.receiver_pk,
        input.randomness,
    )
    .map_err(|e| match e {
        Error::DecryptionFailure => Error::InvalidSecretKey,
        other => other,
    })?;

    let proof = prove(
        input.old_sealed_key,
        &new_sealed_key,
        input.sender_sk,
        input.receiver_pk,
        input.asset_id,
        input.randomness,
    )?;

    Ok(Transfer::proposed(TransferRequest {
        asset_id: input.asset_id.clone(),
        sender_pk: input.sender_sk.public(),
        receiver_pk: *input.receiver_pk,
        old_sealed_key: *input.old_sealed_key,
        new_sealed_key,
        proof,
    }))
}
