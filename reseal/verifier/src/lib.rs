//! # reseal-verifier — Transfer Proof Verification
//!
//! Checks that two sealed keys encapsulate the same master key, given only
//! public data: both public keys, both sealed keys, the asset id and the
//! 160-byte proof `(s1, s2, u1, u2, v)`. `no_std` so it can run inside a
//! runtime or an auditor's light client.
//!
//! ## Statement
//!
//! ```text
//! PK_A = x·G     R1 = r·G     D0 − D1 = x·R0 − r·PK_B     K1 = K0
//! ```
//!
//! With `D0 = M + x·R0` this says `D1 = M + r·PK_B`: the receiver recovers the
//! same `M` as the sender, and the copied key check `K` matches it.
//!
//! ## Verification Equations
//!
//! ```text
//! A1' = s1·G − v·PK_A              A2' = s2·G − v·R1
//! A3' = u1·R0 − u2·PK_B − v·(D0 − D1)
//! A4' = (u1 − s1)·G                A5' = (u2 − s2)·G
//! accept  ⇔  K1 == K0  and  v == H_transcript(statement, A1', .., A5')
//! ```
//!
//! ## Error Order
//!
//! 1. Public keys (`InvalidKey`)
//! 2. Proof scalars and sealed-key points (`MalformedProof`)
//! 3. Key check and algebra (`ProofInvalid`)

#![cfg_attr(not(feature = "std"), no_std)]


use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G, ristretto::RistrettoPoint, scalar::Scalar,
    traits::VartimeMultiscalarMul,
};
use subtle::ConstantTimeEq;

use reseal_primitives::{
    append_announcements, challenge_scalar, labels, new_transcript,
    AssetId, Error, PublicKey, SealedKey, TransferContext, TransferProof, TransferRequest,
    TransferVerifier,
};

/// Verify a transfer proof.
///
/// # Arguments
/// * `old_sealed_key` - the asset's current sealed key, under `sender_pk`
/// * `new_sealed_key` - the proposed sealed key, under `receiver_pk`
/// * `sender_pk`, `receiver_pk` - the two parties
/// * `asset_id` - the asset; proofs do not carry over between assets
/// * `proof` - `(s1, s2, u1, u2, v)`
///
/// # Errors
/// * `Error::InvalidKey` - either public key is undecodable or the identity
/// * `Error::MalformedProof` - a non-canonical scalar, or an undecodable point
///   inside either sealed key
/// * `Error::ProofInvalid` - the proof does not verify
pub fn verify(
    old_sealed_key: &SealedKey,
    new_sealed_key: &SealedKey,
    sender_pk: &PublicKey,
    receiver_pk: &PublicKey,
    asset_id: &AssetId,
    proof: &TransferProof,
) -> Result<(), Error> {
    let pk_a = sender_pk.decompress()?;
    let pk_b = receiver_pk.decompress()?;

    let [s1, s2, u1, u2, v] = proof.scalars()?;

    let r0 = old_sealed_key
        .ephemeral_point()
        .map_err(|_| Error::MalformedProof)?;
    let d0 = old_sealed_key
        .masked_key_point()
        .map_err(|_| Error::MalformedProof)?;
    let r1 = new_sealed_key
        .ephemeral_point()
        .map_err(|_| Error::MalformedProof)?;
    let d1 = new_sealed_key
        .masked_key_point()
        .map_err(|_| Error::MalformedProof)?;

    // K is a function of M alone, so a transfer copies it unchanged.
    if old_sealed_key.key_check() != new_sealed_key.key_check() {
        return Err(Error::ProofInvalid);
    }

    let neg_v = -v;

    let a1 = RistrettoPoint::vartime_multiscalar_mul([s1, neg_v], [G, pk_a]);
    let a2 = RistrettoPoint::vartime_multiscalar_mul([s2, neg_v], [G, r1]);
    let a3 = RistrettoPoint::vartime_multiscalar_mul([u1, -u2, neg_v, v], [r0, pk_b, d0, d1]);
    let a4 = RistrettoPoint::mul_base(&(u1 - s1));
    let a5 = RistrettoPoint::mul_base(&(u2 - s2));

    let mut t = new_transcript(&TransferContext {
        sender_pk,
        receiver_pk,
        old_sealed_key,
        new_sealed_key,
        asset_id,
    });
    append_announcements(&mut t, &[a1, a2, a3, a4, a5]);
    let c: Scalar = challenge_scalar(&mut t, labels::CHAL);

    if bool::from(c.as_bytes().ct_eq(v.as_bytes())) {
        Ok(())
    } else {
        Err(Error::ProofInvalid)
    }
}

/// [`verify`] collapsed to a yes/no answer.
pub fn is_valid(
    old_sealed_key: &SealedKey,
    new_sealed_key: &SealedKey,
    sender_pk: &PublicKey,
    receiver_pk: &PublicKey,
    asset_id: &AssetId,
    proof: &TransferProof,
) -> bool {
    verify(old_sealed_key, new_sealed_key, sender_pk, receiver_pk, asset_id, proof).is_ok()
}

/// Verifier backend for ledgers, plugged in through [`TransferVerifier`].
pub struct ResealVerifier;

impl TransferVerifier for ResealVerifier {
    fn verify_transfer(request: &TransferRequest) -> Result<(), Error> {
        verify(
            &request.old_sealed_key,
            &request.new_sealed_key,
            &request.sender_pk,
            &request.receiver_pk,
            &request.asset_id,
            &request.proof,
        )
    }
}
