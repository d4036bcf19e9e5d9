//! Sealed-key codec: ElGamal encryption of the master point `M` under a
//! Ristretto public key.
//!
//! ```text
//! R = r·G                      ephemeral
//! D = M + r·PK                 masked key
//! K = Blake2s256(check || M)   key check
//! ```
//!
//! The sealed key is `R || D || K`. Every byte of it is either covered by the
//! transfer proof (`R`, `D`) or copied unchanged from the previous sealed key
//! (`K`), so whatever the ledger accepts, the receiver can open. `open`
//! reports every failure as the same [`Error::DecryptionFailure`].

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G, ristretto::RistrettoPoint, scalar::Scalar,
};
use subtle::ConstantTimeEq;

use reseal_primitives::{point_to_bytes, Error, PublicKey, SealedKey};

use crate::keys::{MasterKey, Randomness, SecretKey};

/// Seal `master` for `recipient_point`, using `r` as the ephemeral exponent.
pub(crate) fn seal_with_ephemeral(
    master: &MasterKey,
    recipient_point: &RistrettoPoint,
    r: &Scalar,
) -> SealedKey {
    let ephemeral = point_to_bytes(&(r * G));
    let masked_key = point_to_bytes(&(master.point() + r * recipient_point));
    SealedKey::from_parts(ephemeral, masked_key, master.key_check())
}

/// Seal a master key under `recipient`.
///
/// # Arguments
/// * `master` - the key to seal
/// * `recipient` - public key of the new holder
/// * `randomness` - single-use seed; its first draw becomes the ephemeral exponent
///
/// # Errors
/// * `Error::InvalidKey` - `recipient` is not a valid, non-identity point
pub fn seal(
    master: &MasterKey,
    recipient: &PublicKey,
    randomness: &Randomness,
) -> Result<SealedKey, Error> {
    let recipient_point = recipient.decompress()?;
    let mut r = randomness.ephemeral_scalar();
    let sealed = seal_with_ephemeral(master, &recipient_point, &r);
    zeroize::Zeroize::zeroize(&mut r);
    Ok(sealed)
}

/// Recover the master key from a sealed key with the recipient's secret.
///
/// # Errors
/// * `Error::DecryptionFailure` - for *any* reason: undecodable points, wrong
///   key, or a recovered `M` that does not match the key check. Callers cannot
///   tell these apart.
pub fn open(sealed: &SealedKey, recipient: &SecretKey) -> Result<MasterKey, Error> {
    let ephemeral = sealed
        .ephemeral_point()
        .map_err(|_| Error::DecryptionFailure)?;
    let masked_key = sealed
        .masked_key_point()
        .map_err(|_| Error::DecryptionFailure)?;

    let master = MasterKey::from_point(masked_key - recipient.scalar() * ephemeral);
    if !bool::from(master.key_check().ct_eq(sealed.key_check())) {
        return Err(Error::DecryptionFailure);
    }
    Ok(master)
}

/// Re-seal the master key behind `sealed` for a new recipient.
///
/// The master key exists in memory only between the inner `open` and `seal`
/// and is wiped when this returns.
///
/// # Errors
/// * `Error::InvalidKey` - `receiver` is not a valid public key
/// * `Error::DecryptionFailure` - `sender` cannot open `sealed`
pub fn reseal(
    sealed: &SealedKey,
    sender: &SecretKey,
    receiver: &PublicKey,
    randomness: &Randomness,
) -> Result<SealedKey, Error> {
    receiver.decompress()?;
    let master = open(sealed, sender)?;
    seal(&master, receiver, randomness)
}
