use core::fmt;

use blake2::{Blake2b512, Blake2s256, Digest};
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G, ristretto::RistrettoPoint, scalar::Scalar,
};
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use reseal_primitives::{labels, Error, PublicKey, KEY_CHECK_SIZE, MASTER_KEY_SIZE, SCALAR_SIZE};

use crate::random_scalar;

/// Size of a [`Randomness`] seed in bytes
pub const RANDOMNESS_SIZE: usize = 32;

// ========================= Secret key =========================

/// Ristretto255 secret scalar `x`, the owner's half of `PublicKey = x·G`.
///
/// Never serialized by this crate and wiped on drop. Key custody (wallets,
/// keystores) lives outside; they hand the scalar in via [`SecretKey::from_bytes`].
pub struct SecretKey(Scalar);

impl SecretKey {
    /// Generate a new secret key from a cryptographically secure RNG
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let x = random_scalar(rng);
            if x != Scalar::ZERO {
                return SecretKey(x);
            }
        }
    }

    /// Import a canonical, non-zero scalar encoding.
    ///
    /// # Errors
    /// * `Error::InvalidSecretKey` - non-canonical or zero scalar
    pub fn from_bytes(bytes: &[u8; SCALAR_SIZE]) -> Result<Self, Error> {
        let x: Option<Scalar> = Scalar::from_canonical_bytes(*bytes).into();
        x.ok_or(Error::InvalidSecretKey).and_then(Self::from_scalar)
    }

    pub fn from_scalar(x: Scalar) -> Result<Self, Error> {
        if x == Scalar::ZERO {
            return Err(Error::InvalidSecretKey);
        }
        Ok(SecretKey(x))
    }

    pub fn public(&self) -> PublicKey {
        PublicKey::from_point(&self.public_point())
    }

    pub(crate) fn public_point(&self) -> RistrettoPoint {
        self.0 * G
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&"..").finish()
    }
}

// ========================= Master key =========================

/// The asset's secret: a uniformly random group element `M`.
///
/// The 256-bit symmetric key that encrypts the payload is derived from it
/// ([`MasterKey::as_bytes`]). Sealed keys carry `M` itself, so a transfer can
/// prove in the group that the receiver gets the same value the sender holds.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    point: RistrettoPoint,
    key: [u8; MASTER_KEY_SIZE],
}

impl MasterKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut wide = Zeroizing::new([0u8; 64]);
        rng.fill_bytes(&mut wide[..]);
        Self::from_point(RistrettoPoint::from_uniform_bytes(&wide))
    }

    /// Deterministic key from a 32-byte seed, for tests and reproducible vectors.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let mut wide = Zeroizing::new([0u8; 64]);
        wide.copy_from_slice(
            &Blake2b512::new()
                .chain_update(labels::MASTER_KEY_SEED)
                .chain_update(seed)
                .finalize(),
        );
        Self::from_point(RistrettoPoint::from_uniform_bytes(&wide))
    }

    pub(crate) fn from_point(point: RistrettoPoint) -> Self {
        let mut key = [0u8; MASTER_KEY_SIZE];
        key.copy_from_slice(&digest_point(labels::MASTER_KEY_KDF, &point)[..]);
        MasterKey { point, key }
    }

    /// The symmetric key.
    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_SIZE] {
        &self.key
    }

    pub(crate) fn point(&self) -> &RistrettoPoint {
        &self.point
    }

    /// `K`, the digest every sealed key of this master key carries.
    pub(crate) fn key_check(&self) -> [u8; KEY_CHECK_SIZE] {
        let mut check = [0u8; KEY_CHECK_SIZE];
        check.copy_from_slice(&digest_point(labels::KEY_CHECK, &self.point)[..]);
        check
    }
}

fn digest_point(label: &[u8], point: &RistrettoPoint) -> Zeroizing<[u8; 32]> {
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(
        &Blake2s256::new()
            .chain_update(label)
            .chain_update(point.compress().as_bytes())
            .finalize(),
    );
    out
}

impl PartialEq for MasterKey {
    fn eq(&self, other: &Self) -> bool {
        self.key.ct_eq(&other.key).into()
    }
}

impl Eq for MasterKey {}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MasterKey").field(&"..").finish()
    }
}

// ========================= Randomness =========================

/// Caller-supplied seed for one `seal`/`reseal` and its matching `prove`.
///
/// The first 512-bit draw of `ChaCha20(seed)` is the ephemeral exponent;
/// `prove` re-derives it from the same seed and then continues the stream
/// for its Σ-nonces. Determinism is the point: identical inputs give
/// byte-identical outputs.
///
/// **Single use.** Reusing a seed for two different transfers reuses the
/// ephemeral exponent, which leaks the relation between the two sealed keys.
/// The core cannot see across calls, so this is the caller's obligation: draw
/// each seed once from a CSPRNG ([`Randomness::generate`]).
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Randomness([u8; RANDOMNESS_SIZE]);

impl Randomness {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = [0u8; RANDOMNESS_SIZE];
        rng.fill_bytes(&mut seed);
        Randomness(seed)
    }

    /// Fixed seed, for tests and reproducible vectors.
    pub fn from_seed(seed: [u8; RANDOMNESS_SIZE]) -> Self {
        Randomness(seed)
    }

    pub(crate) fn stream(&self) -> ChaCha20Rng {
        ChaCha20Rng::from_seed(self.0)
    }

    /// The ephemeral exponent `r`, the first draw of the stream.
    pub(crate) fn ephemeral_scalar(&self) -> Scalar {
        random_scalar(&mut self.stream())
    }
}

impl fmt::Debug for Randomness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Randomness").field(&"..").finish()
    }
}
