/// Errors raised by sealing, opening, proving and verifying.
///
/// Variants only ever say *which* check failed. They never carry key
/// material or any other secret-dependent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Public key is not a valid, non-identity group element.
    #[error("invalid public key")]
    InvalidKey,
    /// Secret key does not match the key the sealed key was sealed under.
    #[error("secret key does not match")]
    InvalidSecretKey,
    /// Generic authentication failure while opening a sealed key.
    #[error("decryption failed")]
    DecryptionFailure,
    /// Proof or sealed key is not structurally valid (non-canonical scalar or point).
    #[error("malformed proof")]
    MalformedProof,
    /// Well-formed proof that does not satisfy the verification equations.
    #[error("invalid proof")]
    ProofInvalid,
    /// The same randomness was observed twice for one asset.
    #[error("randomness reused")]
    RandomnessReuse,
    /// The new sealed key was not produced from the given randomness and receiver.
    #[error("inconsistent reseal: {0}")]
    InconsistentReseal(&'static str),
    /// Byte-level decoding failure (wrong length, bad hex, bad point).
    #[error("malformed encoding: {0}")]
    Malformed(&'static str),
}
