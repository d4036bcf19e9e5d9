use parity_scale_codec::{Decode, Encode};

use crate::{Error, TransferRequest};

/// Verifier boundary consumed by the ledger. Implemented by `reseal-verifier`.
pub trait TransferVerifier {
    /// Check `request.proof` against the public statement carried in `request`.
    ///
    /// Must be a pure function of the request: no secret keys, no storage.
    fn verify_transfer(request: &TransferRequest) -> Result<(), Error>;
}

/// Lifecycle of a single transfer attempt.
///
/// ```text
/// Proposed --submit--> Submitted --+--> Verified
///                                  +--> Rejected
/// ```
///
/// `Verified` and `Rejected` are terminal. A rejected transfer is never
/// retried; the sender starts a new one with fresh randomness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferState {
    Proposed,
    Submitted,
    Verified,
    Rejected,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferState::Verified | TransferState::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid transfer transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: TransferState,
    pub to: TransferState,
}

/// A transfer request together with where it is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    request: TransferRequest,
    state: TransferState,
}

impl Transfer {
    /// Wrap a freshly built request. Every transfer starts out `Proposed`.
    pub fn proposed(request: TransferRequest) -> Self {
        Transfer {
            request,
            state: TransferState::Proposed,
        }
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn into_request(self) -> TransferRequest {
        self.request
    }

    pub fn mark_submitted(&mut self) -> Result<(), InvalidTransition> {
        self.advance(TransferState::Proposed, TransferState::Submitted)
    }

    pub fn mark_verified(&mut self) -> Result<(), InvalidTransition> {
        self.advance(TransferState::Submitted, TransferState::Verified)
    }

    pub fn mark_rejected(&mut self) -> Result<(), InvalidTransition> {
        self.advance(TransferState::Submitted, TransferState::Rejected)
    }

    fn advance(&mut self, from: TransferState, to: TransferState) -> Result<(), InvalidTransition> {
        if self.state != from {
            return Err(InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
