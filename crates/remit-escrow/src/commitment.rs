//! Commitment hashing.
//!
//! `commitment = SHA-256(domain || contract || beneficiary || secret)`
//!
//! The contract address is part of the preimage, so a commitment computed
//! for one deployed instance can never unlock an order on another. Every
//! field before the secret is fixed-width, which keeps the encoding
//! unambiguous without length prefixes.

use remit_types::{Address, Commitment, RemitError, Result, constants::COMMITMENT_DOMAIN};
use sha2::{Digest, Sha256};

/// Derive the commitment for `beneficiary` and `secret` on `contract`.
///
/// # Errors
/// - `InvalidBeneficiary` if `beneficiary` is the zero address
/// - `InvalidSecret` if `secret` is empty
pub fn commit(contract: Address, beneficiary: Address, secret: &[u8]) -> Result<Commitment> {
    if beneficiary.is_zero() {
        return Err(RemitError::InvalidBeneficiary);
    }
    if secret.is_empty() {
        return Err(RemitError::InvalidSecret);
    }

    let mut hasher = Sha256::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update(contract.as_bytes());
    hasher.update(beneficiary.as_bytes());
    hasher.update(secret);
    Ok(Commitment(hasher.finalize().into()))
}
