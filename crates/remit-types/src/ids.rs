//! Identifiers used throughout Remit.
//!
//! `Address` identifies an account (sender, exchange, administrator, or the
//! contract instance itself). `Commitment` is the 32-byte hash that keys an
//! order in the ledger.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ADDRESS_LEN, COMMITMENT_LEN};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address. The all-zero address is never a valid party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// First four bytes as hex, for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Random addresses for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// A random non-zero address.
    #[must_use]
    pub fn random() -> Self {
        loop {
            let candidate = Self(rand::random());
            if !candidate.is_zero() {
                return candidate;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// A 32-byte hash binding (contract, beneficiary, secret).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Commitment(pub [u8; COMMITMENT_LEN]);

impl Commitment {
    #[must_use]
    pub fn from_bytes(bytes: [u8; COMMITMENT_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; COMMITMENT_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; COMMITMENT_LEN]
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
