//! System-wide constants for the remittance escrow.

use crate::Amount;

/// Flat fee taken from every order when fees are enabled (smallest units).
pub const FLAT_FEE: Amount = 2000;

/// Seconds in one day.
pub const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Minimum time a kill process must be pending before termination (31 days).
pub const WAIT_PERIOD_SECS: u64 = 31 * SECS_PER_DAY;

/// Width of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Width of a commitment hash in bytes.
pub const COMMITMENT_LEN: usize = 32;

/// Domain separation tag prefixed to every commitment preimage.
pub const COMMITMENT_DOMAIN: &[u8] = b"remit:commitment:v1:";
