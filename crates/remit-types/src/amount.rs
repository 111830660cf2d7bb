//! Integer amounts and the arithmetic guard.
//!
//! Every balance mutation in the escrow goes through [`checked_add`] or
//! [`checked_sub`]; overflow and underflow are fatal to the call.

use crate::{RemitError, Result};

/// Amount of the native asset in its smallest unit (e.g. wei).
pub type Amount = u128;

/// Overflow-checked addition.
///
/// # Errors
/// Returns [`RemitError::ArithmeticOverflow`] if the sum does not fit.
pub fn checked_add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(RemitError::ArithmeticOverflow)
}

/// Underflow-checked subtraction.
///
/// # Errors
/// Returns [`RemitError::ArithmeticUnderflow`] if `b > a`.
pub fn checked_sub(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_sub(b).ok_or(RemitError::ArithmeticUnderflow)
}
