//! Error types for the remittance escrow.
//!
//! All errors use the `RM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by class:
//! - 1xx: Validation errors
//! - 2xx: State-conflict errors
//! - 3xx: Authorization errors
//! - 4xx: Timing errors
//! - 5xx: Ledger / arithmetic errors
//! - 6xx: Contract lifecycle and transfer errors
//! - 9xx: Configuration / internal errors
//!
//! Every error is a caller-local, synchronous failure. A call that returns
//! one of these leaves no state change behind.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{Amount, Commitment};

/// Central error enum for all Remit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemitError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The beneficiary is the zero address.
    #[error("RM_ERR_100: Invalid beneficiary: zero address")]
    InvalidBeneficiary,

    /// The secret is empty.
    #[error("RM_ERR_101: Invalid secret: must not be empty")]
    InvalidSecret,

    /// The attached value does not cover the flat fee.
    #[error("RM_ERR_102: Insufficient value: {value} does not exceed fee {fee}")]
    InsufficientValue { value: Amount, fee: Amount },

    /// No value was attached to a payable call.
    #[error("RM_ERR_103: Zero value")]
    ZeroValue,

    /// The commitment is all zeroes.
    #[error("RM_ERR_104: Invalid commitment: zero hash")]
    InvalidCommitment,

    // =================================================================
    // State-Conflict Errors (2xx)
    // =================================================================
    /// An active order already occupies this commitment.
    #[error("RM_ERR_200: Duplicate commitment: {0}")]
    DuplicateCommitment(Commitment),

    /// No active order exists under this commitment.
    #[error("RM_ERR_201: No such order: {0}")]
    NoSuchOrder(Commitment),

    /// A kill process is already pending.
    #[error("RM_ERR_202: Kill process already pending")]
    AlreadyPending,

    /// No kill process is pending.
    #[error("RM_ERR_203: No kill process pending")]
    NotPending,

    /// The contract is already paused.
    #[error("RM_ERR_204: Contract already paused")]
    AlreadyPaused,

    // =================================================================
    // Authorization Errors (3xx)
    // =================================================================
    /// The caller did not open this order.
    #[error("RM_ERR_300: Caller is not the order emitter")]
    NotEmitter,

    /// The caller is not the current administrator.
    #[error("RM_ERR_301: Caller is not the administrator")]
    NotAdministrator,

    /// The operation requires the contract to be paused.
    #[error("RM_ERR_302: Contract is not paused")]
    NotPaused,

    /// The operation is unavailable while the contract is paused.
    #[error("RM_ERR_303: Contract is paused")]
    ContractPaused,

    // =================================================================
    // Timing Errors (4xx)
    // =================================================================
    /// The order deadline has not been reached yet.
    #[error("RM_ERR_400: Deadline not reached: order unlocks at {deadline}")]
    DeadlineNotReached { deadline: DateTime<Utc> },

    /// The kill process has not been pending for the full wait period.
    #[error("RM_ERR_401: Wait period not elapsed: ready at {ready_at}")]
    WaitPeriodNotElapsed { ready_at: DateTime<Utc> },

    // =================================================================
    // Ledger / Arithmetic Errors (5xx)
    // =================================================================
    /// The caller has no accrued balance.
    #[error("RM_ERR_500: Nothing to withdraw")]
    NothingToWithdraw,

    /// A checked addition overflowed.
    #[error("RM_ERR_501: Arithmetic overflow")]
    ArithmeticOverflow,

    /// A checked subtraction underflowed.
    #[error("RM_ERR_502: Arithmetic underflow")]
    ArithmeticUnderflow,

    /// Value in custody does not match what the ledgers account for.
    #[error("RM_ERR_503: Custody invariant violation: held {held}, accounted {accounted}")]
    CustodyInvariantViolation { held: Amount, accounted: Amount },

    // =================================================================
    // Lifecycle / Transfer Errors (6xx)
    // =================================================================
    /// The outgoing value transfer was refused by the recipient.
    #[error("RM_ERR_600: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// The contract has been terminated and is permanently inert.
    #[error("RM_ERR_601: Contract terminated")]
    ContractTerminated,

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    /// Configuration error (invalid values, malformed document).
    #[error("RM_ERR_900: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RemitError>;

impl From<serde_json::Error> for RemitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
