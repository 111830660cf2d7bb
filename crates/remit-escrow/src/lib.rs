//! # remit-escrow
//!
//! **Escrow Plane**: commitment hashing, the order and fee ledgers, and the
//! [`Remittance`] contract that exposes them.
//!
//! ## Architecture
//!
//! 1. **commitment**: binds (contract, exchange, secret) into a 32-byte key
//! 2. **OrderLedger**: one slot per commitment, EMPTY or ACTIVE(order)
//! 3. **FeeLedger**: accrued fees per beneficiary, fed only by the order ledger
//! 4. **ValueTransfer**: the untrusted outgoing payment capability
//! 5. **Remittance**: checkpointed boundary operations plus the kill switch
//!
//! ## Order Flow
//!
//! ```text
//! sender: commit(exchange, secret) → open_order(c, duration)
//!           ├─▶ exchange: redeem(secret)
//!           └─▶ sender:   cancel_order(c)  [after deadline]
//! ```
//!
//! Ledger state is always cleared before value leaves the contract.

pub mod commitment;
pub mod fee_ledger;
pub mod order_ledger;
pub mod remittance;
pub mod transfer;

pub use commitment::commit;
pub use fee_ledger::FeeLedger;
pub use order_ledger::{OpenRequest, OpenedOrder, OrderLedger, RedeemedOrder};
pub use remittance::Remittance;
pub use transfer::{ValueTransfer, Wallets};
