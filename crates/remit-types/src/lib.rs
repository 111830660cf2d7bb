//! # remit-types
//!
//! Shared types, errors, and configuration for the **Remit** escrow.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`Commitment`]
//! - **Amounts**: [`Amount`] and the checked arithmetic guard ([`checked_add`], [`checked_sub`])
//! - **Order model**: [`Order`], [`OrderSlot`], [`HeldFee`]
//! - **Notifications**: [`Notification`]
//! - **Ownership**: [`Ownership`] (the administrator role)
//! - **Configuration**: [`RemittanceConfig`], [`RefundPolicy`]
//! - **Call context**: [`CallContext`]
//! - **Errors**: [`RemitError`] with `RM_ERR_` prefix codes
//! - **Constants**: flat fee, wait period, hashing domain tags

pub mod amount;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod ids;
pub mod notification;
pub mod order;
pub mod ownership;

// Re-export all primary types at crate root for ergonomic imports:
//   use remit_types::{Address, Commitment, Order, RemitError, ...};

pub use amount::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use ids::*;
pub use notification::*;
pub use order::*;
pub use ownership::*;

// Constants are accessed via `remit_types::constants::FOO`
// (not re-exported to avoid name collisions).
