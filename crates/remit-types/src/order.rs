//! # Order: an escrowed remittance keyed by its commitment
//!
//! Each commitment owns exactly one ledger slot. A slot is either empty or
//! holds one active order.
//!
//! ## Slot lifecycle
//!
//! ```text
//!            open            cancel / redeem
//!   ┌───────┐ ─────▶ ┌──────────────┐ ─────▶ ┌───────┐
//!   │ EMPTY │        │ ACTIVE(order)│        │ EMPTY │ ─▶ open again
//!   └───────┘        └──────────────┘        └───────┘
//! ```
//!
//! Settling an order is a transition back to `Empty`; there is no separate
//! "used" marker, so a settled commitment can carry a brand-new order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, Result, checked_add};

/// A fee that stays escrowed with its order until redeem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldFee {
    /// Who the fee accrues to once the order is redeemed.
    pub recipient: Address,
    pub amount: Amount,
}

/// An active escrow record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The sender who opened the order and may cancel it.
    pub emitter: Address,
    /// Net escrowed amount (value minus any fee). Always > 0 while active.
    pub amount: Amount,
    /// Earliest time the emitter may cancel.
    pub deadline: DateTime<Utc>,
    /// Exchange the order was opened for, when declared up front.
    pub beneficiary: Option<Address>,
    /// Fee held back under the gross refund policy.
    pub held_fee: Option<HeldFee>,
}

impl Order {
    /// Whether the emitter may cancel at `now`.
    #[must_use]
    pub fn is_cancellable_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Net amount plus any held fee.
    pub fn gross_amount(&self) -> Result<Amount> {
        checked_add(
            self.amount,
            self.held_fee.map_or(0, |fee| fee.amount),
        )
    }
}

/// The presence state of a ledger slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderSlot {
    /// No active order. The commitment is free.
    #[default]
    Empty,
    /// An order currently occupies the commitment.
    Active(Order),
}

impl OrderSlot {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    #[must_use]
    pub fn as_active(&self) -> Option<&Order> {
        match self {
            Self::Active(order) => Some(order),
            Self::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn order(amount: Amount) -> Order {
        Order {
            emitter: Address([1u8; 20]),
            amount,
            deadline: Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap(),
            beneficiary: None,
            held_fee: None,
        }
    }

    #[test]
    fn cancellable_exactly_at_deadline() {
        let o = order(10);
        assert!(!o.is_cancellable_at(o.deadline - Duration::seconds(1)));
        assert!(o.is_cancellable_at(o.deadline));
        assert!(o.is_cancellable_at(o.deadline + Duration::days(1)));
    }

    #[test]
    fn gross_amount_includes_held_fee() {
        let mut o = order(98_000);
        assert_eq!(o.gross_amount().unwrap(), 98_000);
        o.held_fee = Some(HeldFee {
            recipient: Address([2u8; 20]),
            amount: 2000,
        });
        assert_eq!(o.gross_amount().unwrap(), 100_000);
    }

    #[test]
    fn active_slot_exposes_its_order() {
        let slot = OrderSlot::Active(order(5));
        assert!(slot.is_active());
        assert_eq!(slot.as_active().map(|o| o.amount), Some(5));
    }

    #[test]
    fn default_slot_is_empty() {
        assert!(OrderSlot::default().as_active().is_none());
    }
}
