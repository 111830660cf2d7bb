//! Append-only notifications, one per observable state change.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, Commitment};

/// Externally observable record of a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    /// A flat fee was charged to `sender`.
    FeeTaken { sender: Address, amount: Amount },
    /// A new order was escrowed.
    OrderOpened {
        emitter: Address,
        amount: Amount,
        commitment: Commitment,
        beneficiary: Option<Address>,
        deadline: DateTime<Utc>,
    },
    /// The emitter took an expired order back.
    OrderCancelled {
        emitter: Address,
        amount: Amount,
        commitment: Commitment,
    },
    /// Value left the contract to `beneficiary` (redeem or fee withdrawal).
    Withdrawal { beneficiary: Address, amount: Amount },
    AdministratorChanged { previous: Address, new: Address },
    Paused { admin: Address },
    Unpaused { admin: Address },
    TimelockStarted { admin: Address },
    TimelockStopped { admin: Address },
    ContractTerminated { admin: Address, swept: Amount },
}

impl Notification {
    /// Short event name, matching the serialized `event` tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::FeeTaken { .. } => "fee_taken",
            Self::OrderOpened { .. } => "order_opened",
            Self::OrderCancelled { .. } => "order_cancelled",
            Self::Withdrawal { .. } => "withdrawal",
            Self::AdministratorChanged { .. } => "administrator_changed",
            Self::Paused { .. } => "paused",
            Self::Unpaused { .. } => "unpaused",
            Self::TimelockStarted { .. } => "timelock_started",
            Self::TimelockStopped { .. } => "timelock_stopped",
            Self::ContractTerminated { .. } => "contract_terminated",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tag_matches_name() {
        let events = [
            Notification::FeeTaken {
                sender: Address([1u8; 20]),
                amount: 2000,
            },
            Notification::Withdrawal {
                beneficiary: Address([2u8; 20]),
                amount: 7,
            },
            Notification::TimelockStopped {
                admin: Address([3u8; 20]),
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.name());
        }
    }
}
