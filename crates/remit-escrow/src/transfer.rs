//! Outgoing value transfer.
//!
//! Paying someone is an external call the contract does not control. The
//! recipient gets a handle to the contract for the duration of the call and
//! may call straight back into it. The contract only invokes a transfer
//! after it has cleared the ledger entry being paid out.

use std::collections::HashMap;

use remit_types::{Address, Amount, Result, checked_add};

use crate::Remittance;

/// The capability that moves value out of the contract.
pub trait ValueTransfer {
    /// Deliver `amount` to `to`. Returning an error reverts the whole call
    /// that triggered the transfer.
    fn transfer(&mut self, remittance: &mut Remittance, to: Address, amount: Amount) -> Result<()>;
}

/// In-memory recipient balances. Never re-enters.
#[derive(Debug, Clone, Default)]
pub struct Wallets {
    received: HashMap<Address, Amount>,
}

impl Wallets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total value delivered to `who` so far.
    #[must_use]
    pub fn received(&self, who: Address) -> Amount {
        self.received.get(&who).copied().unwrap_or(0)
    }

    /// Total value delivered to anyone.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.received.values().sum()
    }
}

impl ValueTransfer for Wallets {
    fn transfer(
        &mut self,
        _remittance: &mut Remittance,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        let entry = self.received.entry(to).or_default();
        *entry = checked_add(*entry, amount)?;
        tracing::trace!(to = %to, amount, "Value delivered");
        Ok(())
    }
}
