//! Fee ledger: accrued, withdrawable fee balances per beneficiary.
//!
//! Balances only grow through [`FeeLedger::accrue`] (called by the order
//! ledger) and only shrink through [`FeeLedger::take_all`], which zeroes the
//! entry before handing the amount back for payout. Entries are never
//! removed, only zeroed, and each beneficiary's balance is independent: a
//! change of administrator never moves an earlier administrator's fees.

use std::collections::HashMap;

use remit_types::{Address, Amount, RemitError, Result, checked_add};

#[derive(Debug, Clone, Default)]
pub struct FeeLedger {
    /// Accrued fees per beneficiary.
    balances: HashMap<Address, Amount>,
}

impl FeeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit `amount` to `beneficiary`. Creates the entry on first accrual.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the balance would overflow; the
    /// ledger is unchanged in that case.
    pub fn accrue(&mut self, beneficiary: Address, amount: Amount) -> Result<()> {
        let entry = self.balances.entry(beneficiary).or_default();
        *entry = checked_add(*entry, amount)?;
        tracing::debug!(beneficiary = %beneficiary, amount, balance = *entry, "Fee accrued");
        Ok(())
    }

    /// Zero `beneficiary`'s balance and return what it held.
    ///
    /// # Errors
    /// Returns `NothingToWithdraw` if the balance is zero.
    pub fn take_all(&mut self, beneficiary: Address) -> Result<Amount> {
        match self.balances.get_mut(&beneficiary) {
            Some(balance) if *balance > 0 => Ok(std::mem::take(balance)),
            _ => Err(RemitError::NothingToWithdraw),
        }
    }

    /// Accrued balance for `beneficiary` (zero if never credited).
    #[must_use]
    pub fn balance(&self, beneficiary: Address) -> Amount {
        self.balances.get(&beneficiary).copied().unwrap_or(0)
    }

    /// Sum of all accrued balances.
    pub fn total(&self) -> Result<Amount> {
        self.balances
            .values()
            .try_fold(0, |acc, &balance| checked_add(acc, balance))
    }

    /// Drop every balance. Only used when the contract is terminated.
    pub(crate) fn clear(&mut self) {
        self.balances.clear();
    }
}
