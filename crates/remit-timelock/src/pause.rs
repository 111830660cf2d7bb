//! Administrator-controlled pause flag.
//!
//! While paused, no new orders are accepted. Existing orders can still be
//! cancelled or redeemed. The kill switch reads this flag: termination is
//! only allowed while paused.

use remit_types::{Address, Ownership, RemitError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitch {
    paused: bool,
}

impl PauseSwitch {
    /// A new, unpaused switch.
    #[must_use]
    pub fn new() -> Self {
        Self { paused: false }
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the contract.
    ///
    /// # Errors
    /// - `NotAdministrator` if `caller` is not the administrator
    /// - `AlreadyPaused` if already paused
    pub fn pause(&mut self, ownership: &Ownership, caller: Address) -> Result<()> {
        ownership.ensure_administrator(caller)?;
        if self.paused {
            return Err(RemitError::AlreadyPaused);
        }
        self.paused = true;
        tracing::info!(admin = %caller, "Contract paused");
        Ok(())
    }

    /// Resume the contract.
    ///
    /// # Errors
    /// - `NotAdministrator` if `caller` is not the administrator
    /// - `NotPaused` if not paused
    pub fn unpause(&mut self, ownership: &Ownership, caller: Address) -> Result<()> {
        ownership.ensure_administrator(caller)?;
        if !self.paused {
            return Err(RemitError::NotPaused);
        }
        self.paused = false;
        tracing::info!(admin = %caller, "Contract unpaused");
        Ok(())
    }

    /// Guard a call that must not run while paused.
    pub fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            Err(RemitError::ContractPaused)
        } else {
            Ok(())
        }
    }
}
