//! The administrator role.
//!
//! Exactly one administrator at a time, never the zero address. The role
//! decides who may pause, run the kill switch, and where new fees accrue.

use serde::{Deserialize, Serialize};

use crate::{Address, RemitError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    administrator: Address,
}

impl Ownership {
    /// # Errors
    /// Returns `InvalidBeneficiary` if `administrator` is the zero address.
    pub fn new(administrator: Address) -> Result<Self> {
        if administrator.is_zero() {
            return Err(RemitError::InvalidBeneficiary);
        }
        Ok(Self { administrator })
    }

    #[must_use]
    pub fn administrator(&self) -> Address {
        self.administrator
    }

    #[must_use]
    pub fn is_administrator(&self, caller: Address) -> bool {
        caller == self.administrator
    }

    /// Guard an administrator-only call.
    pub fn ensure_administrator(&self, caller: Address) -> Result<()> {
        if self.is_administrator(caller) {
            Ok(())
        } else {
            Err(RemitError::NotAdministrator)
        }
    }

    /// Hand the role to `new_admin`, returning the previous administrator.
    ///
    /// # Errors
    /// - `NotAdministrator` if `caller` is not the current administrator
    /// - `InvalidBeneficiary` if `new_admin` is the zero address
    pub fn transfer(&mut self, caller: Address, new_admin: Address) -> Result<Address> {
        self.ensure_administrator(caller)?;
        if new_admin.is_zero() {
            return Err(RemitError::InvalidBeneficiary);
        }
        Ok(std::mem::replace(&mut self.administrator, new_admin))
    }
}
