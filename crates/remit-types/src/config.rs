//! Construction-time configuration for a remittance contract.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Amount, RemitError, Result, constants};

/// What a cancelled order gives back to its emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundPolicy {
    /// The fee accrues to the administrator when the order is opened;
    /// cancellation refunds only the net amount.
    #[default]
    Net,
    /// The fee stays with the order and accrues only on redeem;
    /// cancellation refunds net amount plus fee.
    Gross,
}

/// Configuration fixed when the contract is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemittanceConfig {
    /// Whether orders are charged the flat fee.
    pub fee_enabled: bool,
    /// Flat fee deducted from every order when `fee_enabled`.
    pub flat_fee: Amount,
    /// Refund behaviour of cancelled orders.
    pub refund_policy: RefundPolicy,
    /// How long a kill process must be pending before termination.
    pub wait_period_secs: u64,
}

impl Default for RemittanceConfig {
    fn default() -> Self {
        Self {
            fee_enabled: true,
            flat_fee: constants::FLAT_FEE,
            refund_policy: RefundPolicy::Net,
            wait_period_secs: constants::WAIT_PERIOD_SECS,
        }
    }
}

impl RemittanceConfig {
    /// A config that never charges a fee.
    #[must_use]
    pub fn fee_free() -> Self {
        Self {
            fee_enabled: false,
            ..Self::default()
        }
    }

    /// Parse a JSON document and validate it. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the contract cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.wait_period_secs == 0 {
            return Err(RemitError::Configuration(
                "wait_period_secs must be > 0".into(),
            ));
        }
        if self.fee_enabled && self.flat_fee == 0 {
            return Err(RemitError::Configuration(
                "flat_fee must be > 0 when fees are enabled".into(),
            ));
        }
        Ok(())
    }

    /// The fee charged per order under this config (zero when disabled).
    #[must_use]
    pub fn effective_fee(&self) -> Amount {
        if self.fee_enabled { self.flat_fee } else { 0 }
    }

    #[must_use]
    pub fn wait_period(&self) -> Duration {
        Duration::from_secs(self.wait_period_secs)
    }
}
