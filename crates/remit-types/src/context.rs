//! Per-call execution context.
//!
//! There is no ambient clock or sender: every mutating operation receives
//! the caller and the current time explicitly. The time signal is supplied
//! by the execution environment and is assumed non-decreasing, but only to
//! whole-second precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Address;

/// Who is calling, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    pub now: DateTime<Utc>,
}

impl CallContext {
    #[must_use]
    pub fn new(caller: Address, now: DateTime<Utc>) -> Self {
        Self { caller, now }
    }

    /// Same caller, different time.
    #[must_use]
    pub fn at(self, now: DateTime<Utc>) -> Self {
        Self { now, ..self }
    }

    /// Same time, different caller.
    #[must_use]
    pub fn with_caller(self, caller: Address) -> Self {
        Self { caller, ..self }
    }
}
