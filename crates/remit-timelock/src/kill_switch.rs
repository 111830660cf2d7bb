//! Timelocked two-step kill switch.
//!
//! ## State Machine
//!
//! ```text
//!            start                 terminate (paused, waited)
//!   ┌──────┐ ─────▶ ┌───────────────────┐ ─────▶ ┌────────────┐
//!   │ IDLE │        │ PENDING(started)  │        │ TERMINATED │
//!   └──────┘ ◀───── └───────────────────┘        └────────────┘
//!             stop
//! ```
//!
//! Readiness is time-only: a process is ready once it has been pending for
//! the full wait period. Termination additionally requires the external
//! pause flag, so tooling can poll [`KillSwitch::is_ready`] without side
//! effects while the destructive step stays behind a second switch.
//! `TERMINATED` is absorbing.

use std::{fmt, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use remit_types::{Address, Ownership, RemitError, Result};
use serde::{Deserialize, Serialize};

/// Where the kill process currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillProcess {
    /// No termination in progress.
    Idle,
    /// Termination requested at `started_at`.
    Pending { started_at: DateTime<Utc> },
    /// The contract has been terminated. Nothing leaves this state.
    Terminated { at: DateTime<Utc> },
}

impl fmt::Display for KillProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Pending { started_at } => write!(f, "PENDING({started_at})"),
            Self::Terminated { at } => write!(f, "TERMINATED({at})"),
        }
    }
}

/// Authorization gate for the irreversible termination of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillSwitch {
    process: KillProcess,
    wait_period: TimeDelta,
}

impl KillSwitch {
    /// Create an idle switch with the given minimum pending time.
    ///
    /// # Errors
    /// Returns `Configuration` if `wait_period` is zero or out of range.
    pub fn new(wait_period: Duration) -> Result<Self> {
        if wait_period.is_zero() {
            return Err(RemitError::Configuration(
                "kill switch wait period must be > 0".into(),
            ));
        }
        let wait_period = TimeDelta::from_std(wait_period)
            .map_err(|e| RemitError::Configuration(format!("wait period: {e}")))?;
        Ok(Self {
            process: KillProcess::Idle,
            wait_period,
        })
    }

    #[must_use]
    pub fn process(&self) -> KillProcess {
        self.process
    }

    #[must_use]
    pub fn wait_period(&self) -> TimeDelta {
        self.wait_period
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.process, KillProcess::Pending { .. })
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self.process, KillProcess::Terminated { .. })
    }

    /// Guard any call that must not run on a terminated contract.
    pub fn ensure_live(&self) -> Result<()> {
        if self.is_terminated() {
            Err(RemitError::ContractTerminated)
        } else {
            Ok(())
        }
    }

    /// The earliest time termination is permitted, if a process is pending.
    #[must_use]
    pub fn ready_at(&self) -> Option<DateTime<Utc>> {
        match self.process {
            KillProcess::Pending { started_at } => started_at.checked_add_signed(self.wait_period),
            KillProcess::Idle | KillProcess::Terminated { .. } => None,
        }
    }

    /// True iff pending and the wait period has elapsed at `now`.
    /// Independent of the pause flag.
    #[must_use]
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.ready_at().is_some_and(|ready_at| now >= ready_at)
    }

    /// Begin the kill process.
    ///
    /// # Errors
    /// - `NotAdministrator` if `caller` is not the administrator
    /// - `ContractTerminated` if already terminated
    /// - `AlreadyPending` if a process is already running
    pub fn start(
        &mut self,
        ownership: &Ownership,
        caller: Address,
        now: DateTime<Utc>,
    ) -> Result<()> {
        ownership.ensure_administrator(caller)?;
        match self.process {
            KillProcess::Idle => {
                self.process = KillProcess::Pending { started_at: now };
                tracing::info!(admin = %caller, started_at = %now, "Kill process started");
                Ok(())
            }
            KillProcess::Pending { .. } => Err(RemitError::AlreadyPending),
            KillProcess::Terminated { .. } => Err(RemitError::ContractTerminated),
        }
    }

    /// Abort the kill process.
    ///
    /// # Errors
    /// - `NotAdministrator` if `caller` is not the administrator
    /// - `ContractTerminated` if already terminated
    /// - `NotPending` if no process is running
    pub fn stop(&mut self, ownership: &Ownership, caller: Address) -> Result<()> {
        ownership.ensure_administrator(caller)?;
        match self.process {
            KillProcess::Pending { started_at } => {
                self.process = KillProcess::Idle;
                tracing::info!(admin = %caller, %started_at, "Kill process stopped");
                Ok(())
            }
            KillProcess::Idle => Err(RemitError::NotPending),
            KillProcess::Terminated { .. } => Err(RemitError::ContractTerminated),
        }
    }

    /// Authorize and record termination. The caller performs the sweep.
    ///
    /// # Errors
    /// - `NotAdministrator` if `caller` is not the administrator
    /// - `ContractTerminated` if already terminated
    /// - `NotPending` if no process is running
    /// - `NotPaused` if `paused` is false
    /// - `WaitPeriodNotElapsed` if the process is not yet ready
    pub fn terminate(
        &mut self,
        ownership: &Ownership,
        caller: Address,
        paused: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        ownership.ensure_administrator(caller)?;
        match self.process {
            KillProcess::Terminated { .. } => return Err(RemitError::ContractTerminated),
            KillProcess::Idle => return Err(RemitError::NotPending),
            KillProcess::Pending { .. } => {}
        }
        if !paused {
            return Err(RemitError::NotPaused);
        }
        if !self.is_ready(now) {
            // ready_at is only None here if started_at + wait overflows.
            let ready_at = self.ready_at().unwrap_or(DateTime::<Utc>::MAX_UTC);
            return Err(RemitError::WaitPeriodNotElapsed { ready_at });
        }
        self.process = KillProcess::Terminated { at: now };
        tracing::warn!(admin = %caller, at = %now, "Kill switch fired: contract terminated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use remit_types::constants::WAIT_PERIOD_SECS;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (KillSwitch, Ownership, Address) {
        let admin = Address::random();
        let switch = KillSwitch::new(Duration::from_secs(WAIT_PERIOD_SECS)).unwrap();
        (switch, Ownership::new(admin).unwrap(), admin)
    }

    #[test]
    fn zero_wait_period_rejected() {
        let err = KillSwitch::new(Duration::ZERO).unwrap_err();
        assert!(matches!(err, RemitError::Configuration(_)));
    }

    #[test]
    fn starts_idle_and_not_ready() {
        let (switch, _, _) = setup();
        assert_eq!(switch.process(), KillProcess::Idle);
        assert!(!switch.is_ready(t0()));
        assert!(switch.ready_at().is_none());
    }

    #[test]
    fn start_moves_to_pending() {
        let (mut switch, own, admin) = setup();
        switch.start(&own, admin, t0()).unwrap();
        assert_eq!(switch.process(), KillProcess::Pending { started_at: t0() });
        assert_eq!(switch.ready_at(), Some(t0() + TimeDelta::days(31)));
    }

    #[test]
    fn double_start_fails() {
        let (mut switch, own, admin) = setup();
        switch.start(&own, admin, t0()).unwrap();
        assert_eq!(
            switch.start(&own, admin, t0()).unwrap_err(),
            RemitError::AlreadyPending
        );
    }

    #[test]
    fn stop_returns_to_idle() {
        let (mut switch, own, admin) = setup();
        switch.start(&own, admin, t0()).unwrap();
        switch.stop(&own, admin).unwrap();
        assert_eq!(switch.process(), KillProcess::Idle);
        assert_eq!(switch.stop(&own, admin).unwrap_err(), RemitError::NotPending);
    }

    #[test]
    fn stranger_cannot_start_or_stop() {
        let (mut switch, own, admin) = setup();
        let stranger = Address::random();
        assert_eq!(
            switch.start(&own, stranger, t0()).unwrap_err(),
            RemitError::NotAdministrator
        );
        switch.start(&own, admin, t0()).unwrap();
        assert_eq!(
            switch.stop(&own, stranger).unwrap_err(),
            RemitError::NotAdministrator
        );
        assert!(switch.is_pending());
    }

    #[test]
    fn ready_exactly_at_wait_period() {
        let (mut switch, own, admin) = setup();
        switch.start(&own, admin, t0()).unwrap();
        let ready = t0() + TimeDelta::days(31);
        assert!(!switch.is_ready(ready - TimeDelta::seconds(1)));
        assert!(switch.is_ready(ready));
    }

    #[test]
    fn readiness_ignores_pause() {
        let (mut switch, own, admin) = setup();
        switch.start(&own, admin, t0()).unwrap();
        let later = t0() + TimeDelta::days(40);
        assert!(switch.is_ready(later));
        assert_eq!(
            switch.terminate(&own, admin, false, later).unwrap_err(),
            RemitError::NotPaused
        );
        assert!(switch.is_pending());
    }

    #[test]
    fn terminate_before_wait_fails() {
        let (mut switch, own, admin) = setup();
        switch.start(&own, admin, t0()).unwrap();
        let err = switch
            .terminate(&own, admin, true, t0() + TimeDelta::days(30))
            .unwrap_err();
        assert_eq!(
            err,
            RemitError::WaitPeriodNotElapsed {
                ready_at: t0() + TimeDelta::days(31)
            }
        );
    }

    #[test]
    fn terminate_when_idle_fails() {
        let (mut switch, own, admin) = setup();
        assert_eq!(
            switch.terminate(&own, admin, true, t0()).unwrap_err(),
            RemitError::NotPending
        );
    }

    #[test]
    fn terminate_is_absorbing() {
        let (mut switch, own, admin) = setup();
        switch.start(&own, admin, t0()).unwrap();
        let later = t0() + TimeDelta::days(31);
        switch.terminate(&own, admin, true, later).unwrap();
        assert!(switch.is_terminated());
        assert!(!switch.is_ready(later));
        assert_eq!(switch.ensure_live().unwrap_err(), RemitError::ContractTerminated);
        assert_eq!(
            switch.start(&own, admin, later).unwrap_err(),
            RemitError::ContractTerminated
        );
        assert_eq!(
            switch.terminate(&own, admin, true, later).unwrap_err(),
            RemitError::ContractTerminated
        );
    }
}
