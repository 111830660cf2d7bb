//! The remittance contract.
//!
//! [`Remittance`] wires the order ledger, fee ledger, ownership, pause flag
//! and kill switch into the boundary operations callers use. Each mutating
//! operation runs against a checkpoint of the contract state: if any step
//! fails, including the outgoing transfer or anything a re-entrant call did
//! during it, the checkpoint is restored and the notification log is cut
//! back to its length at entry. The log itself is append-only and never
//! copied. Value held by the contract is tracked in `held` and must always
//! equal what the two ledgers account for.

use std::time::Duration;

use chrono::{DateTime, Utc};
use remit_timelock::{KillProcess, KillSwitch, PauseSwitch};
use remit_types::{
    Address, Amount, CallContext, Commitment, Notification, Order, OrderSlot, Ownership,
    RemitError, RemittanceConfig, Result, checked_add, checked_sub,
};

use crate::{
    commitment,
    fee_ledger::FeeLedger,
    order_ledger::{OpenRequest, OrderLedger},
    transfer::ValueTransfer,
};

/// Mutable state restored when a call fails. Both ledgers hold only live
/// entries, so a checkpoint is bounded by open orders and fee accounts.
#[derive(Debug, Clone)]
struct ContractState {
    ownership: Ownership,
    orders: OrderLedger,
    fees: FeeLedger,
    pause: PauseSwitch,
    kill_switch: KillSwitch,
    /// Value currently in the contract's custody.
    held: Amount,
}

/// A deployed remittance escrow instance.
#[derive(Debug, Clone)]
pub struct Remittance {
    /// This instance's own address; bound into every commitment.
    address: Address,
    config: RemittanceConfig,
    state: ContractState,
    notifications: Vec<Notification>,
}

impl Remittance {
    /// Deploy a new instance at `address`, administered by `administrator`.
    ///
    /// # Errors
    /// - `Configuration` if `config` is invalid or `address` is zero
    /// - `InvalidBeneficiary` if `administrator` is the zero address
    pub fn new(address: Address, administrator: Address, config: RemittanceConfig) -> Result<Self> {
        config.validate()?;
        if address.is_zero() {
            return Err(RemitError::Configuration(
                "contract address must be non-zero".into(),
            ));
        }
        let state = ContractState {
            ownership: Ownership::new(administrator)?,
            orders: OrderLedger::new(),
            fees: FeeLedger::new(),
            pause: PauseSwitch::new(),
            kill_switch: KillSwitch::new(config.wait_period())?,
            held: 0,
        };
        tracing::info!(
            contract = %address,
            admin = %administrator,
            fee_enabled = config.fee_enabled,
            flat_fee = config.flat_fee,
            refund_policy = ?config.refund_policy,
            "Remittance deployed"
        );
        Ok(Self {
            address,
            config,
            state,
            notifications: Vec::new(),
        })
    }

    /// Run `op` against a checkpoint; restore it and drop any notifications
    /// emitted since if `op` fails.
    fn atomically<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let checkpoint = self.state.clone();
        let log_len = self.notifications.len();
        match op(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.state = checkpoint;
                self.notifications.truncate(log_len);
                tracing::warn!(operation, error = %err, "Call reverted");
                Err(err)
            }
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    // -----------------------------------------------------------------
    // Commitments
    // -----------------------------------------------------------------

    /// Compute the commitment for `beneficiary` and `secret` on this instance.
    ///
    /// # Errors
    /// `InvalidBeneficiary`, `InvalidSecret`, or `ContractTerminated`.
    pub fn commit(&self, beneficiary: Address, secret: &[u8]) -> Result<Commitment> {
        self.state.kill_switch.ensure_live()?;
        commitment::commit(self.address, beneficiary, secret)
    }

    // -----------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------

    /// Escrow `value` under `commitment`, cancellable by the caller after
    /// `duration`.
    pub fn open_order(
        &mut self,
        ctx: &CallContext,
        commitment: Commitment,
        duration: Duration,
        value: Amount,
    ) -> Result<()> {
        self.open(ctx, None, commitment, duration, value)
    }

    /// Like [`open_order`](Self::open_order), declaring the exchange up front.
    ///
    /// # Errors
    /// Additionally fails with `InvalidBeneficiary` for the zero address.
    pub fn open_order_for(
        &mut self,
        ctx: &CallContext,
        beneficiary: Address,
        commitment: Commitment,
        duration: Duration,
        value: Amount,
    ) -> Result<()> {
        self.open(ctx, Some(beneficiary), commitment, duration, value)
    }

    fn open(
        &mut self,
        ctx: &CallContext,
        beneficiary: Option<Address>,
        commitment: Commitment,
        duration: Duration,
        value: Amount,
    ) -> Result<()> {
        self.atomically("open_order", |this| {
            this.state.kill_switch.ensure_live()?;
            this.state.pause.ensure_not_paused()?;

            let administrator = this.state.ownership.administrator();
            let opened = this.state.orders.open(
                &mut this.state.fees,
                &this.config,
                administrator,
                OpenRequest {
                    emitter: ctx.caller,
                    commitment,
                    beneficiary,
                    value,
                    duration,
                    now: ctx.now,
                },
            )?;
            this.state.held = checked_add(this.state.held, value)?;

            if opened.fee_charged > 0 {
                this.notify(Notification::FeeTaken {
                    sender: ctx.caller,
                    amount: opened.fee_charged,
                });
            }
            this.notify(Notification::OrderOpened {
                emitter: ctx.caller,
                amount: opened.net,
                commitment,
                beneficiary,
                deadline: opened.deadline,
            });

            tracing::info!(
                commitment = %commitment.short(),
                emitter = %ctx.caller,
                net = opened.net,
                fee = opened.fee_charged,
                deadline = %opened.deadline,
                "Order opened"
            );
            Ok(())
        })
    }

    /// Return an expired order's funds to its emitter. Returns the refund.
    ///
    /// # Errors
    /// `NoSuchOrder`, `NotEmitter`, `DeadlineNotReached`, `ContractTerminated`,
    /// or whatever the transfer fails with.
    pub fn cancel_order(
        &mut self,
        ctx: &CallContext,
        commitment: Commitment,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<Amount> {
        self.atomically("cancel_order", |this| {
            this.state.kill_switch.ensure_live()?;

            let order = this
                .state
                .orders
                .take_for_cancel(commitment, ctx.caller, ctx.now)?;
            let refund = order.gross_amount()?;
            this.state.held = checked_sub(this.state.held, refund)?;
            this.notify(Notification::OrderCancelled {
                emitter: order.emitter,
                amount: refund,
                commitment,
            });

            tracing::info!(
                commitment = %commitment.short(),
                emitter = %order.emitter,
                refund,
                "Order cancelled"
            );

            transfer.transfer(this, ctx.caller, refund)?;
            Ok(refund)
        })
    }

    /// Claim the order committed to the caller and `secret`. Returns the payout.
    ///
    /// # Errors
    /// `InvalidSecret`, `NoSuchOrder` (wrong secret, or already settled),
    /// `ContractTerminated`, or whatever the transfer fails with.
    pub fn redeem(
        &mut self,
        ctx: &CallContext,
        secret: &[u8],
        transfer: &mut dyn ValueTransfer,
    ) -> Result<Amount> {
        self.atomically("redeem", |this| {
            this.state.kill_switch.ensure_live()?;

            let commitment = commitment::commit(this.address, ctx.caller, secret)?;
            let redeemed = this
                .state
                .orders
                .take_for_redeem(&mut this.state.fees, commitment)?;
            let payout = redeemed.order.amount;
            this.state.held = checked_sub(this.state.held, payout)?;

            if let Some(fee) = redeemed.fee_released {
                this.notify(Notification::FeeTaken {
                    sender: redeemed.order.emitter,
                    amount: fee.amount,
                });
            }
            this.notify(Notification::Withdrawal {
                beneficiary: ctx.caller,
                amount: payout,
            });

            tracing::info!(
                commitment = %commitment.short(),
                exchange = %ctx.caller,
                payout,
                "Order redeemed"
            );

            transfer.transfer(this, ctx.caller, payout)?;
            Ok(payout)
        })
    }

    // -----------------------------------------------------------------
    // Fees
    // -----------------------------------------------------------------

    /// Pay out the caller's whole accrued fee balance. Returns the amount.
    ///
    /// # Errors
    /// `NothingToWithdraw`, `ContractTerminated`, or whatever the transfer
    /// fails with.
    pub fn withdraw_fees(
        &mut self,
        ctx: &CallContext,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<Amount> {
        self.atomically("withdraw_fees", |this| {
            this.state.kill_switch.ensure_live()?;

            let amount = this.state.fees.take_all(ctx.caller)?;
            this.state.held = checked_sub(this.state.held, amount)?;
            this.notify(Notification::Withdrawal {
                beneficiary: ctx.caller,
                amount,
            });

            tracing::info!(beneficiary = %ctx.caller, amount, "Fees withdrawn");

            transfer.transfer(this, ctx.caller, amount)?;
            Ok(amount)
        })
    }

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    /// Hand the administrator role to `new_admin`. Fees accrued so far stay
    /// with whoever earned them.
    pub fn transfer_administrator(&mut self, ctx: &CallContext, new_admin: Address) -> Result<()> {
        self.atomically("transfer_administrator", |this| {
            this.state.kill_switch.ensure_live()?;
            let previous = this.state.ownership.transfer(ctx.caller, new_admin)?;
            this.notify(Notification::AdministratorChanged {
                previous,
                new: new_admin,
            });
            tracing::info!(previous = %previous, new = %new_admin, "Administrator changed");
            Ok(())
        })
    }

    pub fn pause(&mut self, ctx: &CallContext) -> Result<()> {
        self.atomically("pause", |this| {
            this.state.kill_switch.ensure_live()?;
            this.state.pause.pause(&this.state.ownership, ctx.caller)?;
            this.notify(Notification::Paused { admin: ctx.caller });
            Ok(())
        })
    }

    pub fn unpause(&mut self, ctx: &CallContext) -> Result<()> {
        self.atomically("unpause", |this| {
            this.state.kill_switch.ensure_live()?;
            this.state.pause.unpause(&this.state.ownership, ctx.caller)?;
            this.notify(Notification::Unpaused { admin: ctx.caller });
            Ok(())
        })
    }

    // -----------------------------------------------------------------
    // Kill switch
    // -----------------------------------------------------------------

    /// Begin the termination timelock.
    pub fn start_timelock(&mut self, ctx: &CallContext) -> Result<()> {
        self.atomically("start_timelock", |this| {
            this.state.kill_switch.ensure_live()?;
            this.state
                .kill_switch
                .start(&this.state.ownership, ctx.caller, ctx.now)?;
            this.notify(Notification::TimelockStarted { admin: ctx.caller });
            Ok(())
        })
    }

    /// Abort a pending termination.
    pub fn stop_timelock(&mut self, ctx: &CallContext) -> Result<()> {
        self.atomically("stop_timelock", |this| {
            this.state.kill_switch.ensure_live()?;
            this.state
                .kill_switch
                .stop(&this.state.ownership, ctx.caller)?;
            this.notify(Notification::TimelockStopped { admin: ctx.caller });
            Ok(())
        })
    }

    /// Whether termination has waited long enough. Ignores the pause flag.
    #[must_use]
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.state.kill_switch.is_ready(now)
    }

    /// Terminate the contract: sweep everything it holds to the
    /// administrator, clear both ledgers, and refuse every later call.
    /// Returns the swept amount.
    ///
    /// # Errors
    /// `NotAdministrator`, `NotPending`, `NotPaused`, `WaitPeriodNotElapsed`,
    /// `ContractTerminated`, or whatever the transfer fails with.
    pub fn terminate(
        &mut self,
        ctx: &CallContext,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<Amount> {
        self.atomically("terminate", |this| {
            let paused = this.state.pause.is_paused();
            this.state
                .kill_switch
                .terminate(&this.state.ownership, ctx.caller, paused, ctx.now)?;

            let swept = std::mem::take(&mut this.state.held);
            let abandoned = this.state.orders.active_count();
            this.state.orders.clear();
            this.state.fees.clear();
            this.notify(Notification::ContractTerminated {
                admin: ctx.caller,
                swept,
            });

            tracing::warn!(
                contract = %this.address,
                admin = %ctx.caller,
                swept,
                abandoned_orders = abandoned,
                "Contract terminated"
            );

            if swept > 0 {
                transfer.transfer(this, ctx.caller, swept)?;
            }
            Ok(swept)
        })
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn config(&self) -> &RemittanceConfig {
        &self.config
    }

    #[must_use]
    pub fn administrator(&self) -> Address {
        self.state.ownership.administrator()
    }

    /// The active order under `commitment`, if any.
    #[must_use]
    pub fn order(&self, commitment: &Commitment) -> Option<&Order> {
        self.state.orders.get(commitment)
    }

    #[must_use]
    pub fn order_slot(&self, commitment: &Commitment) -> &OrderSlot {
        self.state.orders.slot(commitment)
    }

    #[must_use]
    pub fn active_orders(&self) -> usize {
        self.state.orders.active_count()
    }

    /// Accrued, withdrawable fees for `who`.
    #[must_use]
    pub fn fee_balance(&self, who: Address) -> Amount {
        self.state.fees.balance(who)
    }

    /// Value currently in the contract's custody.
    #[must_use]
    pub fn held_balance(&self) -> Amount {
        self.state.held
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.pause.is_paused()
    }

    #[must_use]
    pub fn kill_process(&self) -> KillProcess {
        self.state.kill_switch.process()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state.kill_switch.is_terminated()
    }

    /// Every notification emitted so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Check that held value equals escrowed orders plus accrued fees.
    ///
    /// # Errors
    /// Returns [`RemitError::CustodyInvariantViolation`] on mismatch.
    pub fn verify_custody(&self) -> Result<()> {
        let accounted = checked_add(
            self.state.orders.total_escrowed()?,
            self.state.fees.total()?,
        )?;
        if accounted == self.state.held {
            Ok(())
        } else {
            tracing::error!(held = self.state.held, accounted, "Custody invariant violated");
            Err(RemitError::CustodyInvariantViolation {
                held: self.state.held,
                accounted,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Wallets;
    use chrono::{TimeDelta, TimeZone};
    use remit_types::constants::{FLAT_FEE, SECS_PER_DAY};

    const SECRET: &[u8] = b"123456";
    const VALUE: Amount = 100_000_000_000_000_000;
    const FIVE_DAYS: Duration = Duration::from_secs(5 * SECS_PER_DAY);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    struct Fixture {
        contract: Remittance,
        admin: CallContext,
        sender: CallContext,
        exchange: CallContext,
    }

    fn fixture(config: RemittanceConfig) -> Fixture {
        let admin = Address::random();
        Fixture {
            contract: Remittance::new(Address::random(), admin, config).unwrap(),
            admin: CallContext::new(admin, t0()),
            sender: CallContext::new(Address::random(), t0()),
            exchange: CallContext::new(Address::random(), t0()),
        }
    }

    #[test]
    fn zero_contract_address_rejected() {
        let err =
            Remittance::new(Address::ZERO, Address::random(), RemittanceConfig::default())
                .unwrap_err();
        assert!(matches!(err, RemitError::Configuration(_)));
    }

    #[test]
    fn open_emits_fee_then_order() {
        let mut f = fixture(RemittanceConfig::default());
        let c = f.contract.commit(f.exchange.caller, SECRET).unwrap();
        f.contract.open_order(&f.sender, c, FIVE_DAYS, VALUE).unwrap();

        let events = f.contract.notifications();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            Notification::FeeTaken {
                sender: f.sender.caller,
                amount: FLAT_FEE
            }
        );
        assert!(matches!(
            events[1],
            Notification::OrderOpened { amount, .. } if amount == VALUE - FLAT_FEE
        ));
        assert_eq!(f.contract.held_balance(), VALUE);
        f.contract.verify_custody().unwrap();
    }

    #[test]
    fn failed_open_leaves_no_trace() {
        let mut f = fixture(RemittanceConfig::default());
        let c = f.contract.commit(f.exchange.caller, SECRET).unwrap();
        let err = f
            .contract
            .open_order(&f.sender, c, FIVE_DAYS, FLAT_FEE)
            .unwrap_err();
        assert!(matches!(err, RemitError::InsufficientValue { .. }));
        assert!(f.contract.notifications().is_empty());
        assert_eq!(f.contract.held_balance(), 0);
        assert_eq!(f.contract.fee_balance(f.admin.caller), 0);
    }

    #[test]
    fn redeem_pays_net_and_clears_slot() {
        let mut f = fixture(RemittanceConfig::default());
        let mut wallets = Wallets::new();
        let c = f.contract.commit(f.exchange.caller, SECRET).unwrap();
        f.contract.open_order(&f.sender, c, FIVE_DAYS, VALUE).unwrap();

        let paid = f.contract.redeem(&f.exchange, SECRET, &mut wallets).unwrap();
        assert_eq!(paid, VALUE - FLAT_FEE);
        assert_eq!(wallets.received(f.exchange.caller), VALUE - FLAT_FEE);
        assert_eq!(*f.contract.order_slot(&c), OrderSlot::Empty);
        assert_eq!(f.contract.held_balance(), FLAT_FEE);
        f.contract.verify_custody().unwrap();
    }

    #[test]
    fn paused_contract_refuses_new_orders_but_allows_redeem() {
        let mut f = fixture(RemittanceConfig::default());
        let mut wallets = Wallets::new();
        let c = f.contract.commit(f.exchange.caller, SECRET).unwrap();
        f.contract.open_order(&f.sender, c, FIVE_DAYS, VALUE).unwrap();
        f.contract.pause(&f.admin).unwrap();

        let other = f.contract.commit(f.exchange.caller, b"other").unwrap();
        assert_eq!(
            f.contract
                .open_order(&f.sender, other, FIVE_DAYS, VALUE)
                .unwrap_err(),
            RemitError::ContractPaused
        );
        f.contract.redeem(&f.exchange, SECRET, &mut wallets).unwrap();
    }

    #[test]
    fn cancel_before_deadline_fails() {
        let mut f = fixture(RemittanceConfig::default());
        let mut wallets = Wallets::new();
        let c = f.contract.commit(f.exchange.caller, SECRET).unwrap();
        f.contract.open_order(&f.sender, c, FIVE_DAYS, VALUE).unwrap();

        let err = f
            .contract
            .cancel_order(&f.sender.at(t0() + TimeDelta::days(4)), c, &mut wallets)
            .unwrap_err();
        assert_eq!(
            err,
            RemitError::DeadlineNotReached {
                deadline: t0() + TimeDelta::days(5)
            }
        );
        assert!(f.contract.order(&c).is_some());
        assert_eq!(wallets.total(), 0);
    }

    #[test]
    fn stranger_cannot_transfer_administrator() {
        let mut f = fixture(RemittanceConfig::default());
        let err = f
            .contract
            .transfer_administrator(&f.sender, f.sender.caller)
            .unwrap_err();
        assert_eq!(err, RemitError::NotAdministrator);
        assert_eq!(f.contract.administrator(), f.admin.caller);
    }

    struct Refuse;

    impl ValueTransfer for Refuse {
        fn transfer(&mut self, _: &mut Remittance, to: Address, _: Amount) -> Result<()> {
            Err(RemitError::TransferFailed {
                reason: format!("{to} refuses"),
            })
        }
    }

    #[test]
    fn revert_cuts_log_back_to_entry_length() {
        let mut f = fixture(RemittanceConfig::default());
        let mut wallets = Wallets::new();
        for i in 0u32..300 {
            let c = f
                .contract
                .commit(f.exchange.caller, format!("pw-{i}").as_bytes())
                .unwrap();
            f.contract.open_order(&f.sender, c, FIVE_DAYS, VALUE).unwrap();
        }
        f.contract
            .redeem(&f.exchange, b"pw-0", &mut wallets)
            .unwrap();
        let logged = f.contract.notifications().len();
        assert_eq!(logged, 2 * 300 + 1);

        let err = f
            .contract
            .redeem(&f.exchange, b"pw-1", &mut Refuse)
            .unwrap_err();
        assert!(matches!(err, RemitError::TransferFailed { .. }));
        assert_eq!(f.contract.notifications().len(), logged);
        assert!(matches!(
            f.contract.notifications().last(),
            Some(Notification::Withdrawal { .. })
        ));

        let err = f
            .contract
            .withdraw_fees(&f.admin, &mut Refuse)
            .unwrap_err();
        assert!(matches!(err, RemitError::TransferFailed { .. }));
        assert_eq!(f.contract.notifications().len(), logged);
        assert_eq!(f.contract.fee_balance(f.admin.caller), 300 * FLAT_FEE);
        f.contract.verify_custody().unwrap();
    }
}
