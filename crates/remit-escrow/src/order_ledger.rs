//! Order ledger: commitment-keyed escrow slots.
//!
//! The ledger is the central state machine of the escrow and the only
//! writer into the [`FeeLedger`]. Every operation either succeeds fully or
//! leaves both ledgers untouched.
//!
//! Settling an order (cancel or redeem) empties its slot and hands the
//! order back to the caller, which pays out only afterwards. A second
//! settlement attempt, re-entrant or not, finds the slot empty.

use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use remit_types::{
    Address, Amount, Commitment, HeldFee, Order, OrderSlot, RefundPolicy, RemitError,
    RemittanceConfig, Result, checked_add, checked_sub,
};

use crate::fee_ledger::FeeLedger;

static EMPTY_SLOT: OrderSlot = OrderSlot::Empty;

/// Parameters of a new order.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub emitter: Address,
    pub commitment: Commitment,
    /// Exchange declared up front, if any.
    pub beneficiary: Option<Address>,
    /// Value attached to the call.
    pub value: Amount,
    /// Time from `now` until the emitter may cancel.
    pub duration: Duration,
    pub now: DateTime<Utc>,
}

/// What opening an order did to the books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenedOrder {
    /// Amount escrowed under the commitment.
    pub net: Amount,
    /// Fee credited to the administrator right now (zero if held or disabled).
    pub fee_charged: Amount,
    pub deadline: DateTime<Utc>,
}

/// A redeemed order and the fee it released, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemedOrder {
    pub order: Order,
    pub fee_released: Option<HeldFee>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    slots: HashMap<Commitment, OrderSlot>,
}

impl OrderLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Escrow a new order under `request.commitment`.
    ///
    /// With fees enabled the flat fee comes off the attached value. Under
    /// [`RefundPolicy::Net`] it is credited to `administrator` immediately;
    /// under [`RefundPolicy::Gross`] it stays with the order until redeem.
    ///
    /// # Errors
    /// - `InvalidCommitment` for an all-zero commitment
    /// - `InvalidBeneficiary` if a declared beneficiary is the zero address
    /// - `ZeroValue` if no value is attached
    /// - `DuplicateCommitment` if the slot is occupied
    /// - `InsufficientValue` if the value does not exceed the fee
    /// - `ArithmeticOverflow` if the deadline or fee balance overflows
    pub fn open(
        &mut self,
        fees: &mut FeeLedger,
        config: &RemittanceConfig,
        administrator: Address,
        request: OpenRequest,
    ) -> Result<OpenedOrder> {
        let OpenRequest {
            emitter,
            commitment,
            beneficiary,
            value,
            duration,
            now,
        } = request;

        if commitment.is_zero() {
            return Err(RemitError::InvalidCommitment);
        }
        if beneficiary.is_some_and(|b| b.is_zero()) {
            return Err(RemitError::InvalidBeneficiary);
        }
        if value == 0 {
            return Err(RemitError::ZeroValue);
        }
        if self.is_active(&commitment) {
            return Err(RemitError::DuplicateCommitment(commitment));
        }

        let fee = config.effective_fee();
        if fee > 0 && value <= fee {
            return Err(RemitError::InsufficientValue { value, fee });
        }
        let net = checked_sub(value, fee)?;
        let deadline = deadline_after(now, duration)?;

        let (fee_charged, held_fee) = match (fee, config.refund_policy) {
            (0, _) => (0, None),
            (fee, RefundPolicy::Net) => (fee, None),
            (fee, RefundPolicy::Gross) => (
                0,
                Some(HeldFee {
                    recipient: administrator,
                    amount: fee,
                }),
            ),
        };

        // Last fallible step: nothing has been written before this.
        if fee_charged > 0 {
            fees.accrue(administrator, fee_charged)?;
        }

        self.slots.insert(
            commitment,
            OrderSlot::Active(Order {
                emitter,
                amount: net,
                deadline,
                beneficiary,
                held_fee,
            }),
        );

        tracing::debug!(
            commitment = %commitment.short(),
            emitter = %emitter,
            net,
            fee,
            %deadline,
            "Order slot filled"
        );

        Ok(OpenedOrder {
            net,
            fee_charged,
            deadline,
        })
    }

    /// Empty the slot of an expired order on behalf of its emitter.
    ///
    /// # Errors
    /// - `NoSuchOrder` if the slot is empty
    /// - `NotEmitter` if `caller` did not open the order
    /// - `DeadlineNotReached` if `now` is before the deadline
    pub fn take_for_cancel(
        &mut self,
        commitment: Commitment,
        caller: Address,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        let order = self
            .get(&commitment)
            .ok_or(RemitError::NoSuchOrder(commitment))?;

        if order.emitter != caller {
            return Err(RemitError::NotEmitter);
        }
        if !order.is_cancellable_at(now) {
            return Err(RemitError::DeadlineNotReached {
                deadline: order.deadline,
            });
        }

        self.take(commitment)
    }

    /// Empty the slot for a redeem, releasing any held fee into `fees`.
    ///
    /// # Errors
    /// - `NoSuchOrder` if the slot is empty
    /// - `ArithmeticOverflow` if crediting the held fee overflows
    pub fn take_for_redeem(
        &mut self,
        fees: &mut FeeLedger,
        commitment: Commitment,
    ) -> Result<RedeemedOrder> {
        let fee_released = self
            .get(&commitment)
            .ok_or(RemitError::NoSuchOrder(commitment))?
            .held_fee;

        if let Some(fee) = fee_released {
            fees.accrue(fee.recipient, fee.amount)?;
        }

        let order = self.take(commitment)?;
        Ok(RedeemedOrder {
            order,
            fee_released,
        })
    }

    /// Remove the slot entirely. A missing key reads as `Empty`, so the
    /// map only ever holds live orders.
    fn take(&mut self, commitment: Commitment) -> Result<Order> {
        match self.slots.remove(&commitment) {
            Some(OrderSlot::Active(order)) => Ok(order),
            Some(OrderSlot::Empty) | None => Err(RemitError::NoSuchOrder(commitment)),
        }
    }

    /// The active order under `commitment`, if any.
    #[must_use]
    pub fn get(&self, commitment: &Commitment) -> Option<&Order> {
        self.slot(commitment).as_active()
    }

    /// The slot under `commitment`; unused and settled commitments read as empty.
    #[must_use]
    pub fn slot(&self, commitment: &Commitment) -> &OrderSlot {
        self.slots.get(commitment).unwrap_or(&EMPTY_SLOT)
    }

    #[must_use]
    pub fn is_active(&self, commitment: &Commitment) -> bool {
        self.slot(commitment).is_active()
    }

    /// Number of active orders.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_active()).count()
    }

    /// Value escrowed across all active orders, held fees included.
    pub fn total_escrowed(&self) -> Result<Amount> {
        self.slots
            .values()
            .filter_map(OrderSlot::as_active)
            .try_fold(0, |acc, order| checked_add(acc, order.gross_amount()?))
    }

    /// Drop every slot. Only used when the contract is terminated.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

fn deadline_after(now: DateTime<Utc>, duration: Duration) -> Result<DateTime<Utc>> {
    let delta = TimeDelta::from_std(duration).map_err(|_| RemitError::ArithmeticOverflow)?;
    now.checked_add_signed(delta)
        .ok_or(RemitError::ArithmeticOverflow)
}
