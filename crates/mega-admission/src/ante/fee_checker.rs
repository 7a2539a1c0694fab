use core::fmt::Debug;

use auto_impl::auto_impl;
use tracing::trace;

use crate::{AdmissionContext, AdmissionError, Coins, FeeFloorEnforcement, FeeTx};

/// Resolves the fee a transaction pays, rejecting it if the fee is unacceptable.
#[auto_impl(&, Box, Arc)]
pub trait TxFeeChecker: Debug + Send + Sync {
    /// Returns the fee to deduct for `tx`.
    fn check_tx_fee(&self, ctx: &AdmissionContext<'_>, tx: &dyn FeeTx) -> Result<Coins, AdmissionError>;
}

/// The default [`TxFeeChecker`]: enforces the validator's minimum gas prices and otherwise
/// charges the declared fee unchanged.
///
/// A fee is sufficient if for at least one priced denomination it holds a non-zero amount of at
/// least `ceil(price * gas)`. Only one denomination needs to satisfy the floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinGasPriceFeeChecker {
    enforcement: FeeFloorEnforcement,
}

impl MinGasPriceFeeChecker {
    /// Creates a checker that enforces the floor on first-time mempool admission only.
    pub const fn new() -> Self {
        Self { enforcement: FeeFloorEnforcement::CheckOnly }
    }

    /// Sets when the floor is enforced.
    pub const fn with_enforcement(mut self, enforcement: FeeFloorEnforcement) -> Self {
        self.enforcement = enforcement;
        self
    }
}

impl TxFeeChecker for MinGasPriceFeeChecker {
    fn check_tx_fee(&self, ctx: &AdmissionContext<'_>, tx: &dyn FeeTx) -> Result<Coins, AdmissionError> {
        let fee = tx.fee();
        let min_gas_prices = ctx.min_gas_prices();

        if self.enforcement.applies_to(ctx.mode()) && !min_gas_prices.is_zero() {
            let required = min_gas_prices.required_fees(tx.gas());
            if !fee.is_any_gte(&required) {
                return Err(AdmissionError::InsufficientFee { provided: fee.clone(), required });
            }
            trace!(%fee, %required, "Fee meets minimum gas prices");
        }

        Ok(fee.clone())
    }
}

/// A [`TxFeeChecker`] backed by a closure.
#[derive(derive_more::Debug)]
pub struct FnFeeChecker<F> {
    #[debug(ignore)]
    check: F,
}

impl<F> FnFeeChecker<F>
where
    F: Fn(&AdmissionContext<'_>, &dyn FeeTx) -> Result<Coins, AdmissionError> + Send + Sync,
{
    /// Wraps `check`.
    pub const fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> TxFeeChecker for FnFeeChecker<F>
where
    F: Fn(&AdmissionContext<'_>, &dyn FeeTx) -> Result<Coins, AdmissionError> + Send + Sync,
{
    fn check_tx_fee(&self, ctx: &AdmissionContext<'_>, tx: &dyn FeeTx) -> Result<Coins, AdmissionError> {
        (self.check)(ctx, tx)
    }
}
