use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::{
    constants::FEE_COLLECTOR_NAME, AccountKeeper, AdmissionContext, AdmissionError, AdmissionEvent,
    AnteDecorator, BankError, BankKeeper, Coins, FeeTx, FeegrantKeeper, MinGasPriceFeeChecker, Tx,
    TxFeeChecker,
};

/// The account charged for a transaction and the amount charged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeePayment {
    /// The debited account: the granter when a fee grant covers the fee, otherwise the payer.
    pub payer: Address,
    /// The resolved fee.
    pub fee: Coins,
}

/// Charges the transaction fee.
///
/// In order:
/// 1. rejects zero gas outside simulation once the chain is past genesis,
/// 2. resolves the fee with the [`TxFeeChecker`] (skipped in simulation, where the declared fee
///    is used as is),
/// 3. rejects a fee that is not a well-formed coin set, even an all-zero one,
/// 4. resolves who pays, consuming a fee grant if one is declared,
/// 5. moves the fee to the fee collector and emits the `tx` event.
#[derive(Clone, Debug)]
pub struct DeductFeeDecorator {
    accounts: Arc<dyn AccountKeeper>,
    bank: Arc<dyn BankKeeper>,
    feegrant: Option<Arc<dyn FeegrantKeeper>>,
    fee_checker: Arc<dyn TxFeeChecker>,
    fee_collector: String,
}

impl DeductFeeDecorator {
    /// Creates a decorator without fee grants, enforcing minimum gas prices on mempool admission.
    pub fn new(accounts: impl AccountKeeper + 'static, bank: impl BankKeeper + 'static) -> Self {
        Self {
            accounts: Arc::new(accounts),
            bank: Arc::new(bank),
            feegrant: None,
            fee_checker: Arc::new(MinGasPriceFeeChecker::new()),
            fee_collector: FEE_COLLECTOR_NAME.to_string(),
        }
    }

    /// Enables fee grants.
    pub fn with_feegrant_keeper(mut self, feegrant: impl FeegrantKeeper + 'static) -> Self {
        self.feegrant = Some(Arc::new(feegrant));
        self
    }

    /// Replaces the fee checker.
    pub fn with_fee_checker(mut self, fee_checker: impl TxFeeChecker + 'static) -> Self {
        self.fee_checker = Arc::new(fee_checker);
        self
    }

    /// Sets the name of the module account receiving fees.
    pub fn with_fee_collector(mut self, fee_collector: impl Into<String>) -> Self {
        self.fee_collector = fee_collector.into();
        self
    }

    /// Resolves the debited account for `fee`, consuming the fee grant when the transaction names
    /// a granter other than its payer.
    pub fn resolve_fee_payer(
        &self,
        ctx: &mut AdmissionContext<'_>,
        tx: &dyn FeeTx,
        fee: &Coins,
    ) -> Result<Address, AdmissionError> {
        let payer = tx.fee_payer();
        let Some(granter) = tx.fee_granter() else {
            return Ok(payer);
        };

        let Some(feegrant) = &self.feegrant else {
            warn!(%granter, %payer, "Fee granter declared but fee grants are not enabled");
            return Err(AdmissionError::DelegationUnavailable);
        };

        if granter != payer {
            feegrant
                .use_granted_fees(ctx, granter, payer, fee, tx.msgs())
                .map_err(|reason| AdmissionError::DelegationDenied { granter, payer, reason })?;
            debug!(%granter, %payer, %fee, "Fee paid from allowance");
        }
        Ok(granter)
    }

    fn check_deduct_fee(
        &self,
        ctx: &mut AdmissionContext<'_>,
        tx: &dyn FeeTx,
        fee: Coins,
    ) -> Result<FeePayment, AdmissionError> {
        if self.accounts.module_address(&self.fee_collector).is_none() {
            warn!(fee_collector = %self.fee_collector, "Fee collector module account is missing");
            return Err(AdmissionError::MisconfiguredFeeCollector(self.fee_collector.clone()));
        }

        fee.validate()
            .map_err(|reason| AdmissionError::InvalidFeeAmount { fee: fee.clone(), reason })?;

        let payer = self.resolve_fee_payer(ctx, tx, &fee)?;

        if !fee.is_zero() {
            deduct_fees(self.bank.as_ref(), ctx, payer, &fee, &self.fee_collector)?;
        }

        ctx.emit(AdmissionEvent { fee: fee.non_zero(), fee_payer: payer });
        Ok(FeePayment { payer, fee })
    }

    /// Runs the whole stage and returns what was charged.
    pub fn deduct(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<FeePayment, AdmissionError> {
        let fee_tx = tx
            .as_fee_tx()
            .ok_or_else(|| AdmissionError::MalformedInput("tx must be a fee tx".into()))?;

        let simulate = ctx.mode().is_simulate();
        if !simulate && ctx.block_height() > 0 && fee_tx.gas() == 0 {
            return Err(AdmissionError::InvalidGasLimit { height: ctx.block_height() });
        }

        let fee = if simulate {
            fee_tx.fee().clone()
        } else {
            self.fee_checker.check_tx_fee(ctx, fee_tx)?
        };

        self.check_deduct_fee(ctx, fee_tx, fee)
    }
}

impl AnteDecorator for DeductFeeDecorator {
    fn ante_handle(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        self.deduct(ctx, tx).map(drop)
    }
}

/// Moves `fees` from `payer` to the module account `module`.
///
/// Fails if `fees` is not a well-formed coin set or the payer cannot cover every denomination.
/// Nothing moves on failure.
pub fn deduct_fees(
    bank: &dyn BankKeeper,
    ctx: &mut AdmissionContext<'_>,
    payer: Address,
    fees: &Coins,
    module: &str,
) -> Result<(), AdmissionError> {
    fees.validate()
        .map_err(|reason| AdmissionError::InvalidFeeAmount { fee: fees.clone(), reason })?;

    bank.send_coins_from_account_to_module(ctx, payer, module, &fees.non_zero()).map_err(|err| match err {
        BankError::UnknownModuleAccount(module) => AdmissionError::MisconfiguredFeeCollector(module),
        err => AdmissionError::InsufficientFunds(err),
    })
}
