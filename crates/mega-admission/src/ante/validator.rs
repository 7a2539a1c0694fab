use core::fmt::Debug;
use std::sync::Arc;

use auto_impl::auto_impl;

use crate::{AdmissionContext, AdmissionError, AnteDecorator, Tx};

/// A registered transaction check. Returns an error to veto the transaction.
pub type TxValidator =
    Box<dyn Fn(&mut AdmissionContext<'_>, &dyn Tx) -> Result<(), AdmissionError> + Send + Sync>;

/// Verifies transaction signatures.
#[auto_impl(&, Box, Arc)]
pub trait SignatureVerifier: Debug + Send + Sync {
    /// Verifies every signature required by `tx`.
    fn verify_signatures(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError>;
}

/// An ordered list of validators followed by signature verification.
///
/// Validators run in registration order and the first failure stops the set, so later validators
/// and signature verification never see a vetoed transaction. Signature verification always runs
/// last and cannot be reordered or removed.
#[derive(derive_more::Debug)]
pub struct TxValidatorSet {
    #[debug(ignore)]
    validators: Vec<TxValidator>,
    sig_verifier: Arc<dyn SignatureVerifier>,
}

impl TxValidatorSet {
    /// Creates a set with no validators, finishing with `sig_verifier`.
    pub fn new(sig_verifier: impl SignatureVerifier + 'static) -> Self {
        Self { validators: Vec::new(), sig_verifier: Arc::new(sig_verifier) }
    }

    /// Appends `validator`.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&mut AdmissionContext<'_>, &dyn Tx) -> Result<(), AdmissionError> + Send + Sync + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// Number of registered validators, not counting signature verification.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether no validator is registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Runs every validator and then signature verification.
    pub fn validate(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        for validator in &self.validators {
            validator(ctx, tx)?;
        }
        self.sig_verifier.verify_signatures(ctx, tx)
    }
}

impl AnteDecorator for TxValidatorSet {
    fn ante_handle(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        self.validate(ctx, tx)
    }
}

/// Stock validators.
pub mod validators {
    use crate::{AdmissionContext, AdmissionError, Tx};

    /// Rejects transactions that carry no messages.
    pub fn non_empty_messages(_ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        if tx.msgs().is_empty() {
            return Err(AdmissionError::InvalidTransaction("must contain at least one message".into()));
        }
        Ok(())
    }

    /// Rejects transactions that declare no signers.
    pub fn has_signers(_ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        if tx.signers().is_empty() {
            return Err(AdmissionError::InvalidTransaction("no signers".into()));
        }
        Ok(())
    }

    /// Rejects fee-bearing transactions whose fee payer is not among the signers.
    pub fn fee_payer_signed(_ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        let Some(fee_tx) = tx.as_fee_tx() else {
            return Ok(());
        };
        let payer = fee_tx.fee_payer();
        if !tx.signers().contains(&payer) {
            return Err(AdmissionError::InvalidTransaction(format!(
                "fee payer {payer} is not a signer"
            )));
        }
        Ok(())
    }
}
