//! The admission pipeline: an ordered chain of stages run against a transaction before its
//! messages execute.

use core::fmt::Debug;

use auto_impl::auto_impl;
use tracing::{debug, trace};

use crate::{AdmissionContext, AdmissionError, LedgerState, StateCache, Tx};

mod fee;
mod fee_checker;
mod validator;

pub use fee::*;
pub use fee_checker::*;
pub use validator::*;

/// One stage of the admission pipeline.
#[auto_impl(&, Box, Arc)]
pub trait AnteDecorator: Debug + Send + Sync {
    /// Checks `tx` and applies the stage's effects to `ctx`. An error rejects the transaction.
    fn ante_handle(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError>;
}

/// Runs admission stages in order and then hands the transaction to the execution step.
///
/// The stages run on a branch of the ledger state. If any stage fails the branch is dropped and
/// nothing is charged. Once every stage succeeds the admission is final for the transaction:
/// its events are delivered to the parent context in every mode, and in
/// [`ExecMode::Finalize`](crate::ExecMode::Finalize) its state changes are committed before the
/// execution step runs. Execution gets a nested branch of its own, committed only if it succeeds,
/// so a transaction whose messages fail still pays its fee.
#[derive(Debug, Default)]
pub struct AdmissionPipeline {
    decorators: Vec<Box<dyn AnteDecorator>>,
}

impl AdmissionPipeline {
    /// The standard pipeline: the validator set, then fee deduction.
    pub fn new(validators: TxValidatorSet, deduct_fee: DeductFeeDecorator) -> Self {
        Self::default().with_decorator(validators).with_decorator(deduct_fee)
    }

    /// Appends a stage.
    pub fn with_decorator(mut self, decorator: impl AnteDecorator + 'static) -> Self {
        self.decorators.push(Box::new(decorator));
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    /// Whether no stage is registered.
    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Admits `tx` and runs `execute` on the admitted state.
    ///
    /// Returns the first error from a stage or from `execute`. A stage error leaves `ctx`
    /// untouched. An `execute` error only discards what `execute` itself wrote and emitted.
    pub fn run<T, E, F>(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx, execute: F) -> Result<T, E>
    where
        E: From<AdmissionError>,
        F: FnOnce(&mut AdmissionContext<'_>, &dyn Tx) -> Result<T, E>,
    {
        let mode = ctx.mode();
        let (admitted, mut events) = {
            let mut cache = StateCache::new(ctx.state());
            let mut branch = ctx.branch(&mut cache);
            let admitted = self.ante_handle_all(&mut branch, tx);
            let events = branch.into_events();
            (admitted.map(|()| cache.into_changes()), events)
        };
        let admitted = match admitted {
            Ok(changes) => changes,
            Err(err) => {
                debug!(?mode, %err, "Transaction rejected");
                return Err(err.into());
            }
        };
        events.flush_into(ctx.events_mut());

        // Outside finalize the admission writes only exist underneath the execution branch.
        let pending = if mode.persists_writes() {
            trace!(
                balances = admitted.balances.len(),
                allowances = admitted.allowances.len(),
                "Committing admission"
            );
            ctx.state_mut().commit(admitted);
            None
        } else {
            Some(admitted)
        };

        let (result, mut events, changes) = {
            let mut cache = StateCache::new(ctx.state());
            if let Some(admitted) = pending {
                cache.commit(admitted);
            }
            let mut branch = ctx.branch(&mut cache);
            let result = execute(&mut branch, tx);
            let events = branch.into_events();
            (result, events, cache.into_changes())
        };

        if result.is_ok() {
            if mode.persists_writes() {
                ctx.state_mut().commit(changes);
            }
            events.flush_into(ctx.events_mut());
        }
        result
    }

    /// Runs only the admission stages, with no execution step.
    pub fn admit(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        self.run(ctx, tx, |_, _| Ok(()))
    }

    fn ante_handle_all(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        for decorator in &self.decorators {
            decorator.ante_handle(ctx, tx)?;
        }
        Ok(())
    }
}

/// A nested pipeline runs its stages directly on the enclosing branch.
impl AnteDecorator for AdmissionPipeline {
    fn ante_handle(&self, ctx: &mut AdmissionContext<'_>, tx: &dyn Tx) -> Result<(), AdmissionError> {
        self.ante_handle_all(ctx, tx)
    }
}
