use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use alloy_primitives::Address;

use crate::{
    AdmissionContext, AdmissionError, BankError, BankKeeper, Coins, FeeGrantError, FeegrantKeeper,
    Msg, SignatureVerifier, Tx,
};

/// Wraps a [`FeegrantKeeper`] and counts the calls made to it.
#[derive(Debug, Default, derive_more::Deref)]
pub struct CountingFeegrantKeeper<K> {
    #[deref]
    inner: K,
    calls: AtomicUsize,
}

impl<K> CountingFeegrantKeeper<K> {
    /// Wraps `inner`.
    pub const fn new(inner: K) -> Self {
        Self { inner, calls: AtomicUsize::new(0) }
    }

    /// Number of `use_granted_fees` calls so far, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<K: FeegrantKeeper> FeegrantKeeper for CountingFeegrantKeeper<K> {
    fn use_granted_fees(
        &self,
        ctx: &mut AdmissionContext<'_>,
        granter: Address,
        grantee: Address,
        fee: &Coins,
        msgs: &[Msg],
    ) -> Result<(), FeeGrantError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.use_granted_fees(ctx, granter, grantee, fee, msgs)
    }
}

/// Wraps a [`BankKeeper`] and counts the transfers requested from it.
#[derive(Debug, Default, derive_more::Deref)]
pub struct CountingBank<B> {
    #[deref]
    inner: B,
    transfers: AtomicUsize,
}

impl<B> CountingBank<B> {
    /// Wraps `inner`.
    pub const fn new(inner: B) -> Self {
        Self { inner, transfers: AtomicUsize::new(0) }
    }

    /// Number of transfers requested so far, successful or not.
    pub fn transfers(&self) -> usize {
        self.transfers.load(Ordering::SeqCst)
    }
}

impl<B: BankKeeper> BankKeeper for CountingBank<B> {
    fn send_coins_from_account_to_module(
        &self,
        ctx: &mut AdmissionContext<'_>,
        from: Address,
        module: &str,
        amount: &Coins,
    ) -> Result<(), BankError> {
        self.transfers.fetch_add(1, Ordering::SeqCst);
        self.inner.send_coins_from_account_to_module(ctx, from, module, amount)
    }
}

/// A [`SignatureVerifier`] that accepts every transaction and counts how often it ran.
#[derive(Debug, Default)]
pub struct AcceptAllSignatures {
    calls: AtomicUsize,
}

impl AcceptAllSignatures {
    /// Number of transactions verified so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SignatureVerifier for AcceptAllSignatures {
    fn verify_signatures(&self, _ctx: &mut AdmissionContext<'_>, _tx: &dyn Tx) -> Result<(), AdmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A [`SignatureVerifier`] that rejects every transaction.
#[derive(Debug, Default)]
pub struct RejectAllSignatures;

impl SignatureVerifier for RejectAllSignatures {
    fn verify_signatures(&self, _ctx: &mut AdmissionContext<'_>, _tx: &dyn Tx) -> Result<(), AdmissionError> {
        Err(AdmissionError::Unauthorized("invalid signature".into()))
    }
}

/// A shared, ordered log of named steps, for asserting which validators ran.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    /// The names recorded so far.
    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    /// A validator that records `name` and then returns `result`.
    pub fn validator(
        &self,
        name: &'static str,
        result: Result<(), AdmissionError>,
    ) -> impl Fn(&mut AdmissionContext<'_>, &dyn Tx) -> Result<(), AdmissionError> + Send + Sync + 'static {
        let log = self.clone();
        move |_: &mut AdmissionContext<'_>, _: &dyn Tx| {
            log.0.lock().unwrap().push(name);
            result.clone()
        }
    }
}
