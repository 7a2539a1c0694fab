use std::sync::Arc;

use alloy_primitives::{address, Address, U256};

use super::keepers::{AcceptAllSignatures, CountingBank, CountingFeegrantKeeper};
use crate::{
    constants::FEE_COLLECTOR_NAME, module_address, validators, AdmissionPipeline, Allowance, Coins,
    DecCoins, DeductFeeDecorator, FeeGrantStore, LedgerBank, LedgerState, MemoryLedger,
    ModuleAccounts, Msg, Transaction, TxValidatorSet,
};

/// Test account that usually pays.
pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
/// Test account that usually grants.
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");
/// Test account without funds or grants.
pub const CAROL: Address = address!("00000000000000000000000000000000000ca201");

/// Message type used by the transactions built in tests.
pub const MSG_SEND: &str = "/bank.v1.MsgSend";

/// Installs a `tracing` subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parses a coin list such as `"10atom,5stake"`.
pub fn coins(s: &str) -> Coins {
    s.parse().unwrap()
}

/// Parses a decimal coin list such as `"0.1atom,0.2stake"`.
pub fn dec_coins(s: &str) -> DecCoins {
    s.parse().unwrap()
}

/// A single-message transaction signed and paid by `payer`.
pub fn send_tx(payer: Address, fee: &str, gas: u64) -> Transaction {
    Transaction::builder().msg(Msg::new(MSG_SEND)).signer(payer).fee(coins(fee)).gas(gas).build()
}

/// A single-message transaction signed by `payer` whose fee is covered by `granter`.
pub fn granted_send_tx(payer: Address, granter: Address, fee: &str, gas: u64) -> Transaction {
    Transaction::builder()
        .msg(Msg::new(MSG_SEND))
        .signer(payer)
        .granter(granter)
        .fee(coins(fee))
        .gas(gas)
        .build()
}

/// The bank used by [`TestNode`].
pub type TestBank = CountingBank<LedgerBank<Arc<ModuleAccounts>>>;

/// An in-memory node: a ledger plus counting collaborators wired for the standard pipeline.
#[derive(Debug)]
pub struct TestNode {
    /// The committed ledger.
    pub ledger: MemoryLedger,
    /// Module accounts; only the fee collector is registered.
    pub accounts: Arc<ModuleAccounts>,
    /// Bank over `accounts`, counting transfers.
    pub bank: Arc<TestBank>,
    /// Fee grant store, counting allowance lookups.
    pub feegrants: Arc<CountingFeegrantKeeper<FeeGrantStore>>,
    /// Signature verifier accepting everything.
    pub signatures: Arc<AcceptAllSignatures>,
}

impl Default for TestNode {
    fn default() -> Self {
        let accounts = Arc::new(ModuleAccounts::default().with_module(FEE_COLLECTOR_NAME));
        Self {
            ledger: MemoryLedger::default(),
            bank: Arc::new(CountingBank::new(LedgerBank::new(accounts.clone()))),
            accounts,
            feegrants: Arc::new(CountingFeegrantKeeper::new(FeeGrantStore)),
            signatures: Arc::new(AcceptAllSignatures::default()),
        }
    }
}

impl TestNode {
    /// Credits `amount` to `address`.
    pub fn with_funds(mut self, address: Address, amount: &str) -> Self {
        self.ledger.fund(address, &coins(amount));
        self
    }

    /// Stores an allowance from `granter` to `grantee`.
    pub fn with_allowance(
        mut self,
        granter: Address,
        grantee: Address,
        allowance: impl Into<Allowance>,
    ) -> Self {
        self.ledger = self.ledger.with_allowance(granter, grantee, allowance);
        self
    }

    /// The fee deduction stage with fee grants enabled.
    pub fn deduct_fee_decorator(&self) -> DeductFeeDecorator {
        DeductFeeDecorator::new(self.accounts.clone(), self.bank.clone())
            .with_feegrant_keeper(self.feegrants.clone())
    }

    /// A validator set finishing with the accept-all signature verifier.
    pub fn validators(&self) -> TxValidatorSet {
        TxValidatorSet::new(self.signatures.clone())
    }

    /// The standard pipeline with the stock validators.
    pub fn pipeline(&self) -> AdmissionPipeline {
        let set = self
            .validators()
            .with_validator(validators::non_empty_messages)
            .with_validator(validators::fee_payer_signed);
        AdmissionPipeline::new(set, self.deduct_fee_decorator())
    }

    /// The address of the fee collector module account.
    pub fn fee_collector(&self) -> Address {
        module_address(FEE_COLLECTOR_NAME)
    }

    /// The committed balance of `address` in `denom`.
    pub fn balance(&self, address: Address, denom: &str) -> U256 {
        self.ledger.balance(address, denom)
    }
}
