//! The transaction surface consumed by the admission pipeline.
//!
//! Decoding and signing happen elsewhere. The pipeline only needs to see the messages, the
//! required signers and, for fee-bearing transactions, the fee fields exposed by [`FeeTx`].

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

use crate::Coins;

/// A message carried by a transaction, identified by its type url.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Msg {
    /// Fully-qualified message type, e.g. `/bank.v1.MsgSend`.
    pub type_url: String,
    /// Opaque encoded message body.
    pub payload: Bytes,
}

impl Msg {
    /// Creates a message with an empty payload.
    pub fn new(type_url: impl Into<String>) -> Self {
        Self { type_url: type_url.into(), payload: Bytes::new() }
    }

    /// Sets the payload.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }
}

/// A decoded transaction.
pub trait Tx {
    /// The messages, in execution order.
    fn msgs(&self) -> &[Msg];

    /// The addresses that must sign the transaction.
    fn signers(&self) -> &[Address];

    /// The fee view of this transaction, or `None` if it does not carry fee and gas fields.
    fn as_fee_tx(&self) -> Option<&dyn FeeTx>;
}

/// A transaction that declares a fee and a gas limit.
pub trait FeeTx: Tx {
    /// The declared fee.
    fn fee(&self) -> &Coins;

    /// The declared gas limit.
    fn gas(&self) -> u64;

    /// The account that pays the fee unless a granter covers it.
    fn fee_payer(&self) -> Address;

    /// The account that grants the fee allowance, if any.
    fn fee_granter(&self) -> Option<Address>;
}

/// The concrete transaction type used by the node.
///
/// Immutable once built; use [`Transaction::builder`] to assemble one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    msgs: Vec<Msg>,
    fee: Coins,
    gas: u64,
    payer: Address,
    granter: Option<Address>,
    signers: Vec<Address>,
}

impl Transaction {
    /// Starts building a transaction.
    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::default()
    }
}

impl Tx for Transaction {
    fn msgs(&self) -> &[Msg] {
        &self.msgs
    }

    fn signers(&self) -> &[Address] {
        &self.signers
    }

    fn as_fee_tx(&self) -> Option<&dyn FeeTx> {
        Some(self)
    }
}

impl FeeTx for Transaction {
    fn fee(&self) -> &Coins {
        &self.fee
    }

    fn gas(&self) -> u64 {
        self.gas
    }

    fn fee_payer(&self) -> Address {
        self.payer
    }

    fn fee_granter(&self) -> Option<Address> {
        self.granter
    }
}

/// Builder for [`Transaction`].
#[derive(Clone, Debug, Default)]
pub struct TransactionBuilder {
    msgs: Vec<Msg>,
    fee: Coins,
    gas: u64,
    payer: Option<Address>,
    granter: Option<Address>,
    signers: Vec<Address>,
}

impl TransactionBuilder {
    /// Appends a message.
    pub fn msg(mut self, msg: Msg) -> Self {
        self.msgs.push(msg);
        self
    }

    /// Sets the declared fee.
    pub fn fee(mut self, fee: Coins) -> Self {
        self.fee = fee;
        self
    }

    /// Sets the gas limit.
    pub const fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Sets the fee payer explicitly.
    pub const fn payer(mut self, payer: Address) -> Self {
        self.payer = Some(payer);
        self
    }

    /// Sets the fee granter.
    pub const fn granter(mut self, granter: Address) -> Self {
        self.granter = Some(granter);
        self
    }

    /// Appends a required signer.
    pub fn signer(mut self, signer: Address) -> Self {
        self.signers.push(signer);
        self
    }

    /// Builds the transaction. Without an explicit payer the first signer pays, or the zero
    /// address if there are no signers either.
    pub fn build(self) -> Transaction {
        let payer = self.payer.or_else(|| self.signers.first().copied()).unwrap_or_default();
        Transaction {
            msgs: self.msgs,
            fee: self.fee,
            gas: self.gas,
            payer,
            granter: self.granter,
            signers: self.signers,
        }
    }
}
