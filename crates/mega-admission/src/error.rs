use alloy_primitives::{Address, U256};

use crate::{Coins, CoinsError};

/// Error type for a rejected admission.
///
/// A transaction rejected by an admission stage is never charged: the stages run on a branch
/// that is dropped on failure. [`AdmissionError::Execution`] is different, as it is reported
/// after admission succeeded and the fee has already been taken.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AdmissionError {
    /// The transaction does not carry fee and gas fields.
    #[error("tx decode error: {0}")]
    MalformedInput(String),

    /// A non-simulated transaction at a live height declares zero gas.
    #[error("invalid gas limit: must provide positive gas (height {height})")]
    InvalidGasLimit {
        /// The block height at which the transaction was checked.
        height: u64,
    },

    /// The declared fee is below the minimum required by the validator's gas prices.
    #[error("insufficient fees; got: {provided} required: {required}")]
    InsufficientFee {
        /// The fee declared by the transaction.
        provided: Coins,
        /// The fee required per accepted denomination.
        required: Coins,
    },

    /// A granter is declared but fee grants are not enabled on this node.
    #[error("fee grants are not enabled")]
    DelegationUnavailable,

    /// The granter's allowance does not authorize the payer to spend the fee.
    #[error("{granter} does not allow to pay fees for {payer}: {reason}")]
    DelegationDenied {
        /// The granter of the allowance.
        granter: Address,
        /// The payer (grantee) of the transaction.
        payer: Address,
        /// The reason reported by the allowance store.
        #[source]
        reason: FeeGrantError,
    },

    /// The fee could not be transferred because the payer's balance is too low.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(#[source] BankError),

    /// The resolved fee is not a well-formed coin set.
    #[error("invalid fee amount: {fee}: {reason}")]
    InvalidFeeAmount {
        /// The offending fee.
        fee: Coins,
        /// Why it is not well-formed.
        #[source]
        reason: CoinsError,
    },

    /// The fee-collection module account does not exist. This is a node configuration defect.
    #[error("fee collector module account ({0}) has not been set")]
    MisconfiguredFeeCollector(String),

    /// A registered validator vetoed the transaction.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    Unauthorized(String),

    /// The message-execution step that follows admission failed. The fee stays charged.
    #[error("message execution failed: {0}")]
    Execution(String),
}

impl AdmissionError {
    /// Returns whether the error points at a misconfigured node rather than at the transaction.
    /// Such errors must be surfaced to the operator instead of being attributed to the submitter.
    pub const fn is_node_defect(&self) -> bool {
        matches!(self, Self::MisconfiguredFeeCollector(_) | Self::DelegationUnavailable)
    }
}

/// Error type for balance transfers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    /// The sender does not hold enough of one denomination.
    #[error("spendable balance {available}{denom} of {address} is smaller than {required}{denom}")]
    InsufficientFunds {
        /// The sender.
        address: Address,
        /// The short denomination.
        denom: String,
        /// The balance held.
        available: U256,
        /// The amount required.
        required: U256,
    },

    /// The destination module account is unknown.
    #[error("module account {0} does not exist")]
    UnknownModuleAccount(String),

    /// The amount is not a well-formed coin set.
    #[error("invalid coins: {0}")]
    InvalidCoins(#[from] CoinsError),
}

/// Error type for fee allowance consumption.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeGrantError {
    /// No allowance exists for the (granter, grantee) pair.
    #[error("fee-grant not found")]
    NotFound,

    /// The allowance has expired.
    #[error("fee allowance expired")]
    Expired,

    /// The fee exceeds the remaining spend limit.
    #[error("fee limit exceeded: {fee} > {remaining}")]
    SpendLimitExceeded {
        /// The fee that was requested.
        fee: Coins,
        /// What is left of the spend limit.
        remaining: Coins,
    },

    /// A message type is not covered by the allowance.
    #[error("message does not exist in allowed messages: {0}")]
    MessageNotAllowed(String),

    /// The allowance store failed for another reason.
    #[error("{0}")]
    Other(String),
}
