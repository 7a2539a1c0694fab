//! Ledger collaborators consumed by the admission pipeline.
//!
//! The pipeline only depends on the traits. [`ModuleAccounts`], [`LedgerBank`] and
//! [`FeeGrantStore`] are the in-process implementations that work directly on the
//! [`LedgerState`](crate::LedgerState) carried by the [`AdmissionContext`].

use core::fmt::Debug;

use alloy_primitives::Address;
use auto_impl::auto_impl;

use crate::{AdmissionContext, BankError, Coins, FeeGrantError, Msg};

mod account;
mod bank;
mod feegrant;

pub use account::*;
pub use bank::*;
pub use feegrant::*;

/// Resolves module account names to addresses.
#[auto_impl(&, Box, Arc)]
pub trait AccountKeeper: Debug + Send + Sync {
    /// The address of the module account `name`, or `None` if no such account is set up.
    fn module_address(&self, name: &str) -> Option<Address>;
}

/// Moves balances between accounts.
#[auto_impl(&, Box, Arc)]
pub trait BankKeeper: Debug + Send + Sync {
    /// Transfers `amount` from `from` to the module account `module`.
    ///
    /// The transfer is all-or-nothing: if any denomination is short, no balance changes.
    fn send_coins_from_account_to_module(
        &self,
        ctx: &mut AdmissionContext<'_>,
        from: Address,
        module: &str,
        amount: &Coins,
    ) -> Result<(), BankError>;
}

/// Consumes fee allowances.
#[auto_impl(&, Box, Arc)]
pub trait FeegrantKeeper: Debug + Send + Sync {
    /// Authorizes `grantee` to spend `fee` from the allowance granted by `granter` for `msgs`,
    /// and consumes that much of the allowance.
    ///
    /// Not idempotent: every successful call decrements the allowance.
    fn use_granted_fees(
        &self,
        ctx: &mut AdmissionContext<'_>,
        granter: Address,
        grantee: Address,
        fee: &Coins,
        msgs: &[Msg],
    ) -> Result<(), FeeGrantError>;
}
