//! Ledger state seen by the admission pipeline.
//!
//! The storage engine is not part of this crate. The pipeline reads and writes through
//! [`LedgerState`], and every admission pass works on a [`StateCache`] branch whose buffered
//! [`LedgerChanges`] are either committed to the parent or dropped.

use alloy_primitives::{map::HashMap, Address, U256};
use auto_impl::auto_impl;

use crate::Allowance;

mod cache;
mod memory;

pub use cache::*;
pub use memory::*;

/// Read/write access to balances and fee allowances.
#[auto_impl(&mut, Box)]
pub trait LedgerState {
    /// The balance of `address` in `denom`.
    fn balance(&self, address: Address, denom: &str) -> U256;

    /// Overwrites the balance of `address` in `denom`.
    fn set_balance(&mut self, address: Address, denom: &str, amount: U256);

    /// The allowance granted by `granter` to `grantee`, if any.
    fn allowance(&self, granter: Address, grantee: Address) -> Option<Allowance>;

    /// Stores or, with `None`, removes the allowance granted by `granter` to `grantee`.
    fn set_allowance(&mut self, granter: Address, grantee: Address, allowance: Option<Allowance>);

    /// Applies a set of buffered writes.
    fn commit(&mut self, changes: LedgerChanges) {
        for ((address, denom), amount) in changes.balances {
            self.set_balance(address, &denom, amount);
        }
        for ((granter, grantee), allowance) in changes.allowances {
            self.set_allowance(granter, grantee, allowance);
        }
    }
}

/// Writes buffered by a [`StateCache`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerChanges {
    /// Balances written, keyed by (address, denom).
    pub balances: HashMap<(Address, String), U256>,
    /// Allowances written, keyed by (granter, grantee). `None` marks a removal.
    pub allowances: HashMap<(Address, Address), Option<Allowance>>,
}

impl LedgerChanges {
    /// Returns whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty() && self.allowances.is_empty()
    }
}
