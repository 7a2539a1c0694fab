use alloy_primitives::{Address, U256};

use crate::{Allowance, LedgerChanges, LedgerState};

/// A disposable branch over a parent state.
///
/// Reads fall through to the parent unless the branch has written the key. Writes never reach the
/// parent; the caller decides whether to [`commit`](LedgerState::commit) the result of
/// [`StateCache::into_changes`] or to drop it.
pub struct StateCache<'a> {
    parent: &'a dyn LedgerState,
    changes: LedgerChanges,
}

impl core::fmt::Debug for StateCache<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateCache").field("changes", &self.changes).finish_non_exhaustive()
    }
}

impl<'a> StateCache<'a> {
    /// Creates an empty branch over `parent`.
    pub fn new(parent: &'a dyn LedgerState) -> Self {
        Self { parent, changes: LedgerChanges::default() }
    }

    /// The writes buffered so far.
    pub const fn changes(&self) -> &LedgerChanges {
        &self.changes
    }

    /// Consumes the branch and returns its buffered writes.
    pub fn into_changes(self) -> LedgerChanges {
        self.changes
    }
}

impl LedgerState for StateCache<'_> {
    fn balance(&self, address: Address, denom: &str) -> U256 {
        match self.changes.balances.get(&(address, denom.to_string())) {
            Some(amount) => *amount,
            None => self.parent.balance(address, denom),
        }
    }

    fn set_balance(&mut self, address: Address, denom: &str, amount: U256) {
        self.changes.balances.insert((address, denom.to_string()), amount);
    }

    fn allowance(&self, granter: Address, grantee: Address) -> Option<Allowance> {
        match self.changes.allowances.get(&(granter, grantee)) {
            Some(allowance) => allowance.clone(),
            None => self.parent.allowance(granter, grantee),
        }
    }

    fn set_allowance(&mut self, granter: Address, grantee: Address, allowance: Option<Allowance>) {
        self.changes.allowances.insert((granter, grantee), allowance);
    }

    fn commit(&mut self, changes: LedgerChanges) {
        self.changes.balances.extend(changes.balances);
        self.changes.allowances.extend(changes.allowances);
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::{BasicAllowance, MemoryLedger};

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
    const BOB: Address = address!("0000000000000000000000000000000000000b0b");

    #[test]
    fn test_reads_fall_through_and_writes_stay_local() {
        let mut parent = MemoryLedger::default();
        parent.set_balance(ALICE, "atom", U256::from(100));

        let mut cache = StateCache::new(&parent);
        assert_eq!(cache.balance(ALICE, "atom"), U256::from(100));

        cache.set_balance(ALICE, "atom", U256::from(40));
        cache.set_allowance(ALICE, BOB, Some(BasicAllowance::default().into()));
        assert_eq!(cache.balance(ALICE, "atom"), U256::from(40));
        assert!(cache.allowance(ALICE, BOB).is_some());

        let changes = cache.into_changes();
        assert_eq!(parent.balance(ALICE, "atom"), U256::from(100));
        assert!(parent.allowance(ALICE, BOB).is_none());

        parent.commit(changes);
        assert_eq!(parent.balance(ALICE, "atom"), U256::from(40));
        assert!(parent.allowance(ALICE, BOB).is_some());
    }

    #[test]
    fn test_removal_shadows_parent() {
        let mut parent = MemoryLedger::default();
        parent.set_allowance(ALICE, BOB, Some(BasicAllowance::default().into()));

        let mut cache = StateCache::new(&parent);
        cache.set_allowance(ALICE, BOB, None);
        assert!(cache.allowance(ALICE, BOB).is_none());
        assert!(parent.allowance(ALICE, BOB).is_some());
    }

    #[test]
    fn test_nested_branch_commits_into_outer_branch() {
        let parent = MemoryLedger::default();
        let mut outer = StateCache::new(&parent);
        let inner_changes = {
            let mut inner = StateCache::new(&outer);
            inner.set_balance(BOB, "stake", U256::from(7));
            inner.into_changes()
        };
        outer.commit(inner_changes);
        assert_eq!(outer.balance(BOB, "stake"), U256::from(7));
        assert_eq!(parent.balance(BOB, "stake"), U256::ZERO);
    }
}
