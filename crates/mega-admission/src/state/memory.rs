use alloy_primitives::{map::HashMap, Address, U256};

use crate::{Allowance, Coin, Coins, LedgerState};

/// An in-memory ledger. Used as the authoritative state in tests and by embedders that keep the
/// ledger in process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    balances: HashMap<(Address, String), U256>,
    allowances: HashMap<(Address, Address), Allowance>,
}

impl MemoryLedger {
    /// Adds `coins` to the balances of `address`.
    pub fn fund(&mut self, address: Address, coins: &Coins) {
        for coin in coins {
            let balance = self.balance(address, &coin.denom).saturating_add(coin.amount);
            self.set_balance(address, &coin.denom, balance);
        }
    }

    /// Adds `coins` to the balances of `address`.
    pub fn with_funds(mut self, address: Address, coins: &Coins) -> Self {
        self.fund(address, coins);
        self
    }

    /// Stores an allowance from `granter` to `grantee`.
    pub fn with_allowance(
        mut self,
        granter: Address,
        grantee: Address,
        allowance: impl Into<Allowance>,
    ) -> Self {
        self.set_allowance(granter, grantee, Some(allowance.into()));
        self
    }

    /// All non-zero balances of `address`, sorted by denomination.
    pub fn balances(&self, address: Address) -> Coins {
        let mut coins: Vec<Coin> = self
            .balances
            .iter()
            .filter(|((owner, _), _)| *owner == address)
            .map(|((_, denom), amount)| Coin::new(denom.clone(), *amount))
            .collect();
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        Coins::from_raw(coins)
    }
}

impl LedgerState for MemoryLedger {
    fn balance(&self, address: Address, denom: &str) -> U256 {
        self.balances.get(&(address, denom.to_string())).copied().unwrap_or_default()
    }

    fn set_balance(&mut self, address: Address, denom: &str, amount: U256) {
        if amount.is_zero() {
            self.balances.remove(&(address, denom.to_string()));
        } else {
            self.balances.insert((address, denom.to_string()), amount);
        }
    }

    fn allowance(&self, granter: Address, grantee: Address) -> Option<Allowance> {
        self.allowances.get(&(granter, grantee)).cloned()
    }

    fn set_allowance(&mut self, granter: Address, grantee: Address, allowance: Option<Allowance>) {
        match allowance {
            Some(allowance) => {
                self.allowances.insert((granter, grantee), allowance);
            }
            None => {
                self.allowances.remove(&(granter, grantee));
            }
        }
    }
}
