use alloy_primitives::Address;
use tracing::trace;

use crate::{AccountKeeper, AdmissionContext, BankError, BankKeeper, Coins};

/// A [`BankKeeper`] that keeps balances in the context's [`LedgerState`](crate::LedgerState).
#[derive(Clone, Debug)]
pub struct LedgerBank<AK> {
    accounts: AK,
}

impl<AK: AccountKeeper> LedgerBank<AK> {
    /// Creates a bank that resolves module accounts through `accounts`.
    pub const fn new(accounts: AK) -> Self {
        Self { accounts }
    }

    /// Transfers `amount` from `from` to `to`, all-or-nothing.
    pub fn send_coins(
        &self,
        ctx: &mut AdmissionContext<'_>,
        from: Address,
        to: Address,
        amount: &Coins,
    ) -> Result<(), BankError> {
        amount.validate()?;

        // Check every denomination before touching any balance.
        for coin in amount {
            let available = ctx.state().balance(from, &coin.denom);
            if available < coin.amount {
                return Err(BankError::InsufficientFunds {
                    address: from,
                    denom: coin.denom.clone(),
                    available,
                    required: coin.amount,
                });
            }
        }

        let state = ctx.state_mut();
        for coin in amount.iter().filter(|coin| !coin.is_zero()) {
            let sender = state.balance(from, &coin.denom);
            state.set_balance(from, &coin.denom, sender - coin.amount);
            let recipient = state.balance(to, &coin.denom);
            state.set_balance(to, &coin.denom, recipient.saturating_add(coin.amount));
        }
        trace!(%from, %to, %amount, "Transferred coins");
        Ok(())
    }
}

impl<AK: AccountKeeper> BankKeeper for LedgerBank<AK> {
    fn send_coins_from_account_to_module(
        &self,
        ctx: &mut AdmissionContext<'_>,
        from: Address,
        module: &str,
        amount: &Coins,
    ) -> Result<(), BankError> {
        let to = self
            .accounts
            .module_address(module)
            .ok_or_else(|| BankError::UnknownModuleAccount(module.to_string()))?;
        self.send_coins(ctx, from, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, U256};

    use super::*;
    use crate::{module_address, Coin, ExecMode, LedgerState, MemoryLedger, ModuleAccounts};

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

    fn coins(s: &str) -> Coins {
        s.parse().unwrap()
    }

    #[test]
    fn test_send_to_module() {
        let bank = LedgerBank::new(ModuleAccounts::default().with_module("fee_collector"));
        let mut ledger = MemoryLedger::default().with_funds(ALICE, &coins("100atom,10stake"));
        let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut ledger);

        bank.send_coins_from_account_to_module(&mut ctx, ALICE, "fee_collector", &coins("60atom,10stake"))
            .unwrap();

        let collector = module_address("fee_collector");
        assert_eq!(ctx.state().balance(ALICE, "atom"), U256::from(40));
        assert_eq!(ctx.state().balance(ALICE, "stake"), U256::ZERO);
        assert_eq!(ctx.state().balance(collector, "atom"), U256::from(60));
        assert_eq!(ctx.state().balance(collector, "stake"), U256::from(10));
    }

    #[test]
    fn test_short_denom_moves_nothing() {
        let bank = LedgerBank::new(ModuleAccounts::default().with_module("fee_collector"));
        let mut ledger = MemoryLedger::default().with_funds(ALICE, &coins("100atom,10stake"));
        let before = ledger.clone();
        let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut ledger);

        let err = bank
            .send_coins_from_account_to_module(&mut ctx, ALICE, "fee_collector", &coins("60atom,11stake"))
            .unwrap_err();
        assert_eq!(
            err,
            BankError::InsufficientFunds {
                address: ALICE,
                denom: "stake".into(),
                available: U256::from(10),
                required: U256::from(11),
            }
        );
        drop(ctx);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_unknown_module_and_invalid_coins() {
        let bank = LedgerBank::new(ModuleAccounts::default());
        let mut ledger = MemoryLedger::default();
        let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut ledger);

        assert_eq!(
            bank.send_coins_from_account_to_module(&mut ctx, ALICE, "fee_collector", &coins("1atom")),
            Err(BankError::UnknownModuleAccount("fee_collector".into()))
        );

        let unsorted =
            Coins::from_raw(vec![Coin::new("stake", U256::from(1)), Coin::new("atom", U256::from(1))]);
        assert!(matches!(
            bank.send_coins(&mut ctx, ALICE, ALICE, &unsorted),
            Err(BankError::InvalidCoins(_))
        ));
    }
}
