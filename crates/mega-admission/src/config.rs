use serde::{Deserialize, Serialize};

use crate::{
    constants::FEE_COLLECTOR_NAME, AccountKeeper, BankKeeper, DecCoins, DecimalError,
    DeductFeeDecorator, MinGasPriceFeeChecker,
};

/// When the validator's minimum gas prices are enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeFloorEnforcement {
    /// Only when a transaction first enters the mempool.
    #[default]
    CheckOnly,
    /// In every mode except simulation.
    Always,
}

impl FeeFloorEnforcement {
    /// Whether the floor applies to a transaction processed in `mode`.
    pub const fn applies_to(self, mode: crate::ExecMode) -> bool {
        match self {
            Self::CheckOnly => mode.is_check(),
            Self::Always => !mode.is_simulate(),
        }
    }
}

/// Node-local admission settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Minimum gas prices, e.g. `"0.1atom,0.2stake"`. Empty disables the fee floor.
    pub min_gas_prices: String,
    /// Name of the module account that collects fees.
    pub fee_collector: String,
    /// When the fee floor is enforced.
    pub fee_floor: FeeFloorEnforcement,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            min_gas_prices: String::new(),
            fee_collector: FEE_COLLECTOR_NAME.to_string(),
            fee_floor: FeeFloorEnforcement::default(),
        }
    }
}

impl AdmissionConfig {
    /// Parses [`Self::min_gas_prices`].
    pub fn parsed_min_gas_prices(&self) -> Result<DecCoins, DecimalError> {
        self.min_gas_prices.parse()
    }

    /// The fee checker matching [`Self::fee_floor`].
    pub const fn fee_checker(&self) -> MinGasPriceFeeChecker {
        MinGasPriceFeeChecker::new().with_enforcement(self.fee_floor)
    }

    /// A fee deduction stage using this configuration's fee collector and fee checker.
    pub fn deduct_fee_decorator(
        &self,
        accounts: impl AccountKeeper + 'static,
        bank: impl BankKeeper + 'static,
    ) -> DeductFeeDecorator {
        DeductFeeDecorator::new(accounts, bank)
            .with_fee_collector(self.fee_collector.clone())
            .with_fee_checker(self.fee_checker())
    }
}
