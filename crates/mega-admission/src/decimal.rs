//! Fixed-point decimals used for gas prices.
//!
//! [`Dec`] carries 18 fractional digits over a [`U256`] mantissa, so a gas price multiplied by a
//! gas limit is exact and only the final conversion to an integer coin amount rounds.

use core::{fmt, str::FromStr};

use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{coin::is_valid_denom, Coin, Coins};

/// Number of fractional digits carried by [`Dec`].
pub const DEC_PRECISION: usize = 18;

/// `10^DEC_PRECISION`, the mantissa of `1.0`.
const ONE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Errors produced while parsing decimals and decimal coins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    /// The string is not an unsigned decimal number.
    #[error("malformed decimal: {0:?}")]
    Malformed(String),
    /// More fractional digits than [`DEC_PRECISION`].
    #[error("decimal {0:?} exceeds 18 fractional digits")]
    TooPrecise(String),
    /// The denomination is malformed.
    #[error("invalid denom: {0:?}")]
    InvalidDenom(String),
    /// The same denomination appears more than once.
    #[error("duplicate denom: {0}")]
    DuplicateDenom(String),
}

/// An unsigned decimal with [`DEC_PRECISION`] fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(U256);

impl Dec {
    /// Zero.
    pub const ZERO: Self = Self(U256::ZERO);

    /// One.
    pub const ONE: Self = Self(ONE);

    /// Creates a decimal from an integer.
    pub fn from_int(value: u64) -> Self {
        Self(U256::from(value).saturating_mul(ONE))
    }

    /// Creates a decimal from its raw mantissa, i.e. the value times `10^18`.
    pub const fn from_mantissa(mantissa: U256) -> Self {
        Self(mantissa)
    }

    /// The raw mantissa.
    pub const fn mantissa(self) -> U256 {
        self.0
    }

    /// Returns whether the value is zero.
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Multiplies by an integer. The product is exact unless it overflows `U256`, in which case
    /// it saturates.
    pub fn mul_u64(self, factor: u64) -> Self {
        Self(self.0.saturating_mul(U256::from(factor)))
    }

    /// Rounds up to the nearest integer.
    pub fn ceil(self) -> U256 {
        let (quotient, remainder) = self.0.div_rem(ONE);
        if remainder.is_zero() {
            quotient
        } else {
            quotient + U256::from(1)
        }
    }

    /// Rounds down to the nearest integer.
    pub fn floor(self) -> U256 {
        self.0 / ONE
    }
}

impl FromStr for Dec {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DecimalError::Malformed(s.to_string());
        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if (s.contains('.') && frac.is_empty()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if frac.len() > DEC_PRECISION {
            return Err(DecimalError::TooPrecise(s.to_string()));
        }

        let int = U256::from_str_radix(int, 10).map_err(|_| malformed())?;
        let padded = format!("{frac:0<width$}", width = DEC_PRECISION);
        let frac = U256::from_str_radix(&padded, 10).map_err(|_| malformed())?;
        let mantissa = int.checked_mul(ONE).and_then(|v| v.checked_add(frac)).ok_or_else(malformed)?;
        Ok(Self(mantissa))
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (int, frac) = self.0.div_rem(ONE);
        write!(f, "{int}.{:0>width$}", frac.to_string(), width = DEC_PRECISION)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A decimal amount of one denomination, e.g. a gas price.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecCoin {
    /// The denomination.
    pub denom: String,
    /// The decimal amount.
    pub amount: Dec,
}

impl DecCoin {
    /// Creates a new decimal coin.
    pub fn new(denom: impl Into<String>, amount: Dec) -> Self {
        Self { denom: denom.into(), amount }
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for DecCoin {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| DecimalError::Malformed(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        if !is_valid_denom(denom) {
            return Err(DecimalError::InvalidDenom(denom.to_string()));
        }
        Ok(Self::new(denom, amount.parse()?))
    }
}

/// A set of decimal coins, sorted by denomination, without duplicates or zero entries.
///
/// Used for the validator-local minimum gas prices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecCoins(Vec<DecCoin>);

impl DecCoins {
    /// Builds a canonical set. Zero entries are dropped and the result is sorted.
    pub fn new(coins: impl IntoIterator<Item = DecCoin>) -> Result<Self, DecimalError> {
        let mut coins: Vec<DecCoin> = coins.into_iter().collect();
        if let Some(coin) = coins.iter().find(|coin| !is_valid_denom(&coin.denom)) {
            return Err(DecimalError::InvalidDenom(coin.denom.clone()));
        }
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        if let Some(pair) = coins.windows(2).find(|pair| pair[0].denom == pair[1].denom) {
            return Err(DecimalError::DuplicateDenom(pair[0].denom.clone()));
        }
        coins.retain(|coin| !coin.amount.is_zero());
        Ok(Self(coins))
    }

    /// An empty set.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns whether every entry is zero. An empty set is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|coin| coin.amount.is_zero())
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> core::slice::Iter<'_, DecCoin> {
        self.0.iter()
    }

    /// Multiplies every price by `gas` and rounds each product up, giving the fee owed per
    /// denomination.
    pub fn required_fees(&self, gas: u64) -> Coins {
        Coins::from_raw(
            self.0.iter().map(|price| Coin::new(price.denom.clone(), price.amount.mul_u64(gas).ceil())).collect(),
        )
    }
}

impl fmt::Display for DecCoins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}

impl FromStr for DecCoins {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::empty());
        }
        Self::new(s.split(',').map(DecCoin::from_str).collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let dec: Dec = "0.1".parse().unwrap();
        assert_eq!(dec.mantissa(), U256::from(100_000_000_000_000_000u64));
        assert_eq!(dec.to_string(), "0.100000000000000000");
        assert_eq!("12".parse::<Dec>().unwrap(), Dec::from_int(12));
        assert_eq!("0.000000000000000001".parse::<Dec>().unwrap().mantissa(), U256::from(1));

        assert!(matches!("0.0000000000000000001".parse::<Dec>(), Err(DecimalError::TooPrecise(_))));
        for bad in ["", ".5", "1.", "-1", "1.2.3", "1e5"] {
            assert!(matches!(bad.parse::<Dec>(), Err(DecimalError::Malformed(_))), "{bad}");
        }
    }

    #[test]
    fn test_ceil_never_rounds_down() {
        let price: Dec = "0.1".parse().unwrap();
        assert_eq!(price.mul_u64(100_000).ceil(), U256::from(10_000));
        assert_eq!(price.mul_u64(100_001).ceil(), U256::from(10_001));
        assert_eq!(price.mul_u64(100_001).floor(), U256::from(10_000));

        let tiny: Dec = "0.000001".parse().unwrap();
        assert_eq!(tiny.mul_u64(1).ceil(), U256::from(1));
        assert_eq!(Dec::ZERO.mul_u64(1_000_000).ceil(), U256::ZERO);
    }

    #[test]
    fn test_dec_coins() {
        let prices: DecCoins = "0.2stake, 0.1atom,0uosmo".parse().unwrap();
        assert_eq!(prices.iter().count(), 2);
        assert_eq!(prices.iter().next().unwrap().denom, "atom");
        assert_eq!(prices.required_fees(100_000).to_string(), "10000atom,20000stake");

        assert!("0atom".parse::<DecCoins>().unwrap().is_zero());
        assert!(DecCoins::empty().is_zero());
        assert!(matches!(
            "0.1atom,0.2atom".parse::<DecCoins>(),
            Err(DecimalError::DuplicateDenom(_))
        ));
        assert!(matches!("0.1".parse::<DecCoins>(), Err(DecimalError::Malformed(_))));
        assert!(matches!("0.1a".parse::<DecCoins>(), Err(DecimalError::InvalidDenom(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let dec: Dec = "1.5".parse().unwrap();
        let json = serde_json::to_string(&dec).unwrap();
        assert_eq!(json, "\"1.500000000000000000\"");
        assert_eq!(serde_json::from_str::<Dec>(&json).unwrap(), dec);
    }
}
