//! Multi-denomination coin amounts.
//!
//! A [`Coins`] value is the unit in which fees are declared, required and transferred. Amounts are
//! unsigned, so "non-negative" holds by construction; what can still go wrong in a decoded value
//! is the denomination set itself (malformed names, duplicates, wrong order), which
//! [`Coins::validate`] reports.

use core::{fmt, str::FromStr};

use alloy_primitives::U256;
use delegate::delegate;
use serde::{Deserialize, Serialize};

/// Minimum length of a denomination.
const MIN_DENOM_LEN: usize = 3;
/// Maximum length of a denomination.
const MAX_DENOM_LEN: usize = 128;

/// Errors produced while building, parsing or validating coins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoinsError {
    /// The denomination does not match `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
    #[error("invalid denom: {0:?}")]
    InvalidDenom(String),
    /// The same denomination appears more than once.
    #[error("duplicate denom: {0}")]
    DuplicateDenom(String),
    /// Denominations are not in strictly ascending order.
    #[error("denoms are not sorted: {prev} >= {next}")]
    Unsorted {
        /// The earlier denomination.
        prev: String,
        /// The denomination that should have sorted after `prev`.
        next: String,
    },
    /// A coin string could not be parsed.
    #[error("malformed coin: {0:?}")]
    Malformed(String),
}

/// Returns whether `denom` is a well-formed denomination.
pub fn is_valid_denom(denom: &str) -> bool {
    let bytes = denom.as_bytes();
    if !(MIN_DENOM_LEN..=MAX_DENOM_LEN).contains(&bytes.len()) || !bytes[0].is_ascii_alphabetic() {
        return false;
    }
    bytes[1..].iter().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b':' | b'.' | b'_' | b'-'))
}

/// A single amount of one denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// The denomination.
    pub denom: String,
    /// The amount in the smallest indivisible unit.
    pub amount: U256,
}

impl Coin {
    /// Creates a new coin.
    pub fn new(denom: impl Into<String>, amount: U256) -> Self {
        Self { denom: denom.into(), amount }
    }

    /// Returns whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(CoinsError::Malformed(s.to_string()));
        }
        let amount = U256::from_str_radix(amount, 10).map_err(|_| CoinsError::Malformed(s.to_string()))?;
        if !is_valid_denom(denom) {
            return Err(CoinsError::InvalidDenom(denom.to_string()));
        }
        Ok(Self::new(denom, amount))
    }
}

/// A set of coins, one entry per denomination, sorted by denomination.
///
/// Values built through [`Coins::new`] or parsed from a string are canonical: sorted, unique and
/// without zero entries. [`Coins::from_raw`] keeps decoded input untouched so that a malformed fee
/// can be detected by [`Coins::validate`] instead of being silently repaired.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Builds a canonical coin set. Zero amounts are dropped and the result is sorted.
    pub fn new(coins: impl IntoIterator<Item = Coin>) -> Result<Self, CoinsError> {
        let mut coins: Vec<Coin> = coins.into_iter().collect();
        if let Some(coin) = coins.iter().find(|coin| !is_valid_denom(&coin.denom)) {
            return Err(CoinsError::InvalidDenom(coin.denom.clone()));
        }
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        if let Some(pair) = coins.windows(2).find(|pair| pair[0].denom == pair[1].denom) {
            return Err(CoinsError::DuplicateDenom(pair[0].denom.clone()));
        }
        coins.retain(|coin| !coin.is_zero());
        Ok(Self(coins))
    }

    /// Wraps coins exactly as given, without sorting or validation.
    pub const fn from_raw(coins: Vec<Coin>) -> Self {
        Self(coins)
    }

    /// An empty coin set.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    delegate! {
        to self.0 {
            /// Number of entries, including zero entries of a raw set.
            pub fn len(&self) -> usize;
            /// Returns whether there are no entries at all.
            pub fn is_empty(&self) -> bool;
            /// Iterates over the entries in stored order.
            pub fn iter(&self) -> core::slice::Iter<'_, Coin>;
        }
    }

    /// Checks that every denomination is well-formed and that denominations are strictly
    /// ascending, hence unique. Zero amounts are tolerated.
    pub fn validate(&self) -> Result<(), CoinsError> {
        for (i, coin) in self.0.iter().enumerate() {
            if !is_valid_denom(&coin.denom) {
                return Err(CoinsError::InvalidDenom(coin.denom.clone()));
            }
            if let Some(prev) = i.checked_sub(1).map(|j| &self.0[j]) {
                if prev.denom == coin.denom {
                    return Err(CoinsError::DuplicateDenom(coin.denom.clone()));
                }
                if prev.denom > coin.denom {
                    return Err(CoinsError::Unsorted {
                        prev: prev.denom.clone(),
                        next: coin.denom.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns whether [`Coins::validate`] succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Returns whether every amount is zero. An empty set is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(Coin::is_zero)
    }

    /// The amount held for `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> U256 {
        self.0.iter().find(|coin| coin.denom == denom).map_or(U256::ZERO, |coin| coin.amount)
    }

    /// Returns whether, for at least one denomination of `other`, this set holds a non-zero
    /// amount that is greater than or equal to the one in `other`.
    ///
    /// An empty `other` yields `false`.
    pub fn is_any_gte(&self, other: &Self) -> bool {
        other.0.iter().any(|coin| {
            let held = self.amount_of(&coin.denom);
            !held.is_zero() && held >= coin.amount
        })
    }

    /// Returns whether this set holds at least the amount of every denomination of `other`.
    pub fn is_all_gte(&self, other: &Self) -> bool {
        other.0.iter().all(|coin| self.amount_of(&coin.denom) >= coin.amount)
    }

    /// Subtracts `other` denomination by denomination. Returns `None` if any denomination of
    /// `other` exceeds what this set holds.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        let mut remaining = self.non_zero().0;
        for coin in other.0.iter().filter(|coin| !coin.is_zero()) {
            let entry = remaining.iter_mut().find(|held| held.denom == coin.denom)?;
            entry.amount = entry.amount.checked_sub(coin.amount)?;
        }
        remaining.retain(|coin| !coin.is_zero());
        Some(Self(remaining))
    }

    /// The same set with zero entries removed.
    pub fn non_zero(&self) -> Self {
        Self(self.0.iter().filter(|coin| !coin.is_zero()).cloned().collect())
    }

    /// Consumes the set and returns the entries.
    pub fn into_inner(self) -> Vec<Coin> {
        self.0
    }
}

impl fmt::Display for Coins {
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

impl FromStr for Coins {
    type Err = CoinsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::empty());
        }
        Self::new(s.split(',').map(Coin::from_str).collect::<Result<Vec<_>, _>>()?)
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        if coin.is_zero() {
            Self::empty()
        } else {
            Self(vec![coin])
        }
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = core::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
