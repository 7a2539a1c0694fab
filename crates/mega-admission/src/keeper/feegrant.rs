use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AdmissionContext, Coins, FeeGrantError, FeegrantKeeper, LedgerState, Msg};

/// A fee allowance granted by one account to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Allowance {
    /// Spend-limited and/or time-limited allowance valid for any message.
    Basic(BasicAllowance),
    /// A basic allowance restricted to a set of message types.
    AllowedMsg(AllowedMsgAllowance),
}

/// What happens to a grant after it accepted or rejected a fee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
    /// The grant stays, with the updated remaining allowance.
    Keep(Allowance),
    /// The grant is used up or expired and is removed.
    Remove,
}

impl Allowance {
    /// Checks whether `fee` may be paid for `msgs` at `block_time`.
    ///
    /// On success returns the state the grant should be left in. An expired grant is reported as
    /// [`FeeGrantError::Expired`] and must be removed by the caller.
    pub fn accept(
        &self,
        block_time: u64,
        fee: &Coins,
        msgs: &[Msg],
    ) -> Result<GrantOutcome, FeeGrantError> {
        match self {
            Self::Basic(basic) => Ok(basic.accept(block_time, fee)?.map_or(GrantOutcome::Remove, |b| {
                GrantOutcome::Keep(b.into())
            })),
            Self::AllowedMsg(allowed) => {
                if let Some(msg) = msgs.iter().find(|msg| !allowed.allows(&msg.type_url)) {
                    return Err(FeeGrantError::MessageNotAllowed(msg.type_url.clone()));
                }
                let outcome = match allowed.allowance.accept(block_time, fee)? {
                    Some(remaining) => GrantOutcome::Keep(
                        AllowedMsgAllowance {
                            allowance: remaining,
                            allowed_messages: allowed.allowed_messages.clone(),
                        }
                        .into(),
                    ),
                    None => GrantOutcome::Remove,
                };
                Ok(outcome)
            }
        }
    }

    /// Whether the grant expired before `block_time`.
    pub fn is_expired(&self, block_time: u64) -> bool {
        match self {
            Self::Basic(basic) => basic.is_expired(block_time),
            Self::AllowedMsg(allowed) => allowed.allowance.is_expired(block_time),
        }
    }
}

/// An allowance with an optional total spend limit and an optional expiration time.
///
/// `None` for either field means unlimited.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAllowance {
    /// Remaining coins the grantee may spend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend_limit: Option<Coins>,
    /// Block time (seconds) after which the grant is no longer valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u64>,
}

impl BasicAllowance {
    /// An allowance capped at `limit`.
    pub fn with_spend_limit(limit: Coins) -> Self {
        Self { spend_limit: Some(limit), expiration: None }
    }

    /// Sets the expiration time.
    pub const fn expiring_at(mut self, expiration: u64) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Whether the grant expired before `block_time`.
    pub fn is_expired(&self, block_time: u64) -> bool {
        self.expiration.is_some_and(|expiration| expiration < block_time)
    }

    /// Returns the allowance left after paying `fee`, or `None` if nothing is left.
    fn accept(&self, block_time: u64, fee: &Coins) -> Result<Option<Self>, FeeGrantError> {
        if self.is_expired(block_time) {
            return Err(FeeGrantError::Expired);
        }
        let Some(limit) = &self.spend_limit else {
            return Ok(Some(self.clone()));
        };
        let remaining = limit.checked_sub(fee).ok_or_else(|| FeeGrantError::SpendLimitExceeded {
            fee: fee.clone(),
            remaining: limit.clone(),
        })?;
        if remaining.is_zero() {
            return Ok(None);
        }
        Ok(Some(Self { spend_limit: Some(remaining), expiration: self.expiration }))
    }
}

/// A [`BasicAllowance`] that only pays for messages whose type URL is listed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedMsgAllowance {
    /// The underlying allowance.
    pub allowance: BasicAllowance,
    /// Message type URLs the allowance pays for.
    pub allowed_messages: Vec<String>,
}

impl AllowedMsgAllowance {
    /// Restricts `allowance` to the given message types.
    pub fn new<I, S>(allowance: BasicAllowance, allowed_messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { allowance, allowed_messages: allowed_messages.into_iter().map(Into::into).collect() }
    }

    fn allows(&self, type_url: &str) -> bool {
        self.allowed_messages.iter().any(|allowed| allowed == type_url)
    }
}

/// A [`FeegrantKeeper`] that stores allowances in the context's [`LedgerState`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FeeGrantStore;

impl FeeGrantStore {
    /// Grants `allowance` from `granter` to `grantee`, replacing any existing grant.
    pub fn grant_allowance(
        &self,
        state: &mut dyn LedgerState,
        granter: Address,
        grantee: Address,
        allowance: impl Into<Allowance>,
    ) {
        state.set_allowance(granter, grantee, Some(allowance.into()));
    }

    /// Revokes the grant from `granter` to `grantee`.
    pub fn revoke_allowance(
        &self,
        state: &mut dyn LedgerState,
        granter: Address,
        grantee: Address,
    ) -> Result<(), FeeGrantError> {
        if state.allowance(granter, grantee).is_none() {
            return Err(FeeGrantError::NotFound);
        }
        state.set_allowance(granter, grantee, None);
        Ok(())
    }
}

impl FeegrantKeeper for FeeGrantStore {
    fn use_granted_fees(
        &self,
        ctx: &mut AdmissionContext<'_>,
        granter: Address,
        grantee: Address,
        fee: &Coins,
        msgs: &[Msg],
    ) -> Result<(), FeeGrantError> {
        let allowance = ctx.state().allowance(granter, grantee).ok_or(FeeGrantError::NotFound)?;

        let outcome = match allowance.accept(ctx.block_time(), fee, msgs) {
            Err(FeeGrantError::Expired) => {
                ctx.state_mut().set_allowance(granter, grantee, None);
                return Err(FeeGrantError::Expired);
            }
            result => result?,
        };

        match outcome {
            GrantOutcome::Keep(remaining) => {
                ctx.state_mut().set_allowance(granter, grantee, Some(remaining));
            }
            GrantOutcome::Remove => {
                debug!(%granter, %grantee, "Fee allowance used up");
                ctx.state_mut().set_allowance(granter, grantee, None);
            }
        }
        Ok(())
    }
}
