use serde::{Deserialize, Serialize};

use crate::{AdmissionConfig, AdmissionEvent, DecCoins, DecimalError, EventManager, EventSink, LedgerState};

/// The reason a transaction is being processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecMode {
    /// Mempool admission of a newly received transaction.
    #[default]
    Check,
    /// Re-validation of a transaction already in the mempool after a new block.
    ReCheck,
    /// Dry run used for gas estimation.
    Simulate,
    /// Block execution. The only mode whose writes reach the ledger.
    Finalize,
}

impl ExecMode {
    /// Whether this is first-time mempool admission.
    pub const fn is_check(self) -> bool {
        matches!(self, Self::Check)
    }

    /// Whether this is a gas-estimation dry run.
    pub const fn is_simulate(self) -> bool {
        matches!(self, Self::Simulate)
    }

    /// Whether writes made in this mode are committed to the ledger.
    pub const fn persists_writes(self) -> bool {
        matches!(self, Self::Finalize)
    }
}

/// The per-transaction environment: mode, block info, the validator's fee floor, the ledger
/// state being read and written, and the buffered events.
#[derive(derive_more::Debug)]
pub struct AdmissionContext<'a> {
    mode: ExecMode,
    block_height: u64,
    block_time: u64,
    min_gas_prices: DecCoins,
    #[debug(ignore)]
    state: &'a mut dyn LedgerState,
    events: EventManager,
}

impl<'a> AdmissionContext<'a> {
    /// Creates a context at height zero with no fee floor.
    pub fn new(mode: ExecMode, state: &'a mut dyn LedgerState) -> Self {
        Self {
            mode,
            block_height: 0,
            block_time: 0,
            min_gas_prices: DecCoins::empty(),
            state,
            events: EventManager::default(),
        }
    }

    /// Creates a context whose fee floor is taken from `config`.
    pub fn from_config(
        config: &AdmissionConfig,
        mode: ExecMode,
        state: &'a mut dyn LedgerState,
    ) -> Result<Self, DecimalError> {
        Ok(Self::new(mode, state).with_min_gas_prices(config.parsed_min_gas_prices()?))
    }

    /// Sets the block height.
    pub fn with_block_height(mut self, block_height: u64) -> Self {
        self.block_height = block_height;
        self
    }

    /// Sets the block time, in seconds.
    pub fn with_block_time(mut self, block_time: u64) -> Self {
        self.block_time = block_time;
        self
    }

    /// Sets the validator's minimum gas prices.
    pub fn with_min_gas_prices(mut self, min_gas_prices: DecCoins) -> Self {
        self.min_gas_prices = min_gas_prices;
        self
    }

    /// Changes the execution mode.
    pub fn with_mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }

    /// The execution mode.
    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// The height of the block being built or checked against.
    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// The block time, in seconds.
    pub fn block_time(&self) -> u64 {
        self.block_time
    }

    /// The validator's minimum gas prices. Empty means no floor.
    pub fn min_gas_prices(&self) -> &DecCoins {
        &self.min_gas_prices
    }

    /// The ledger state visible to this transaction.
    pub fn state(&self) -> &(dyn LedgerState + 'a) {
        &*self.state
    }

    /// Mutable access to the ledger state.
    pub fn state_mut(&mut self) -> &mut (dyn LedgerState + 'a) {
        &mut *self.state
    }

    /// Events emitted so far.
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Mutable access to the buffered events.
    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    /// Buffers an event.
    pub fn emit(&mut self, event: AdmissionEvent) {
        self.events.emit(event);
    }

    /// A child context over `state` with the same mode, block info and fee floor, and no events.
    pub(crate) fn branch<'b>(&self, state: &'b mut dyn LedgerState) -> AdmissionContext<'b> {
        AdmissionContext {
            mode: self.mode,
            block_height: self.block_height,
            block_time: self.block_time,
            min_gas_prices: self.min_gas_prices.clone(),
            state,
            events: EventManager::default(),
        }
    }

    /// Consumes the context and returns its buffered events.
    pub fn into_events(self) -> EventManager {
        self.events
    }
}
