//! Names and keys shared across the admission pipeline.

/// Name of the module account that receives transaction fees.
pub const FEE_COLLECTOR_NAME: &str = "fee_collector";

/// Prefix hashed together with a module name to derive the module account address.
pub const MODULE_ADDRESS_PREFIX: &str = "module:";

/// Type of the event emitted for every admitted transaction.
pub const EVENT_TYPE_TX: &str = "tx";

/// Event attribute carrying the charged fee.
pub const ATTRIBUTE_KEY_FEE: &str = "fee";

/// Event attribute carrying the debited account.
pub const ATTRIBUTE_KEY_FEE_PAYER: &str = "fee_payer";
