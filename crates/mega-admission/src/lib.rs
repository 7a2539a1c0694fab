//! Transaction admission for the `MegaETH` ledger: validation, fee floor enforcement, fee grant
//! resolution and fee deduction.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod ante;
pub use ante::*;

mod coin;
pub use coin::*;

mod config;
pub use config::*;

mod context;
pub use context::*;

mod decimal;
pub use decimal::*;

mod error;
pub use error::*;

mod event;
pub use event::*;

mod keeper;
pub use keeper::*;

mod state;
pub use state::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod tx;
pub use tx::*;
