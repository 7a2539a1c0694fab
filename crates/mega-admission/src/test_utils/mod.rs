//! Test utilities for the admission pipeline.

mod fixtures;
mod keepers;

pub use fixtures::*;
pub use keepers::*;
