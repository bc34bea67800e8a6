//! Ledgerd Common Types
//!
//! This crate contains shared types used across the ledgerd engine,
//! including account identifiers, amounts, the error taxonomy and clocks.

pub mod identifiers;
pub mod monetary;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use monetary::*;
pub use error::*;
pub use time::*;
