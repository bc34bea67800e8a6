//! Ledgerd Protocol Messages
//!
//! One request/response pair per ledger operation, with every error kind
//! carried through as a distinct code.

pub mod messages;
pub mod dispatch;

pub use messages::*;
pub use dispatch::{dispatch, dispatch_json};
