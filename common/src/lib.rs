//! cardfx Common Types
//!
//! Shared types for the card conversion calculator: the supported foreign
//! currencies, card issuers and their fee table, the in-memory exchange
//! rate set, and time helpers.

pub mod card;
pub mod error;
pub mod monetary;
pub mod time;

pub use card::*;
pub use error::*;
pub use monetary::*;
pub use time::*;
