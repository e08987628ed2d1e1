//! # Time RPC Core
//!
//! Transport-free pieces of the time exchange.
//!
//! ## Modules
//! - `clock`: Source of the current instant
//! - `error`: Error types shared by server and client
//! - `models`: The two wire messages
//! - `provider`: Resolves a zone name and formats the current time in it
//! - `selector`: Numeric selector to zone name mapping used by the client
//! - `utils`: Zone resolution and the zoned date-time string format

pub mod clock;
pub mod error;
pub mod models;
pub mod provider;
pub mod selector;
pub mod utils;
