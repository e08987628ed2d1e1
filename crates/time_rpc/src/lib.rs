//! # Time RPC
//!
//! A client sends a zone name, the server answers with the current date-time
//! in that zone.
//!
//! - [`server::TimeServer`] owns the listening socket and serves `RequestTime`
//!   until its shutdown token is cancelled.
//! - [`client::TimeClient`] owns one channel to a server and makes single
//!   calls on it.
//!
//! Both speak JSON-RPC over plain TCP; `RequestTime` takes
//! `{"timeZone": "<zone>"}` and answers `{"time": "<zoned date-time>"}`.

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use client::TimeClient;
pub use config::{ClientConfig, ServerConfig};
pub use crate::core::error::{TimeRpcError, TimeRpcResult};
pub use crate::core::models::{TimeRequest, TimeResponse};
pub use server::{TimeServer, TimeService};
