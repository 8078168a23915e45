//! Browser-side implementations of the orchestrator's boundaries.
//!
//! This module provides:
//! - [`JsConnector`] - storage SDK handles over the page's JavaScript adapter
//! - [`GatewayProbe`] - object sizes from gateway `HEAD` requests
//! - [`wallet`] - injected Solana wallet connectivity

pub mod error;
mod probe;
mod sdk;
pub mod wallet;

pub use probe::GatewayProbe;
pub use sdk::JsConnector;
