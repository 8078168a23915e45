//! Browser utilities.
//!
//! Provides:
//! - [`dom`] - window, storage and file input access
//! - [`console`] - `tracing` subscriber writing to the browser console
//! - [`race_with_timeout`], [`js_error_message`] - promise helpers

pub mod console;
pub mod dom;
mod promise;

pub use promise::{RaceResult, js_error_message, race_with_timeout};
