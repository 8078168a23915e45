//! UI components built with Leptos.
//!
//! - [`Layout`] - page layout (main entry point)
//! - [`navbar`] - app name, cluster and wallet button
//! - [`drives`] - storage account cards and the create form
//! - [`explorer`] - open drive with grid and table views
//! - [`toast`] - the notifier's current notice
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod drives;
pub mod explorer;
pub mod icons;
mod layout;
pub mod navbar;
pub mod toast;

pub use layout::Layout;
