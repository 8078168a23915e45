//! Data models of the browser shell.
//!
//! Contains:
//! - [`WalletState`] - Solana wallet connection state
//! - [`FileView`] - grid or table layout of the file area
//!
//! Drive, account and file types come from [`scoop_core`].

mod view;
mod wallet;

pub use view::FileView;
pub use wallet::WalletState;
