//! Drive list UI.
//!
//! - [`DriveList`] - cards of the connected wallet's storage accounts
//! - [`CreateDrive`] - form reserving a new storage account

mod card;
mod create;
mod list;

pub use card::DriveCard;
pub use create::CreateDrive;
pub use list::DriveList;
