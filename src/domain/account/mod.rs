//! Local user accounts.
//!
//! Accounts are value objects handed to and from the [`AccountStore`]
//! port. The stored password hash never serializes.
//!
//! [`AccountStore`]: crate::ports::AccountStore

mod record;
mod registration;

pub use record::{Account, PasswordHash, DEFAULT_ROLE};
pub use registration::{Credentials, NewAccount, MIN_PASSWORD_LENGTH};
