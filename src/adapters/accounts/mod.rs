//! Account Store Adapters.
//!
//! - `InMemoryAccountStore` - Accounts kept in memory (development/testing)
//! - `PasswordHasher` - Argon2id password hashing

mod in_memory;
mod password;

pub use in_memory::InMemoryAccountStore;
pub use password::PasswordHasher;
