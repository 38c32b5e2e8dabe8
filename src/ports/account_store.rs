//! Account Store Port - Credential and account persistence.

use async_trait::async_trait;

use crate::domain::account::{Account, NewAccount, PasswordHash};
use crate::domain::foundation::ValidationError;

/// Port for account lookup, creation and password verification.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Finds an account by email, ignoring ASCII case.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;

    /// Checks `candidate` against a stored hash.
    async fn verify_password(
        &self,
        candidate: &str,
        hash: &PasswordHash,
    ) -> Result<bool, AccountError>;

    /// Validates, hashes and stores a new account.
    ///
    /// # Errors
    ///
    /// - `Validation` if the input is incomplete or malformed
    /// - `EmailTaken` if the email is already registered
    async fn create(&self, input: NewAccount) -> Result<Account, AccountError>;
}

/// Account store errors.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Email already exists")]
    EmailTaken,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Stored hash cannot be decoded.
    #[error("corrupt password hash")]
    CorruptHash,

    #[error("storage error: {0}")]
    Storage(String),
}
