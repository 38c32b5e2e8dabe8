//! In-Memory Account Store Adapter
//!
//! Stores accounts in memory, keyed by lower-cased email.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::PasswordHasher;
use crate::domain::account::{Account, NewAccount, PasswordHash, DEFAULT_ROLE};
use crate::domain::foundation::{AccountId, Timestamp};
use crate::ports::{AccountError, AccountStore};

/// In-memory account store.
#[derive(Debug, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    hasher: Arc<PasswordHasher>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            hasher: Arc::new(PasswordHasher::new()),
        }
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    fn key(email: &str) -> String {
        email.trim().to_ascii_lowercase()
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&Self::key(email)).cloned())
    }

    async fn verify_password(
        &self,
        candidate: &str,
        hash: &PasswordHash,
    ) -> Result<bool, AccountError> {
        let hasher = self.hasher.clone();
        let candidate = candidate.to_string();
        let hash = hash.clone();
        run_blocking(move || hasher.verify(&candidate, &hash)).await
    }

    async fn create(&self, input: NewAccount) -> Result<Account, AccountError> {
        input.validate()?;

        let key = Self::key(&input.email);
        if self.accounts.read().await.contains_key(&key) {
            return Err(AccountError::EmailTaken);
        }

        let hasher = self.hasher.clone();
        let password = input.password.clone();
        let password_hash = run_blocking(move || hasher.hash(&password)).await?;
        let now = Timestamp::now();
        let account = Account {
            id: AccountId::new(),
            username: input.username.trim().to_string(),
            email: input.normalized_email(),
            password_hash,
            full_name: input.full_name,
            bio: input.bio,
            profile_picture: input.profile_picture,
            roles: vec![DEFAULT_ROLE.to_string()],
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        // Re-check under the write lock; another registration may have won.
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AccountError::EmailTaken);
        }
        accounts.insert(key, account.clone());
        Ok(account)
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, AccountError>
where
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AccountError::Storage(format!("password task failed: {}", e)))?
}
