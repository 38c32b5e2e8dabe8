//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`), so the parameters
//! travel with each hash and verification needs nothing else.

use argon2::password_hash::{
    Error as PhcError, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;
use uuid::Uuid;

use crate::domain::account::PasswordHash;
use crate::ports::AccountError;

/// Hashes and verifies passwords.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<PasswordHash, AccountError> {
        // v4 uuids come from the OS random source
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|e| AccountError::Storage(format!("password salt: {}", e)))?;
        let phc = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AccountError::Storage(format!("password hash: {}", e)))?;
        Ok(PasswordHash::new(phc.to_string()))
    }

    /// Checks `candidate` against `hash`.
    ///
    /// # Errors
    ///
    /// `AccountError::CorruptHash` if `hash` is not a PHC string this hasher
    /// can verify.
    pub fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, AccountError> {
        let parsed = PhcString::new(hash.as_str()).map_err(|_| AccountError::CorruptHash)?;
        match self.argon2.verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(_) => Err(AccountError::CorruptHash),
        }
    }
}
