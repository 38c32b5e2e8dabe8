//! Registration and login input.

use serde::Deserialize;

use crate::domain::foundation::ValidationError;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 7;

/// Registration request body.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl NewAccount {
    /// Checks required fields, email shape and password length.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::empty_field("username"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::empty_field("password"));
        }
        if !is_plausible_email(&self.email) {
            return Err(ValidationError::invalid_format(
                "email",
                "Invalid email format",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::too_short("password", MIN_PASSWORD_LENGTH));
        }
        Ok(())
    }

    /// Email with surrounding whitespace removed.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_string()
    }
}

/// Login request body.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::empty_field("password"));
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}
