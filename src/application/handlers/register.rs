//! `POST /register` - create a local account.
//!
//! Every outcome is a 200 JSON [`AccountReply`]; rejections are expressed in
//! its `status` field rather than the HTTP status.

use async_trait::async_trait;
use std::sync::Arc;

use super::AccountReply;
use crate::domain::account::{NewAccount, MIN_PASSWORD_LENGTH};
use crate::domain::dispatch::{CommandError, CommandHandler, HandlerResult, NormalizedRequest};
use crate::domain::foundation::ValidationError;
use crate::ports::{AccountError, AccountStore, ErrorReporter};

const FAILURE_MESSAGE: &str = "Error registering user";

pub struct RegisterHandler {
    accounts: Arc<dyn AccountStore>,
    reporter: Arc<dyn ErrorReporter>,
}

impl RegisterHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { accounts, reporter }
    }

    async fn register(&self, request: &NormalizedRequest) -> AccountReply {
        let input: NewAccount = match request.json_body() {
            Ok(input) => input,
            Err(_) => return AccountReply::failed(FAILURE_MESSAGE, MISSING_FIELDS),
        };

        if let Err(err) = input.validate() {
            return AccountReply::failed(FAILURE_MESSAGE, validation_cause(&err));
        }

        match self.accounts.create(input).await {
            Ok(account) => {
                tracing::info!(account_id = %account.id, "Account registered");
                AccountReply::success("User registered successfully", account)
            }
            Err(AccountError::EmailTaken) => AccountReply::rejected("Email already exists"),
            Err(AccountError::Validation(err)) => {
                AccountReply::failed(FAILURE_MESSAGE, validation_cause(&err))
            }
            Err(err) => {
                self.reporter.report("register.create", &err);
                AccountReply::failed(FAILURE_MESSAGE, "Error creating account")
            }
        }
    }
}

const MISSING_FIELDS: &str = "Missing required fields for registration";

fn validation_cause(err: &ValidationError) -> String {
    match err {
        ValidationError::EmptyField { .. } => MISSING_FIELDS.to_string(),
        ValidationError::InvalidFormat { reason, .. } => reason.clone(),
        ValidationError::TooShort { .. } => format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ),
    }
}

#[async_trait]
impl CommandHandler for RegisterHandler {
    async fn handle(&self, request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
        HandlerResult::json(&self.register(request).await)
    }
}
