//! `POST /login` - check credentials against the account store.

use async_trait::async_trait;
use std::sync::Arc;

use super::AccountReply;
use crate::domain::account::Credentials;
use crate::domain::dispatch::{CommandError, CommandHandler, HandlerResult, NormalizedRequest};
use crate::ports::{AccountStore, ErrorReporter};

const FAILURE_MESSAGE: &str = "Error during login";

pub struct LoginHandler {
    accounts: Arc<dyn AccountStore>,
    reporter: Arc<dyn ErrorReporter>,
}

impl LoginHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { accounts, reporter }
    }

    async fn login(&self, request: &NormalizedRequest) -> AccountReply {
        let credentials = match request.json_body::<Credentials>() {
            Ok(credentials) if credentials.validate().is_ok() => credentials,
            _ => return AccountReply::failed(FAILURE_MESSAGE, "Missing required fields for login"),
        };

        let account = match self.accounts.find_by_email(&credentials.email).await {
            Ok(Some(account)) => account,
            Ok(None) => return AccountReply::rejected("User not found"),
            Err(err) => {
                self.reporter.report("login.find_by_email", &err);
                return AccountReply::failed(FAILURE_MESSAGE, "Error finding user by email");
            }
        };

        match self
            .accounts
            .verify_password(&credentials.password, &account.password_hash)
            .await
        {
            Ok(true) => {
                tracing::info!(account_id = %account.id, "Account logged in");
                AccountReply::success("User logged in successfully", account)
            }
            Ok(false) => AccountReply::rejected("Incorrect password"),
            Err(err) => {
                self.reporter.report("login.verify_password", &err);
                AccountReply::failed(FAILURE_MESSAGE, "Error verifying password")
            }
        }
    }
}

#[async_trait]
impl CommandHandler for LoginHandler {
    async fn handle(&self, request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
        HandlerResult::json(&self.login(request).await)
    }
}
