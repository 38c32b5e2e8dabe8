//! JSON reply shared by the account endpoints.

use serde::Serialize;

use crate::domain::account::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// `{status, message, user?, error?}`, always sent with status 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReply {
    pub status: ReplyStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Account>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AccountReply {
    pub fn success(message: impl Into<String>, user: Account) -> Self {
        Self {
            status: ReplyStatus::Success,
            message: message.into(),
            user: Some(user),
            error: None,
        }
    }

    /// Expected rejection with no further detail.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            message: message.into(),
            user: None,
            error: None,
        }
    }

    /// Failure with a generic message and a specific cause.
    pub fn failed(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            message: message.into(),
            user: None,
            error: Some(cause.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejected_reply_has_no_user_or_error() {
        let json = serde_json::to_value(AccountReply::rejected("User not found")).unwrap();
        assert_eq!(json, json!({"status": "error", "message": "User not found"}));
    }

    #[test]
    fn failed_reply_carries_cause() {
        let json =
            serde_json::to_value(AccountReply::failed("Error during login", "Missing field"))
                .unwrap();
        assert_eq!(json["error"], "Missing field");
    }
}
