use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Business outcome codes defined by the Click merchant protocol.
///
/// Every callback answers with one of these in the `error` field. A failed
/// Complete is the only case where a code outside this set is returned: the
/// provider's own error code is echoed back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClickErrorCode {
    Success,
    SignFailed,
    InvalidAmount,
    ActionNotFound,
    AlreadyPaid,
    UserNotFound,
    TransactionNotFound,
    BadRequest,
    TransactionCanceled,
}

impl ClickErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            ClickErrorCode::Success => 0,
            ClickErrorCode::SignFailed => -1,
            ClickErrorCode::InvalidAmount => -2,
            ClickErrorCode::ActionNotFound => -3,
            ClickErrorCode::AlreadyPaid => -4,
            ClickErrorCode::UserNotFound => -5,
            ClickErrorCode::TransactionNotFound => -6,
            ClickErrorCode::BadRequest => -8,
            ClickErrorCode::TransactionCanceled => -9,
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            ClickErrorCode::Success => "Success",
            ClickErrorCode::SignFailed => "Invalid sign_string",
            ClickErrorCode::InvalidAmount => "Invalid amount",
            ClickErrorCode::ActionNotFound => "Invalid action",
            ClickErrorCode::AlreadyPaid => "Already paid",
            ClickErrorCode::UserNotFound => "Invalid userId",
            ClickErrorCode::TransactionNotFound => "Invalid merchant_prepare_id",
            ClickErrorCode::BadRequest => "Bad request",
            ClickErrorCode::TransactionCanceled => "Transaction canceled",
        }
    }
}

impl Display for ClickErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClickErrorCode::Success => "success",
            ClickErrorCode::SignFailed => "sign_failed",
            ClickErrorCode::InvalidAmount => "invalid_amount",
            ClickErrorCode::ActionNotFound => "action_not_found",
            ClickErrorCode::AlreadyPaid => "already_paid",
            ClickErrorCode::UserNotFound => "user_not_found",
            ClickErrorCode::TransactionNotFound => "transaction_not_found",
            ClickErrorCode::BadRequest => "bad_request",
            ClickErrorCode::TransactionCanceled => "transaction_canceled",
        };
        write!(f, "{}", name)
    }
}
