//! Ordered guard chains for the two Click phases.
//!
//! The first failing guard decides the response code, so the order of each
//! chain is observable by the provider and is fixed here in one place.

use crate::domain::value_objects::enums::click_error_codes::ClickErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareGuard {
    Signature,
    UserIdentifier,
    NotAlreadyPaid,
    NoPriorCancellation,
    UserExists,
    TransactionNotCanceled,
}

impl PrepareGuard {
    pub const ORDER: [PrepareGuard; 6] = [
        PrepareGuard::Signature,
        PrepareGuard::UserIdentifier,
        PrepareGuard::NotAlreadyPaid,
        PrepareGuard::NoPriorCancellation,
        PrepareGuard::UserExists,
        PrepareGuard::TransactionNotCanceled,
    ];

    pub fn rejection(&self) -> (ClickErrorCode, &'static str) {
        match self {
            PrepareGuard::Signature => (ClickErrorCode::SignFailed, "Invalid sign_string"),
            PrepareGuard::UserIdentifier => (ClickErrorCode::BadRequest, "Invalid userId"),
            PrepareGuard::NotAlreadyPaid => (ClickErrorCode::AlreadyPaid, "Already paid"),
            PrepareGuard::NoPriorCancellation => {
                (ClickErrorCode::TransactionCanceled, "Cancelled")
            }
            PrepareGuard::UserExists => (ClickErrorCode::UserNotFound, "Invalid userId"),
            PrepareGuard::TransactionNotCanceled => {
                (ClickErrorCode::TransactionCanceled, "Transaction canceled")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteGuard {
    Signature,
    UserIdentifier,
    UserExists,
    PaymentPrepared,
    NotAlreadyPaid,
    NotCanceled,
    AmountMatches,
}

impl CompleteGuard {
    pub const ORDER: [CompleteGuard; 7] = [
        CompleteGuard::Signature,
        CompleteGuard::UserIdentifier,
        CompleteGuard::UserExists,
        CompleteGuard::PaymentPrepared,
        CompleteGuard::NotAlreadyPaid,
        CompleteGuard::NotCanceled,
        CompleteGuard::AmountMatches,
    ];

    pub fn rejection(&self) -> (ClickErrorCode, &'static str) {
        match self {
            CompleteGuard::Signature => (ClickErrorCode::SignFailed, "Invalid sign_string"),
            CompleteGuard::UserIdentifier => (ClickErrorCode::BadRequest, "Invalid userId"),
            CompleteGuard::UserExists => (ClickErrorCode::UserNotFound, "Invalid userId"),
            CompleteGuard::PaymentPrepared => (
                ClickErrorCode::TransactionNotFound,
                "Invalid merchant_prepare_id",
            ),
            CompleteGuard::NotAlreadyPaid => (ClickErrorCode::AlreadyPaid, "Already paid"),
            CompleteGuard::NotCanceled => {
                (ClickErrorCode::TransactionCanceled, "Transaction canceled")
            }
            CompleteGuard::AmountMatches => (ClickErrorCode::InvalidAmount, "Invalid amount"),
        }
    }
}
