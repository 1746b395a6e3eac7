use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::value_objects::enums::{
    payment_providers::PaymentProvider, payment_statuses::PaymentStatus,
};
use crate::infrastructure::postgres::schema::payments;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub external_transaction_id: String,
    pub merchant_transaction_id: String,
    pub prepare_id: i64,
    pub status: String,
    pub amount: Decimal,
    pub provider: String,
    pub provider_error: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentEntity {
    pub fn payment_status(&self) -> Result<PaymentStatus> {
        PaymentStatus::from_str(&self.status)
            .ok_or_else(|| anyhow!("payment {} has unknown status `{}`", self.id, self.status))
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub user_id: Uuid,
    pub external_transaction_id: String,
    pub merchant_transaction_id: String,
    pub prepare_id: i64,
    pub status: String,
    pub amount: Decimal,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsertPaymentEntity {
    pub fn pending(
        user_id: Uuid,
        external_transaction_id: String,
        merchant_transaction_id: String,
        prepare_id: i64,
        amount: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            external_transaction_id,
            merchant_transaction_id,
            prepare_id,
            status: PaymentStatus::Pending.to_string(),
            amount,
            provider: PaymentProvider::Click.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of a conditional insert keyed by `external_transaction_id`.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPaymentOutcome {
    Created(PaymentEntity),
    /// Another row already holds the transaction id; nothing was written.
    Existing(PaymentEntity),
    /// The user already has a payment with this prepare id; nothing was written.
    PrepareIdTaken,
}
