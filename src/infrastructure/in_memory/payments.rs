use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, InsertPaymentOutcome, PaymentEntity},
    repositories::payments::PaymentRepository,
    value_objects::enums::payment_statuses::PaymentStatus,
};

#[derive(Default)]
struct PaymentTable {
    rows: BTreeMap<i64, PaymentEntity>,
    next_id: i64,
}

impl PaymentTable {
    fn first_where(&self, predicate: impl Fn(&PaymentEntity) -> bool) -> Option<PaymentEntity> {
        self.rows.values().find(|row| predicate(row)).cloned()
    }
}

/// A thread-safe in-memory payments table.
///
/// Ids are assigned sequentially from 1. Every read clones, so callers never
/// hold a view that another request can change underneath them.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    table: Arc<RwLock<PaymentTable>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<PaymentEntity> {
        self.table.read().await.rows.values().cloned().collect()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentStore {
    async fn find_by_id(&self, payment_id: i64) -> Result<Option<PaymentEntity>> {
        Ok(self.table.read().await.rows.get(&payment_id).cloned())
    }

    async fn find_by_external_transaction_id_and_status(
        &self,
        external_transaction_id: String,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>> {
        let table = self.table.read().await;
        Ok(table.first_where(|row| {
            row.external_transaction_id == external_transaction_id
                && row.status == status.as_str()
        }))
    }

    async fn find_by_user_id_and_status(
        &self,
        user_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>> {
        let table = self.table.read().await;
        Ok(table.first_where(|row| row.user_id == user_id && row.status == status.as_str()))
    }

    async fn find_by_prepare_id_and_user_id(
        &self,
        prepare_id: i64,
        user_id: Uuid,
    ) -> Result<Option<PaymentEntity>> {
        let table = self.table.read().await;
        Ok(table.first_where(|row| row.prepare_id == prepare_id && row.user_id == user_id))
    }

    async fn find_by_external_transaction_id_prepare_id_and_status(
        &self,
        external_transaction_id: String,
        prepare_id: i64,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>> {
        let table = self.table.read().await;
        Ok(table.first_where(|row| {
            row.external_transaction_id == external_transaction_id
                && row.prepare_id == prepare_id
                && row.status == status.as_str()
        }))
    }

    async fn insert_pending(&self, payment: InsertPaymentEntity) -> Result<InsertPaymentOutcome> {
        let mut table = self.table.write().await;

        if let Some(existing) = table
            .first_where(|row| row.external_transaction_id == payment.external_transaction_id)
        {
            return Ok(InsertPaymentOutcome::Existing(existing));
        }
        if table
            .first_where(|row| row.prepare_id == payment.prepare_id && row.user_id == payment.user_id)
            .is_some()
        {
            return Ok(InsertPaymentOutcome::PrepareIdTaken);
        }

        table.next_id += 1;
        let created = PaymentEntity {
            id: table.next_id,
            user_id: payment.user_id,
            external_transaction_id: payment.external_transaction_id,
            merchant_transaction_id: payment.merchant_transaction_id,
            prepare_id: payment.prepare_id,
            status: payment.status,
            amount: payment.amount,
            provider: payment.provider,
            provider_error: None,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        };
        table.rows.insert(created.id, created.clone());

        Ok(InsertPaymentOutcome::Created(created))
    }

    async fn transition_status(
        &self,
        payment_id: i64,
        from: PaymentStatus,
        to: PaymentStatus,
        provider_error: Option<i32>,
    ) -> Result<bool> {
        let mut table = self.table.write().await;

        match table.rows.get_mut(&payment_id) {
            Some(row) if row.status == from.as_str() => {
                row.status = to.to_string();
                row.provider_error = provider_error;
                row.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
