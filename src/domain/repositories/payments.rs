use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::payments::{
    InsertPaymentEntity, InsertPaymentOutcome, PaymentEntity,
};
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn find_by_id(&self, payment_id: i64) -> Result<Option<PaymentEntity>>;

    async fn find_by_external_transaction_id_and_status(
        &self,
        external_transaction_id: String,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>>;

    async fn find_by_user_id_and_status(
        &self,
        user_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>>;

    async fn find_by_prepare_id_and_user_id(
        &self,
        prepare_id: i64,
        user_id: Uuid,
    ) -> Result<Option<PaymentEntity>>;

    async fn find_by_external_transaction_id_prepare_id_and_status(
        &self,
        external_transaction_id: String,
        prepare_id: i64,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>>;

    /// Inserts unless a row with the same `external_transaction_id` exists.
    /// `(prepare_id, user_id)` is unique as well.
    async fn insert_pending(&self, payment: InsertPaymentEntity) -> Result<InsertPaymentOutcome>;

    /// Compare-and-swap on `status`. Returns `false` when the row was no longer
    /// in `from`, in which case nothing was written.
    async fn transition_status(
        &self,
        payment_id: i64,
        from: PaymentStatus,
        to: PaymentStatus,
        provider_error: Option<i32>,
    ) -> Result<bool>;
}
