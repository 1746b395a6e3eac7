use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    OptionalExtension, RunQueryDsl, insert_into,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    update,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::{InsertPaymentEntity, InsertPaymentOutcome, PaymentEntity},
        repositories::payments::PaymentRepository,
        value_objects::enums::payment_statuses::PaymentStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payments},
};

const PREPARE_ID_USER_ID_KEY: &str = "payments_prepare_id_user_id_key";

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn find_by_id(&self, payment_id: i64) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .find(payment_id)
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_external_transaction_id_and_status(
        &self,
        external_transaction_id: String,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .select(PaymentEntity::as_select())
            .filter(payments::external_transaction_id.eq(external_transaction_id))
            .filter(payments::status.eq(status.to_string()))
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_user_id_and_status(
        &self,
        user_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .select(PaymentEntity::as_select())
            .filter(payments::user_id.eq(user_id))
            .filter(payments::status.eq(status.to_string()))
            .order(payments::updated_at.desc())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_prepare_id_and_user_id(
        &self,
        prepare_id: i64,
        user_id: Uuid,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .select(PaymentEntity::as_select())
            .filter(payments::prepare_id.eq(prepare_id))
            .filter(payments::user_id.eq(user_id))
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_external_transaction_id_prepare_id_and_status(
        &self,
        external_transaction_id: String,
        prepare_id: i64,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .select(PaymentEntity::as_select())
            .filter(payments::external_transaction_id.eq(external_transaction_id))
            .filter(payments::prepare_id.eq(prepare_id))
            .filter(payments::status.eq(status.to_string()))
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn insert_pending(&self, payment: InsertPaymentEntity) -> Result<InsertPaymentOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = match insert_into(payments::table)
            .values(&payment)
            .on_conflict(payments::external_transaction_id)
            .do_nothing()
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()
        {
            Ok(created) => created,
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info))
                if info.constraint_name() == Some(PREPARE_ID_USER_ID_KEY) =>
            {
                return Ok(InsertPaymentOutcome::PrepareIdTaken);
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(created) = created {
            return Ok(InsertPaymentOutcome::Created(created));
        }

        let existing = payments::table
            .select(PaymentEntity::as_select())
            .filter(payments::external_transaction_id.eq(&payment.external_transaction_id))
            .first::<PaymentEntity>(&mut conn)?;

        Ok(InsertPaymentOutcome::Existing(existing))
    }

    async fn transition_status(
        &self,
        payment_id: i64,
        from: PaymentStatus,
        to: PaymentStatus,
        provider_error: Option<i32>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated_rows = update(
            payments::table
                .filter(payments::id.eq(payment_id))
                .filter(payments::status.eq(from.to_string())),
        )
        .set((
            payments::status.eq(to.to_string()),
            payments::provider_error.eq(provider_error),
            payments::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated_rows == 1)
    }
}
