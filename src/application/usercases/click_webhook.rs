use std::{ops::ControlFlow, sync::Arc};

use anyhow::anyhow;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::usercases::click_guards::{CompleteGuard, PrepareGuard},
    domain::{
        entities::payments::{InsertPaymentEntity, InsertPaymentOutcome, PaymentEntity},
        repositories::{app_users::AppUserRepository, payments::PaymentRepository},
        value_objects::{
            click_callback::{CallbackFormatError, ClickCallback, ClickResponse, RawClickCallback},
            click_signature::{self, SignatureInput},
            enums::{
                cancellation_scopes::CancellationScope, click_actions::ClickAction,
                click_error_codes::ClickErrorCode, payment_statuses::PaymentStatus,
            },
            prepare_ids::PrepareIdIssuer,
            user_identifiers::parse_user_identifier,
        },
    },
};

#[derive(Debug, Error)]
pub enum ClickWebhookError {
    #[error("payment store unavailable: {0}")]
    Store(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ClickWebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ClickWebhookError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            ClickWebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ClickWebhookError>;

const PREPARE_ID_ATTEMPTS: u32 = 5;

struct PrepareContext<'a> {
    callback: &'a ClickCallback,
    user_id: Option<Uuid>,
}

struct CompleteContext<'a> {
    callback: &'a ClickCallback,
    prepare_id: i64,
    user_id: Option<Uuid>,
    payment: Option<PaymentEntity>,
}

fn validated_user_id(user_id: Option<Uuid>) -> UseCaseResult<Uuid> {
    user_id.ok_or_else(|| anyhow!("user identifier guard has not run").into())
}

fn store_failure(operation: &'static str, click_trans_id: &str, err: anyhow::Error) -> ClickWebhookError {
    error!(
        %click_trans_id,
        operation,
        db_error = ?err,
        "click_webhook: payment store call failed"
    );
    ClickWebhookError::Store(err)
}

/// Two-phase Click callback handling: authenticates the callback, runs the
/// phase's guard chain and moves the payment through PENDING -> PAID/CANCELED.
pub struct ClickWebhookUseCase {
    payment_repository: Arc<dyn PaymentRepository + Send + Sync>,
    app_user_repository: Arc<dyn AppUserRepository + Send + Sync>,
    secret_key: String,
    cancellation_scope: CancellationScope,
    prepare_ids: PrepareIdIssuer,
}

impl ClickWebhookUseCase {
    pub fn new(
        payment_repository: Arc<dyn PaymentRepository + Send + Sync>,
        app_user_repository: Arc<dyn AppUserRepository + Send + Sync>,
        secret_key: String,
        cancellation_scope: CancellationScope,
    ) -> Self {
        Self {
            payment_repository,
            app_user_repository,
            secret_key,
            cancellation_scope,
            prepare_ids: PrepareIdIssuer::new(),
        }
    }

    /// Entry point for the HTTP layer: coerces the wire payload, then dispatches.
    pub async fn handle_callback(&self, raw: RawClickCallback) -> UseCaseResult<ClickResponse> {
        match raw.normalize() {
            Ok(callback) => self.dispatch(&callback).await,
            Err(err) => {
                let code = err.error_code();
                warn!(
                    reason = %err,
                    error_code = code.code(),
                    "click_webhook: callback payload rejected"
                );
                Ok(match err {
                    CallbackFormatError::UnknownAction => ClickResponse::rejected(code),
                    _ => ClickResponse::rejected_with_note(code, &err.to_string()),
                })
            }
        }
    }

    pub async fn dispatch(&self, callback: &ClickCallback) -> UseCaseResult<ClickResponse> {
        info!(
            click_trans_id = %callback.click_trans_id,
            click_paydoc_id = ?callback.click_paydoc_id,
            merchant_trans_id = %callback.merchant_trans_id,
            action = %callback.action,
            "click_webhook: callback received"
        );
        match callback.action {
            ClickAction::Prepare => self.prepare(callback).await,
            ClickAction::Complete => self.complete(callback).await,
        }
    }

    pub async fn prepare(&self, callback: &ClickCallback) -> UseCaseResult<ClickResponse> {
        let mut ctx = PrepareContext {
            callback,
            user_id: None,
        };

        for guard in PrepareGuard::ORDER {
            if self.check_prepare_guard(guard, &mut ctx).await?.is_break() {
                let (code, note) = guard.rejection();
                warn!(
                    click_trans_id = %callback.click_trans_id,
                    ?guard,
                    error_code = code.code(),
                    "click_webhook: prepare rejected"
                );
                return Ok(ClickResponse::rejected_with_note(code, note));
            }
        }

        let user_id = validated_user_id(ctx.user_id)?;

        for attempt in 1..=PREPARE_ID_ATTEMPTS {
            let new_payment = InsertPaymentEntity::pending(
                user_id,
                callback.click_trans_id.clone(),
                callback.merchant_trans_id.clone(),
                self.prepare_ids.next(),
                callback.amount,
            );
            let prepare_id = new_payment.prepare_id;

            let outcome = self
                .payment_repository
                .insert_pending(new_payment)
                .await
                .map_err(|err| store_failure("insert_pending", &callback.click_trans_id, err))?;

            match outcome {
                InsertPaymentOutcome::Created(payment) => {
                    info!(
                        click_trans_id = %callback.click_trans_id,
                        payment_id = payment.id,
                        prepare_id = payment.prepare_id,
                        %user_id,
                        amount = %payment.amount,
                        "click_webhook: payment prepared"
                    );
                    return Ok(ClickResponse::prepared(callback, payment.prepare_id));
                }
                InsertPaymentOutcome::Existing(payment) => {
                    return self.replayed_prepare(callback, user_id, payment);
                }
                InsertPaymentOutcome::PrepareIdTaken => {
                    warn!(
                        click_trans_id = %callback.click_trans_id,
                        prepare_id,
                        attempt,
                        "click_webhook: prepare id already used by this user, issuing another"
                    );
                }
            }
        }

        Err(anyhow!(
            "no free prepare id for transaction {} after {} attempts",
            callback.click_trans_id,
            PREPARE_ID_ATTEMPTS
        )
        .into())
    }

    /// A Prepare whose transaction id is already stored, either a provider
    /// redelivery or a concurrent duplicate that lost the insert.
    fn replayed_prepare(
        &self,
        callback: &ClickCallback,
        user_id: Uuid,
        payment: PaymentEntity,
    ) -> UseCaseResult<ClickResponse> {
        let rejection = match payment.payment_status()? {
            PaymentStatus::Paid => Some(ClickErrorCode::AlreadyPaid),
            PaymentStatus::Canceled => Some(ClickErrorCode::TransactionCanceled),
            PaymentStatus::Pending if payment.user_id != user_id => {
                Some(ClickErrorCode::BadRequest)
            }
            PaymentStatus::Pending if payment.amount != callback.amount => {
                Some(ClickErrorCode::InvalidAmount)
            }
            PaymentStatus::Pending => None,
        };

        match rejection {
            Some(code) => {
                warn!(
                    click_trans_id = %callback.click_trans_id,
                    payment_id = payment.id,
                    error_code = code.code(),
                    "click_webhook: replayed prepare conflicts with stored payment"
                );
                Ok(ClickResponse::rejected(code))
            }
            None => {
                info!(
                    click_trans_id = %callback.click_trans_id,
                    payment_id = payment.id,
                    prepare_id = payment.prepare_id,
                    "click_webhook: replayed prepare answered with stored prepare id"
                );
                Ok(ClickResponse::prepared(callback, payment.prepare_id))
            }
        }
    }

    async fn check_prepare_guard(
        &self,
        guard: PrepareGuard,
        ctx: &mut PrepareContext<'_>,
    ) -> UseCaseResult<ControlFlow<()>> {
        let callback = ctx.callback;
        let passed = match guard {
            PrepareGuard::Signature => self.signature_matches(callback),
            PrepareGuard::UserIdentifier => {
                ctx.user_id = parse_user_identifier(&callback.param2);
                ctx.user_id.is_some()
            }
            PrepareGuard::NotAlreadyPaid => self
                .find_by_transaction_and_status(callback, PaymentStatus::Paid)
                .await?
                .is_none(),
            PrepareGuard::NoPriorCancellation => {
                let canceled = match self.cancellation_scope {
                    CancellationScope::User => self
                        .payment_repository
                        .find_by_user_id_and_status(
                            validated_user_id(ctx.user_id)?,
                            PaymentStatus::Canceled,
                        )
                        .await
                        .map_err(|err| {
                            store_failure(
                                "find_by_user_id_and_status",
                                &callback.click_trans_id,
                                err,
                            )
                        })?,
                    CancellationScope::Transaction => {
                        self.find_by_transaction_and_status(callback, PaymentStatus::Canceled)
                            .await?
                    }
                };
                canceled.is_none()
            }
            PrepareGuard::UserExists => self.user_exists(callback, ctx.user_id).await?,
            PrepareGuard::TransactionNotCanceled => self
                .find_by_transaction_and_status(callback, PaymentStatus::Canceled)
                .await?
                .is_none(),
        };

        Ok(if passed {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        })
    }

    pub async fn complete(&self, callback: &ClickCallback) -> UseCaseResult<ClickResponse> {
        let prepare_id = callback
            .merchant_prepare_id
            .ok_or_else(|| anyhow!("complete callback without merchant_prepare_id"))?;
        let mut ctx = CompleteContext {
            callback,
            prepare_id,
            user_id: None,
            payment: None,
        };

        for guard in CompleteGuard::ORDER {
            if self.check_complete_guard(guard, &mut ctx).await?.is_break() {
                let (code, note) = guard.rejection();
                warn!(
                    click_trans_id = %callback.click_trans_id,
                    prepare_id,
                    ?guard,
                    error_code = code.code(),
                    "click_webhook: complete rejected"
                );
                return Ok(ClickResponse::rejected_with_note(code, note));
            }
        }

        let payment = ctx
            .payment
            .ok_or_else(|| anyhow!("complete guards passed without a prepared payment"))?;

        if callback.error > 0 {
            info!(
                click_trans_id = %callback.click_trans_id,
                payment_id = payment.id,
                provider_error = callback.error,
                provider_error_note = ?callback.error_note,
                "click_webhook: provider reported failure, canceling payment"
            );
            if !self
                .transition(callback, &payment, PaymentStatus::Canceled, Some(callback.error))
                .await?
            {
                return self.terminal_outcome(callback, payment.id).await;
            }
            return Ok(ClickResponse::provider_failure(callback.error));
        }

        if !self
            .transition(callback, &payment, PaymentStatus::Paid, None)
            .await?
        {
            return self.terminal_outcome(callback, payment.id).await;
        }

        info!(
            click_trans_id = %callback.click_trans_id,
            payment_id = payment.id,
            amount = %payment.amount,
            "click_webhook: payment marked paid"
        );
        Ok(ClickResponse::completed(callback, payment.id))
    }

    async fn check_complete_guard(
        &self,
        guard: CompleteGuard,
        ctx: &mut CompleteContext<'_>,
    ) -> UseCaseResult<ControlFlow<()>> {
        let callback = ctx.callback;
        let passed = match guard {
            CompleteGuard::Signature => self.signature_matches(callback),
            CompleteGuard::UserIdentifier => {
                ctx.user_id = parse_user_identifier(&callback.param2);
                ctx.user_id.is_some()
            }
            CompleteGuard::UserExists => self.user_exists(callback, ctx.user_id).await?,
            CompleteGuard::PaymentPrepared => {
                let payment = self
                    .payment_repository
                    .find_by_prepare_id_and_user_id(ctx.prepare_id, validated_user_id(ctx.user_id)?)
                    .await
                    .map_err(|err| {
                        store_failure(
                            "find_by_prepare_id_and_user_id",
                            &callback.click_trans_id,
                            err,
                        )
                    })?
                    .filter(|payment| payment.external_transaction_id == callback.click_trans_id);
                ctx.payment = payment;
                ctx.payment.is_some()
            }
            CompleteGuard::NotAlreadyPaid => self
                .payment_repository
                .find_by_external_transaction_id_prepare_id_and_status(
                    callback.click_trans_id.clone(),
                    ctx.prepare_id,
                    PaymentStatus::Paid,
                )
                .await
                .map_err(|err| {
                    store_failure(
                        "find_by_external_transaction_id_prepare_id_and_status",
                        &callback.click_trans_id,
                        err,
                    )
                })?
                .is_none(),
            CompleteGuard::NotCanceled => match ctx.payment.as_ref() {
                Some(payment) => payment.payment_status()? != PaymentStatus::Canceled,
                None => false,
            },
            CompleteGuard::AmountMatches => match ctx.payment.as_ref() {
                Some(payment) => payment.amount == callback.amount,
                None => false,
            },
        };

        Ok(if passed {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        })
    }

    async fn transition(
        &self,
        callback: &ClickCallback,
        payment: &PaymentEntity,
        to: PaymentStatus,
        provider_error: Option<i32>,
    ) -> UseCaseResult<bool> {
        self.payment_repository
            .transition_status(payment.id, PaymentStatus::Pending, to, provider_error)
            .await
            .map_err(|err| store_failure("transition_status", &callback.click_trans_id, err))
    }

    /// Re-reads a payment whose status changed under us and reports the state
    /// that won.
    async fn terminal_outcome(
        &self,
        callback: &ClickCallback,
        payment_id: i64,
    ) -> UseCaseResult<ClickResponse> {
        let current = self
            .payment_repository
            .find_by_id(payment_id)
            .await
            .map_err(|err| store_failure("find_by_id", &callback.click_trans_id, err))?;

        let code = match current {
            None => ClickErrorCode::TransactionNotFound,
            Some(payment) => match payment.payment_status()? {
                PaymentStatus::Paid => ClickErrorCode::AlreadyPaid,
                PaymentStatus::Canceled => ClickErrorCode::TransactionCanceled,
                PaymentStatus::Pending => {
                    return Err(anyhow!(
                        "payment {} still pending after a rejected status transition",
                        payment_id
                    )
                    .into());
                }
            },
        };

        warn!(
            click_trans_id = %callback.click_trans_id,
            payment_id,
            error_code = code.code(),
            "click_webhook: concurrent complete already settled the payment"
        );
        Ok(ClickResponse::rejected(code))
    }

    fn signature_matches(&self, callback: &ClickCallback) -> bool {
        click_signature::verify(
            &SignatureInput::from_callback(callback),
            &self.secret_key,
            &callback.sign_string,
        )
    }

    async fn user_exists(
        &self,
        callback: &ClickCallback,
        user_id: Option<Uuid>,
    ) -> UseCaseResult<bool> {
        self.app_user_repository
            .exists(validated_user_id(user_id)?)
            .await
            .map_err(|err| store_failure("app_user_exists", &callback.click_trans_id, err))
    }

    async fn find_by_transaction_and_status(
        &self,
        callback: &ClickCallback,
        status: PaymentStatus,
    ) -> UseCaseResult<Option<PaymentEntity>> {
        self.payment_repository
            .find_by_external_transaction_id_and_status(callback.click_trans_id.clone(), status)
            .await
            .map_err(|err| {
                store_failure(
                    "find_by_external_transaction_id_and_status",
                    &callback.click_trans_id,
                    err,
                )
            })
    }
}
