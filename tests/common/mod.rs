#![allow(dead_code)]

use std::sync::Arc;

use click_merchant::{
    application::usercases::click_webhook::ClickWebhookUseCase,
    domain::value_objects::{
        click_callback::{RawClickCallback, ScalarValue},
        click_signature::{self, SignatureInput},
        enums::cancellation_scopes::CancellationScope,
    },
    infrastructure::in_memory::{app_users::InMemoryAppUserStore, payments::InMemoryPaymentStore},
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const SECRET: &str = "integration-secret";
pub const KNOWN_USER: &str = "0b6f3c2e-8a41-4d7b-9f0e-2c5d7a9b1e34";
pub const OTHER_USER: &str = "6a1d2f4b-3c5e-4f70-8a9b-0c1d2e3f4a5b";
pub const SIGN_TIME: &str = "2024-05-01 12:30:00";

pub struct Harness {
    pub usecase: Arc<ClickWebhookUseCase>,
    pub payments: InMemoryPaymentStore,
    pub users: InMemoryAppUserStore,
}

pub async fn harness(scope: CancellationScope) -> Harness {
    let payments = InMemoryPaymentStore::new();
    let users = InMemoryAppUserStore::new();
    users.insert(Uuid::parse_str(KNOWN_USER).unwrap()).await;
    users.insert(Uuid::parse_str(OTHER_USER).unwrap()).await;

    let usecase = ClickWebhookUseCase::new(
        Arc::new(payments.clone()),
        Arc::new(users.clone()),
        SECRET.to_string(),
        scope,
    );

    Harness {
        usecase: Arc::new(usecase),
        payments,
        users,
    }
}

/// Callback fields exactly as Click would send them over a form body.
#[derive(Debug, Clone)]
pub struct CallbackFields {
    pub click_trans_id: String,
    pub service_id: String,
    pub click_paydoc_id: String,
    pub merchant_trans_id: String,
    pub merchant_prepare_id: Option<String>,
    pub amount: String,
    pub action: String,
    pub error: String,
    pub error_note: String,
    pub sign_time: String,
    pub sign_string: String,
    pub param2: String,
}

impl CallbackFields {
    pub fn prepare(click_trans_id: &str, amount: &str) -> Self {
        Self {
            click_trans_id: click_trans_id.to_string(),
            service_id: "31337".to_string(),
            click_paydoc_id: format!("doc-{click_trans_id}"),
            merchant_trans_id: format!("order-{click_trans_id}"),
            merchant_prepare_id: None,
            amount: amount.to_string(),
            action: "0".to_string(),
            error: "0".to_string(),
            error_note: "Success".to_string(),
            sign_time: SIGN_TIME.to_string(),
            sign_string: String::new(),
            param2: KNOWN_USER.to_string(),
        }
        .signed()
    }

    pub fn complete(click_trans_id: &str, prepare_id: i64, amount: &str, error: i32) -> Self {
        Self {
            merchant_prepare_id: Some(prepare_id.to_string()),
            action: "1".to_string(),
            error: error.to_string(),
            ..Self::prepare(click_trans_id, amount)
        }
        .signed()
    }

    pub fn for_user(mut self, user: &str) -> Self {
        self.param2 = user.to_string();
        self.signed()
    }

    /// Re-signs with the shared secret after fields were changed. Click signs
    /// the amount as a number, so `1000.00` is signed as `1000`.
    pub fn signed(mut self) -> Self {
        let amount = match self.amount.trim().parse::<Decimal>() {
            Ok(amount) => click_signature::signed_amount(&amount),
            Err(_) => self.amount.clone(),
        };
        let input = SignatureInput {
            click_trans_id: &self.click_trans_id,
            service_id: &self.service_id,
            merchant_trans_id: &self.merchant_trans_id,
            merchant_prepare_id: self.merchant_prepare_id.as_deref(),
            amount,
            action: &self.action,
            sign_time: &self.sign_time,
        };
        self.sign_string = click_signature::sign(&input, SECRET);
        self
    }

    pub fn to_raw(&self) -> RawClickCallback {
        let text = |value: &str| Some(ScalarValue::Text(value.to_string()));
        RawClickCallback {
            click_trans_id: text(&self.click_trans_id),
            service_id: text(&self.service_id),
            click_paydoc_id: text(&self.click_paydoc_id),
            merchant_trans_id: text(&self.merchant_trans_id),
            merchant_prepare_id: self.merchant_prepare_id.as_deref().and_then(text),
            amount: text(&self.amount),
            action: text(&self.action),
            error: text(&self.error),
            error_note: Some(self.error_note.clone()),
            sign_time: text(&self.sign_time),
            sign_string: Some(self.sign_string.clone()),
            param2: text(&self.param2),
        }
    }

    pub fn to_form(&self) -> String {
        let mut pairs = vec![
            ("click_trans_id", self.click_trans_id.as_str()),
            ("service_id", self.service_id.as_str()),
            ("click_paydoc_id", self.click_paydoc_id.as_str()),
            ("merchant_trans_id", self.merchant_trans_id.as_str()),
            ("amount", self.amount.as_str()),
            ("action", self.action.as_str()),
            ("error", self.error.as_str()),
            ("error_note", self.error_note.as_str()),
            ("sign_time", self.sign_time.as_str()),
            ("sign_string", self.sign_string.as_str()),
            ("param2", self.param2.as_str()),
        ];
        if let Some(prepare_id) = self.merchant_prepare_id.as_deref() {
            pairs.push(("merchant_prepare_id", prepare_id));
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{key}={}", value.replace(' ', "%20")))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.to_raw()).unwrap()
    }
}
