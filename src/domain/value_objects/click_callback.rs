use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

use crate::domain::value_objects::enums::{
    click_actions::ClickAction, click_error_codes::ClickErrorCode,
};

/// A callback field as it arrives on the wire. Incoming values are always
/// text; `Integer` is used when echoing numeric ids back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScalarValue {
    Text(String),
    Integer(i64),
}

impl ScalarValue {
    /// Echoes a transaction id back the way Click expects it: numeric when the
    /// id is numeric, verbatim otherwise.
    pub fn from_external_id(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(number) => ScalarValue::Integer(number),
            Err(_) => ScalarValue::Text(value.to_string()),
        }
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Text(value) => f.write_str(value),
            ScalarValue::Integer(value) => write!(f, "{}", value),
        }
    }
}

// Click callback payload, prepare and complete share one shape
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawClickCallback {
    pub click_trans_id: Option<ScalarValue>,
    pub service_id: Option<ScalarValue>,
    pub click_paydoc_id: Option<ScalarValue>,
    pub merchant_trans_id: Option<ScalarValue>,
    pub merchant_prepare_id: Option<ScalarValue>,
    pub amount: Option<ScalarValue>,
    pub action: Option<ScalarValue>,
    pub error: Option<ScalarValue>,
    pub error_note: Option<String>,
    pub sign_time: Option<ScalarValue>,
    pub sign_string: Option<String>,
    pub param2: Option<ScalarValue>,
}

/// JSON body of a callback. Numbers are kept as their literal text, so an
/// amount such as `1000.10` never goes through a binary float.
#[derive(Debug, Deserialize)]
pub struct JsonClickCallback {
    click_trans_id: Option<Box<RawValue>>,
    service_id: Option<Box<RawValue>>,
    click_paydoc_id: Option<Box<RawValue>>,
    merchant_trans_id: Option<Box<RawValue>>,
    merchant_prepare_id: Option<Box<RawValue>>,
    amount: Option<Box<RawValue>>,
    action: Option<Box<RawValue>>,
    error: Option<Box<RawValue>>,
    error_note: Option<String>,
    sign_time: Option<Box<RawValue>>,
    sign_string: Option<String>,
    param2: Option<Box<RawValue>>,
}

impl TryFrom<JsonClickCallback> for RawClickCallback {
    type Error = serde_json::Error;

    fn try_from(json: JsonClickCallback) -> Result<Self, Self::Error> {
        Ok(Self {
            click_trans_id: literal(json.click_trans_id)?,
            service_id: literal(json.service_id)?,
            click_paydoc_id: literal(json.click_paydoc_id)?,
            merchant_trans_id: literal(json.merchant_trans_id)?,
            merchant_prepare_id: literal(json.merchant_prepare_id)?,
            amount: literal(json.amount)?,
            action: literal(json.action)?,
            error: literal(json.error)?,
            error_note: json.error_note,
            sign_time: literal(json.sign_time)?,
            sign_string: json.sign_string,
            param2: literal(json.param2)?,
        })
    }
}

fn literal(value: Option<Box<RawValue>>) -> Result<Option<ScalarValue>, serde_json::Error> {
    let Some(value) = value else {
        return Ok(None);
    };

    let raw = value.get().trim();
    if raw.starts_with('"') {
        serde_json::from_str::<String>(raw).map(|text| Some(ScalarValue::Text(text)))
    } else {
        Ok(Some(ScalarValue::Text(raw.to_string())))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackFormatError {
    #[error("unknown action")]
    UnknownAction,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` is malformed")]
    MalformedField(&'static str),
}

impl CallbackFormatError {
    pub fn error_code(&self) -> ClickErrorCode {
        match self {
            CallbackFormatError::UnknownAction => ClickErrorCode::ActionNotFound,
            CallbackFormatError::MissingField(_) | CallbackFormatError::MalformedField(_) => {
                ClickErrorCode::BadRequest
            }
        }
    }
}

/// A callback after coercion. Signed text fields keep their wire form; the
/// amount is signed from its numeric value.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickCallback {
    pub action: ClickAction,
    pub action_raw: String,
    pub click_trans_id: String,
    pub service_id: String,
    pub click_paydoc_id: Option<String>,
    pub merchant_trans_id: String,
    pub merchant_prepare_id_raw: Option<String>,
    pub merchant_prepare_id: Option<i64>,
    pub amount: Decimal,
    pub error: i32,
    pub error_note: Option<String>,
    pub sign_time: String,
    pub sign_string: String,
    pub param2: String,
}

impl RawClickCallback {
    /// Coerces the wire payload. The action is resolved first so an unknown
    /// action is reported as such whatever else the payload carries.
    pub fn normalize(self) -> Result<ClickCallback, CallbackFormatError> {
        let action_raw = text(self.action).ok_or(CallbackFormatError::UnknownAction)?;
        let action = action_raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(ClickAction::from_code)
            .ok_or(CallbackFormatError::UnknownAction)?;

        let click_trans_id = text(self.click_trans_id)
            .filter(|value| !value.is_empty())
            .ok_or(CallbackFormatError::MissingField("click_trans_id"))?;

        let amount = text(self.amount).ok_or(CallbackFormatError::MissingField("amount"))?;
        let amount = parse_amount(&amount)?;

        let merchant_prepare_id_raw = text(self.merchant_prepare_id);
        let merchant_prepare_id = match merchant_prepare_id_raw.as_deref() {
            Some(raw) => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| CallbackFormatError::MalformedField("merchant_prepare_id"))?,
            ),
            None => None,
        };
        if action == ClickAction::Complete && merchant_prepare_id.is_none() {
            return Err(CallbackFormatError::MissingField("merchant_prepare_id"));
        }

        let error = match text(self.error) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| CallbackFormatError::MalformedField("error"))?,
            _ => 0,
        };

        Ok(ClickCallback {
            action,
            action_raw,
            click_trans_id,
            service_id: text(self.service_id).unwrap_or_default(),
            click_paydoc_id: text(self.click_paydoc_id),
            merchant_trans_id: text(self.merchant_trans_id).unwrap_or_default(),
            merchant_prepare_id_raw,
            merchant_prepare_id,
            amount,
            error,
            error_note: self.error_note,
            sign_time: text(self.sign_time).unwrap_or_default(),
            sign_string: self.sign_string.unwrap_or_default(),
            param2: text(self.param2).unwrap_or_default(),
        })
    }
}

// Amounts are stored as NUMERIC(18, 2).
const AMOUNT_MAX_SCALE: u32 = 2;
const AMOUNT_MAX_INTEGER_DIGITS: u32 = 16;

/// Parses an amount that the payments table can hold without rounding.
fn parse_amount(raw: &str) -> Result<Decimal, CallbackFormatError> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|_| CallbackFormatError::MalformedField("amount"))?;

    let upper_bound = Decimal::from(10_i64.pow(AMOUNT_MAX_INTEGER_DIGITS));
    if amount.normalize().scale() > AMOUNT_MAX_SCALE || amount.abs() >= upper_bound {
        return Err(CallbackFormatError::MalformedField("amount"));
    }

    Ok(amount)
}

fn text(value: Option<ScalarValue>) -> Option<String> {
    value.map(|value| value.to_string())
}

/// Response body for every callback. Business failures travel here with HTTP 200.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClickResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_trans_id: Option<ScalarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_trans_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_prepare_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_confirm_id: Option<i64>,
    pub error: i32,
    pub error_note: String,
}

impl ClickResponse {
    pub fn rejected(code: ClickErrorCode) -> Self {
        Self::rejected_with_note(code, code.note())
    }

    pub fn rejected_with_note(code: ClickErrorCode, note: &str) -> Self {
        Self {
            click_trans_id: None,
            merchant_trans_id: None,
            merchant_prepare_id: None,
            merchant_confirm_id: None,
            error: code.code(),
            error_note: note.to_string(),
        }
    }

    pub fn prepared(callback: &ClickCallback, prepare_id: i64) -> Self {
        Self {
            click_trans_id: Some(ScalarValue::from_external_id(&callback.click_trans_id)),
            merchant_trans_id: Some(callback.merchant_trans_id.clone()),
            merchant_prepare_id: Some(prepare_id),
            merchant_confirm_id: None,
            error: ClickErrorCode::Success.code(),
            error_note: ClickErrorCode::Success.note().to_string(),
        }
    }

    pub fn completed(callback: &ClickCallback, confirm_id: i64) -> Self {
        Self {
            click_trans_id: Some(ScalarValue::from_external_id(&callback.click_trans_id)),
            merchant_trans_id: Some(callback.merchant_trans_id.clone()),
            merchant_prepare_id: None,
            merchant_confirm_id: Some(confirm_id),
            error: ClickErrorCode::Success.code(),
            error_note: ClickErrorCode::Success.note().to_string(),
        }
    }

    /// Echo of the provider's own failure code on a canceled Complete.
    pub fn provider_failure(provider_error: i32) -> Self {
        Self {
            click_trans_id: None,
            merchant_trans_id: None,
            merchant_prepare_id: None,
            merchant_confirm_id: None,
            error: provider_error,
            error_note: "Failed".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error == ClickErrorCode::Success.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw_prepare() -> RawClickCallback {
        RawClickCallback {
            click_trans_id: Some(ScalarValue::Integer(4209)),
            service_id: Some(ScalarValue::Text("8".to_string())),
            merchant_trans_id: Some(ScalarValue::Text("order-1".to_string())),
            amount: Some(ScalarValue::Text("1000.00".to_string())),
            action: Some(ScalarValue::Text("0".to_string())),
            sign_time: Some(ScalarValue::Text("2024-01-01 10:00:00".to_string())),
            sign_string: Some("deadbeef".to_string()),
            param2: Some(ScalarValue::Text(
                "5f0c6a5e-4b7e-4a53-9d2b-3c1f2f6f4e11".to_string(),
            )),
            ..Default::default()
        }
    }

    #[test]
    fn normalizes_prepare_and_keeps_wire_text_for_signed_fields() {
        let callback = raw_prepare().normalize().unwrap();

        assert_eq!(callback.action, ClickAction::Prepare);
        assert_eq!(callback.click_trans_id, "4209");
        assert_eq!(callback.amount, dec!(1000));
        assert_eq!(callback.error, 0);
        assert_eq!(callback.merchant_prepare_id, None);
    }

    #[test]
    fn unknown_or_missing_action_wins_over_other_format_problems() {
        let mut raw = RawClickCallback::default();
        raw.action = Some(ScalarValue::Integer(7));
        assert_eq!(raw.normalize(), Err(CallbackFormatError::UnknownAction));

        let mut raw = raw_prepare();
        raw.action = Some(ScalarValue::Text("prepare".to_string()));
        raw.amount = Some(ScalarValue::Text("lots".to_string()));
        assert_eq!(raw.normalize(), Err(CallbackFormatError::UnknownAction));

        assert_eq!(
            RawClickCallback::default().normalize(),
            Err(CallbackFormatError::UnknownAction)
        );
    }

    #[test]
    fn non_numeric_amount_is_a_bad_request() {
        let mut raw = raw_prepare();
        raw.amount = Some(ScalarValue::Text("10 sum".to_string()));

        let err = raw.normalize().unwrap_err();
        assert_eq!(err, CallbackFormatError::MalformedField("amount"));
        assert_eq!(err.error_code(), ClickErrorCode::BadRequest);
    }

    #[test]
    fn complete_requires_an_integer_prepare_id() {
        let mut raw = raw_prepare();
        raw.action = Some(ScalarValue::Integer(1));
        assert_eq!(
            raw.clone().normalize(),
            Err(CallbackFormatError::MissingField("merchant_prepare_id"))
        );

        raw.merchant_prepare_id = Some(ScalarValue::Text("abc".to_string()));
        assert_eq!(
            raw.clone().normalize(),
            Err(CallbackFormatError::MalformedField("merchant_prepare_id"))
        );

        raw.merchant_prepare_id = Some(ScalarValue::Integer(1_700_000_000_000));
        raw.error = Some(ScalarValue::Text("-5017".to_string()));
        let callback = raw.normalize().unwrap();
        assert_eq!(callback.merchant_prepare_id, Some(1_700_000_000_000));
        assert_eq!(callback.error, -5017);
    }

    #[test]
    fn json_numbers_keep_their_literal_digits() {
        let json: JsonClickCallback = serde_json::from_str(
            r#"{"click_trans_id": 4209, "amount": 1000.10, "action": 0,
                "param2": "x", "sign_time": null, "error": -5017}"#,
        )
        .unwrap();
        let raw = RawClickCallback::try_from(json).unwrap();

        assert_eq!(raw.click_trans_id, Some(ScalarValue::Text("4209".to_string())));
        assert_eq!(raw.amount, Some(ScalarValue::Text("1000.10".to_string())));
        assert_eq!(raw.param2, Some(ScalarValue::Text("x".to_string())));
        assert_eq!(raw.sign_time, None);

        let callback = raw.normalize().unwrap();
        assert_eq!(callback.amount, dec!(1000.10));
        assert_eq!(callback.error, -5017);

        let json: JsonClickCallback =
            serde_json::from_str(r#"{"action": 0, "amount": 12345678901234.57}"#).unwrap();
        let raw = RawClickCallback::try_from(json).unwrap();
        assert_eq!(
            raw.amount,
            Some(ScalarValue::Text("12345678901234.57".to_string()))
        );
    }

    #[test]
    fn amounts_the_payments_table_would_round_are_rejected() {
        let amount = |value: &str| {
            let mut raw = raw_prepare();
            raw.amount = Some(ScalarValue::Text(value.to_string()));
            raw.normalize().map(|callback| callback.amount)
        };

        assert_eq!(
            amount("1000.005"),
            Err(CallbackFormatError::MalformedField("amount"))
        );
        assert_eq!(
            amount("10000000000000000"),
            Err(CallbackFormatError::MalformedField("amount"))
        );
        assert_eq!(
            amount("-10000000000000000.00"),
            Err(CallbackFormatError::MalformedField("amount"))
        );

        assert_eq!(amount("1000.000"), Ok(dec!(1000)));
        assert_eq!(amount("9999999999999999.99"), Ok(dec!(9999999999999999.99)));
    }

    #[test]
    fn response_skips_absent_fields_and_echoes_numeric_ids() {
        let callback = raw_prepare().normalize().unwrap();

        let body = serde_json::to_value(ClickResponse::prepared(&callback, 42)).unwrap();
        assert_eq!(body["click_trans_id"], 4209);
        assert_eq!(body["merchant_prepare_id"], 42);
        assert_eq!(body["error"], 0);
        assert!(body.get("merchant_confirm_id").is_none());

        let body = serde_json::to_value(ClickResponse::rejected(ClickErrorCode::SignFailed))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": -1, "error_note": "Invalid sign_string"})
        );
    }
}
