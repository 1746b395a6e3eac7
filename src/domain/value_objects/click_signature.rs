use rust_decimal::Decimal;
use subtle::ConstantTimeEq;

use crate::domain::value_objects::{
    click_callback::ClickCallback, enums::click_actions::ClickAction,
};

/// Fields of a callback in the order Click concatenates them for `sign_string`.
///
/// The secret sits between `service_id` and `merchant_trans_id`, and only
/// Complete signs `merchant_prepare_id`. Click signs the amount as a number,
/// so `1000.00` on the wire is signed as `1000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInput<'a> {
    pub click_trans_id: &'a str,
    pub service_id: &'a str,
    pub merchant_trans_id: &'a str,
    pub merchant_prepare_id: Option<&'a str>,
    pub amount: String,
    pub action: &'a str,
    pub sign_time: &'a str,
}

impl<'a> SignatureInput<'a> {
    pub fn from_callback(callback: &'a ClickCallback) -> Self {
        let merchant_prepare_id = match callback.action {
            ClickAction::Prepare => None,
            ClickAction::Complete => Some(callback.merchant_prepare_id_raw.as_deref().unwrap_or("")),
        };

        Self {
            click_trans_id: &callback.click_trans_id,
            service_id: &callback.service_id,
            merchant_trans_id: &callback.merchant_trans_id,
            merchant_prepare_id,
            amount: signed_amount(&callback.amount),
            action: &callback.action_raw,
            sign_time: &callback.sign_time,
        }
    }

    pub fn ordered_parts<'s>(&'s self, secret: &'s str) -> Vec<&'s str> {
        let mut parts = vec![
            self.click_trans_id,
            self.service_id,
            secret,
            self.merchant_trans_id,
        ];
        if let Some(prepare_id) = self.merchant_prepare_id {
            parts.push(prepare_id);
        }
        parts.extend([self.amount.as_str(), self.action, self.sign_time]);
        parts
    }
}

/// Shortest decimal rendering of an amount, without trailing zeros.
pub fn signed_amount(amount: &Decimal) -> String {
    amount.normalize().to_string()
}

/// MD5 over the concatenated parts, rendered as lowercase hex.
pub fn digest_hex(parts: &[&str]) -> String {
    let mut context = md5::Context::new();
    for part in parts {
        context.consume(part.as_bytes());
    }
    format!("{:x}", context.compute())
}

pub fn sign(input: &SignatureInput<'_>, secret: &str) -> String {
    digest_hex(&input.ordered_parts(secret))
}

pub fn verify(input: &SignatureInput<'_>, secret: &str, candidate: &str) -> bool {
    let expected = sign(input, secret);
    let candidate = candidate.trim().to_ascii_lowercase();
    expected.as_bytes().ct_eq(candidate.as_bytes()).into()
}
