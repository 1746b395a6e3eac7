use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::usercases::click_webhook::ClickWebhookError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for ClickWebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Don't leak internal error detail to the provider
        let message = match self {
            ClickWebhookError::Store(_) => "Service unavailable",
            ClickWebhookError::Internal(_) => "Internal server error",
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message: message.to_string(),
        });

        (status, body).into_response()
    }
}
