use std::sync::Arc;

use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{error, warn};

use crate::{
    application::usercases::click_webhook::{ClickWebhookError, ClickWebhookUseCase},
    domain::value_objects::{
        click_callback::{ClickResponse, JsonClickCallback, RawClickCallback},
        enums::click_error_codes::ClickErrorCode,
    },
};

pub fn routes(usecase: Arc<ClickWebhookUseCase>) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .route("/prepare", post(callback))
        .route("/complete", post(callback))
        .with_state(usecase)
}

/// Click posts `application/x-www-form-urlencoded`; JSON is accepted for
/// tooling and manual replays.
pub async fn callback(
    State(usecase): State<Arc<ClickWebhookUseCase>>,
    request: Request,
) -> Response {
    let raw = match read_callback(request).await {
        Ok(raw) => raw,
        Err(reason) => {
            warn!(%reason, "click_webhook: unreadable callback body");
            let body = ClickResponse::rejected_with_note(ClickErrorCode::BadRequest, "Invalid request");
            return (StatusCode::OK, Json(body)).into_response();
        }
    };

    match usecase.handle_callback(raw).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => map_error(err),
    }
}

async fn read_callback(request: Request) -> Result<RawClickCallback, String> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|rejection| rejection.body_text())?;
        serde_json::from_slice::<JsonClickCallback>(&body)
            .and_then(RawClickCallback::try_from)
            .map_err(|err| err.to_string())
    } else {
        Form::<RawClickCallback>::from_request(request, &())
            .await
            .map(|Form(raw)| raw)
            .map_err(|rejection| rejection.body_text())
    }
}

fn map_error(err: ClickWebhookError) -> Response {
    error!(error = ?err, "click_webhook: callback failed");
    err.into_response()
}
