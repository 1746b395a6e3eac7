mod common;

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use click_merchant::{
    application::usercases::click_webhook::ClickWebhookUseCase,
    config::config_model::Server,
    domain::{
        repositories::{app_users::MockAppUserRepository, payments::MockPaymentRepository},
        value_objects::enums::cancellation_scopes::CancellationScope,
    },
    infrastructure::axum_http::http_serve,
};
use common::{CallbackFields, SECRET, harness};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

fn server() -> Server {
    Server {
        port: 0,
        body_limit: 1,
        timeout: 30,
    }
}

async fn app() -> (Router, common::Harness) {
    let harness = harness(CancellationScope::User).await;
    let app = http_serve::app(harness.usecase.clone(), &server()).unwrap();
    (app, harness)
}

fn form_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn form_encoded_prepare_and_complete_round_the_flow() {
    let (app, harness) = app().await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/api/v1/click/prepare",
            CallbackFields::prepare("7001", "15000.00").to_form(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["error"], 0);
    assert_eq!(body["click_trans_id"], 7001);
    let prepare_id = body["merchant_prepare_id"].as_i64().unwrap();

    let response = app
        .oneshot(form_request(
            "/api/v1/click/complete",
            CallbackFields::complete("7001", prepare_id, "15000.00", 0).to_form(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["error"], 0);
    assert!(body["merchant_confirm_id"].is_i64());

    let stored = harness.payments.all().await;
    assert_eq!(stored[0].status, "paid");
}

#[tokio::test]
async fn json_payload_is_accepted_on_the_shared_callback_route() {
    let (app, _harness) = app().await;

    let response = app
        .oneshot(json_request(
            "/api/v1/click/callback",
            CallbackFields::prepare("7002", "100").to_json().to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["error"], 0);
    assert_eq!(body["merchant_trans_id"], "order-7002");
}

#[tokio::test]
async fn json_numbers_are_read_without_float_rounding() {
    let (app, harness) = app().await;
    let body = CallbackFields::prepare("7005", "12345678901234.10")
        .to_json()
        .to_string()
        .replace(r#""amount":"12345678901234.10""#, r#""amount":12345678901234.10"#)
        .replace(r#""click_trans_id":"7005""#, r#""click_trans_id":7005"#);
    assert!(body.contains(r#""amount":12345678901234.10"#));

    let response = app
        .oneshot(json_request("/api/v1/click/callback", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["error"], 0);
    assert_eq!(body["click_trans_id"], 7005);

    let stored = harness.payments.all().await;
    assert_eq!(stored[0].amount.to_string(), "12345678901234.10");
}

#[tokio::test]
async fn business_rejections_are_http_200() {
    let (app, _harness) = app().await;
    let mut fields = CallbackFields::prepare("7003", "100");
    fields.sign_string = "0".repeat(32);

    let response = app
        .oneshot(form_request("/api/v1/click/callback", fields.to_form()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["error"], -1);
    assert_eq!(body["error_note"], "Invalid sign_string");
}

#[tokio::test]
async fn unreadable_body_is_a_bad_request_code() {
    let (app, _harness) = app().await;

    let response = app
        .clone()
        .oneshot(json_request("/api/v1/click/callback", "{not json".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["error"], -8);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/click/callback")
        .body(Body::from("click_trans_id=1"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["error"], -8);
}

#[tokio::test]
async fn store_outage_is_a_503_without_internal_detail() {
    let mut payments = MockPaymentRepository::new();
    payments
        .expect_find_by_external_transaction_id_and_status()
        .returning(|_, _| Box::pin(async { Err(anyhow!("connection refused on 10.0.0.5")) }));
    let usecase = ClickWebhookUseCase::new(
        Arc::new(payments),
        Arc::new(MockAppUserRepository::new()),
        SECRET.to_string(),
        CancellationScope::User,
    );
    let app = http_serve::app(Arc::new(usecase), &server()).unwrap();

    let response = app
        .oneshot(form_request(
            "/api/v1/click/prepare",
            CallbackFields::prepare("7004", "100").to_form(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json(response).await;
    assert_eq!(body["code"], 503);
    assert_eq!(body["message"], "Service unavailable");
    assert!(!body.to_string().contains("10.0.0.5"));
}

#[tokio::test]
async fn health_check_and_fallback() {
    let (app, _harness) = app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health-check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/click/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
