mod common;

use std::time::Duration;

use appraisal_api::handlers::price;
use appraisal_api::AppContext;
use common::*;
use serde_json::json;
use vercel_runtime::StatusCode;

#[tokio::test]
async fn successful_appraisal_uses_single_envelope() {
    let ctx = context(CannedCompletion::text(GOOD_ANSWER));
    let resp = price::handle(&ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "Content-Type"), Some("application/json"));
    assert_eq!(header(&resp, "Access-Control-Allow-Origin"), Some("*"));
    let body = json_body(&resp);
    assert_eq!(
        body,
        json!({
            "status": "ok",
            "result": {
                "buyPrice": 100000.0,
                "sellPrice": 150000.0,
                "profitRate": 0.5,
                "confidence": 80.0,
                "reason": "ok",
                "warnings": []
            }
        })
    );
}

#[tokio::test]
async fn prose_wrapped_answer_is_accepted() {
    let answer = "Here you go:\n{\"buyPrice\":100000,\"sellPrice\":150000,\"confidence\":80,\"reason\":\"ok\"}\nThanks.";
    let ctx = context(CannedCompletion::text(answer));
    let resp = price::handle(&ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(&resp)["result"]["sellPrice"], json!(150000.0));
}

#[tokio::test]
async fn prompt_carries_request_fields() {
    let completion = CannedCompletion::text(GOOD_ANSWER);
    let ctx = context(completion.clone());
    price::handle(&ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();

    let prompt = completion.last_prompt();
    assert!(prompt.user.contains("Brand: Louis Vuitton"));
    assert!(prompt.user.contains("Model: Speedy 30"));
    assert!(prompt.user.contains("Year: 2015"));
}

#[tokio::test]
async fn sheet_failure_does_not_change_the_response() {
    let healthy = RecordingSheet::ok();
    let broken = RecordingSheet::broken();
    let ok_ctx = context(CannedCompletion::text(GOOD_ANSWER)).with_sheet(healthy.clone());
    let broken_ctx = context(CannedCompletion::text(GOOD_ANSWER)).with_sheet(broken.clone());

    let a = price::handle(&ok_ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();
    let b = price::handle(&broken_ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();

    assert_eq!(a.status(), b.status());
    assert_eq!(json_body(&a), json_body(&b));

    healthy.wait_for_calls(1).await;
    broken.wait_for_calls(2).await;
    let rows = healthy.rows.lock().unwrap();
    assert_eq!(rows[0].category, "bag");
    assert_eq!(rows[0].year, "2015");
    assert_eq!(rows[0].profit_rate, 0.5);
}

#[tokio::test]
async fn preflight_is_empty_204_with_cors() {
    let ctx = context(CannedCompletion::text(GOOD_ANSWER));
    let resp = price::handle(&ctx, "OPTIONS", b"").await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.body().is_empty());
    assert_eq!(header(&resp, "Access-Control-Allow-Methods"), Some("POST, OPTIONS"));
    assert_eq!(header(&resp, "Access-Control-Allow-Headers"), Some("Content-Type"));
}

#[tokio::test]
async fn configured_origin_is_echoed() {
    let mut settings = settings();
    settings.cors_allow_origin = "https://shop.example.com".into();
    let ctx = AppContext::new(settings).with_completion(CannedCompletion::text(GOOD_ANSWER));
    let resp = price::handle(&ctx, "GET", b"").await.unwrap();
    assert_eq!(header(&resp, "Access-Control-Allow-Origin"), Some("https://shop.example.com"));
}

#[tokio::test]
async fn other_methods_are_405() {
    let ctx = context(CannedCompletion::text(GOOD_ANSWER));
    for method in ["GET", "PUT", "DELETE"] {
        let resp = price::handle(&ctx, method, b"").await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&resp, "Allow"), Some("POST, OPTIONS"));
        assert_eq!(json_body(&resp)["error"], "MethodNotAllowed");
    }
}

#[tokio::test]
async fn bad_requests_are_400() {
    let ctx = context(CannedCompletion::text(GOOD_ANSWER));
    for body in ["", "   ", "{not json", r#"{"brand":"Rolex"}"#] {
        let resp = price::handle(&ctx, "POST", body.as_bytes()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        let json = json_body(&resp);
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "InvalidRequest");
    }

    let resp = price::handle(&ctx, "POST", br#"{"condition":"A"}"#).await.unwrap();
    assert_eq!(json_body(&resp)["detail"], "category is empty");
}

#[tokio::test]
async fn unparseable_answer_is_500_with_raw_text() {
    let ctx = context(CannedCompletion::text("Sorry, I cannot help with that."));
    let resp = price::handle(&ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(&resp);
    assert_eq!(body["error"], "MalformedModelOutput");
    assert_eq!(body["detail"], "Sorry, I cannot help with that.");
}

#[tokio::test]
async fn inverted_prices_are_500_and_not_logged() {
    let sheet = RecordingSheet::ok();
    let ctx = context(CannedCompletion::text(r#"{"buyPrice":200000,"sellPrice":100000}"#))
        .with_sheet(sheet.clone());
    let resp = price::handle(&ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&resp)["error"], "InvalidPriceRelationship");
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(sheet.calls(), 0);
}

#[tokio::test]
async fn upstream_failure_and_timeout_are_500() {
    let ctx = context(CannedCompletion::failing("connection reset"));
    let resp = price::handle(&ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&resp)["error"], "UpstreamCallFailure");

    let mut settings = settings();
    settings.completion_timeout = Duration::from_millis(10);
    let ctx = AppContext::new(settings)
        .with_completion(CannedCompletion::slow(GOOD_ANSWER, Duration::from_millis(500)));
    let resp = price::handle(&ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(&resp)["detail"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn missing_completion_service_is_a_configuration_error() {
    let ctx = AppContext::new(settings());
    let resp = price::handle(&ctx, "POST", BAG_REQUEST.as_bytes()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&resp)["error"], "Configuration");
}

#[tokio::test]
async fn unknown_strategy_becomes_a_warning() {
    let ctx = context(CannedCompletion::text(GOOD_ANSWER));
    let body = r#"{"category":"camera","condition":"A","strategy":"auction"}"#;
    let resp = price::handle(&ctx, "POST", body.as_bytes()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let warnings = json_body(&resp)["result"]["warnings"].clone();
    assert_eq!(warnings, json!(["unknown strategy 'auction', using balance"]));
}
