use serde_json::{json, Value};
use vercel_runtime::{Body, Response, StatusCode};

use crate::error::AppError;
use crate::http::cors::{cors_headers, ALLOW_METHODS};

pub fn error_response(err: &AppError) -> (StatusCode, Value) {
    match err {
        AppError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            error_body(err, "Validation failed", Some(msg)),
        ),
        AppError::MethodNotAllowed => (
            StatusCode::METHOD_NOT_ALLOWED,
            error_body(err, "Use POST with a JSON body", None),
        ),
        AppError::External(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(err, "Upstream service call failed", Some(msg)),
        ),
        AppError::MalformedModelOutput { raw } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(err, "Model output could not be parsed", Some(raw)),
        ),
        AppError::InvalidPriceRelationship { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(err, &err.to_string(), None),
        ),
        AppError::Config(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(err, "Service is not configured", Some(msg)),
        ),
        AppError::Other(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(err, "Internal error", Some(&e.to_string())),
        ),
    }
}

fn error_body(err: &AppError, message: &str, detail: Option<&str>) -> Value {
    let mut body = json!({"status": "error", "error": err.kind(), "message": message});
    if let Some(detail) = detail {
        body["detail"] = json!(detail);
    }
    body
}

pub fn json_response<T: serde::Serialize>(
    origin: &str,
    status: StatusCode,
    value: &T,
) -> anyhow::Result<Response<Body>> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json");
    for (name, header) in cors_headers(origin) {
        builder = builder.header(name, header);
    }
    if status == StatusCode::METHOD_NOT_ALLOWED {
        builder = builder.header("Allow", ALLOW_METHODS);
    }
    Ok(builder.body(serde_json::to_string(value)?.into())?)
}
