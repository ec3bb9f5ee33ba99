use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, warn};
use vercel_runtime::{Body, Error, Response, StatusCode};

use crate::error::{AppError, Result};
use crate::http::cors::preflight;
use crate::http::response::{error_response, json_response};

pub mod create_checkout;
pub mod price;
pub mod watch_price;
pub mod write_sheet;

enum Gate<'a> {
    Preflight,
    Post(&'a [u8]),
}

fn gate<'a>(method: &str, body: &'a [u8]) -> Result<Gate<'a>> {
    match method {
        "OPTIONS" => Ok(Gate::Preflight),
        "POST" => Ok(Gate::Post(body)),
        _ => Err(AppError::MethodNotAllowed),
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Validation("Empty body".into()));
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid JSON: {e}")))
}

fn issues(list: Vec<String>) -> AppError {
    AppError::Validation(list.join(", "))
}

enum Reply {
    Preflight,
    Json(Value),
}

fn respond(origin: &str, endpoint: &str, outcome: Result<Reply>) -> std::result::Result<Response<Body>, Error> {
    match outcome {
        Ok(Reply::Preflight) => Ok(preflight(origin)?),
        Ok(Reply::Json(value)) => Ok(json_response(origin, StatusCode::OK, &value)?),
        Err(err) => {
            let (status, body) = error_response(&err);
            if status.is_server_error() {
                error!(endpoint, kind = err.kind(), error = %err, "request failed");
            } else {
                warn!(endpoint, kind = err.kind(), error = %err, "request rejected");
            }
            Ok(json_response(origin, status, &body)?)
        }
    }
}
