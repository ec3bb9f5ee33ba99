use serde_json::json;
use vercel_runtime::{Body, Error, Response};

use super::{gate, issues, parse_body, respond, Gate, Reply};
use crate::context::AppContext;
use crate::error::{AppError, Result};
use crate::models::checkout::CheckoutRequest;

/// `POST /api/create-checkout`: start a subscription checkout session.
pub async fn handle(ctx: &AppContext, method: &str, body: &[u8]) -> Result<Response<Body>, Error> {
    let outcome = run(ctx, method, body).await;
    respond(&ctx.settings.cors_allow_origin, "create-checkout", outcome)
}

async fn run(ctx: &AppContext, method: &str, body: &[u8]) -> Result<Reply> {
    let body = match gate(method, body)? {
        Gate::Preflight => return Ok(Reply::Preflight),
        Gate::Post(body) => body,
    };
    let req: CheckoutRequest = parse_body(body)?;
    req.validate().map_err(issues)?;
    let checkout = ctx
        .checkout
        .as_ref()
        .ok_or_else(|| AppError::Config("checkout not configured".into()))?;
    let session = checkout.create_session(&req).await?;
    Ok(Reply::Json(json!({"status": "ok", "checkoutUrl": session.checkout_url})))
}
