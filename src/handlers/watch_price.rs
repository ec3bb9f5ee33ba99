use serde_json::json;
use vercel_runtime::{Body, Error, Response};

use super::{gate, issues, parse_body, respond, Gate, Reply};
use crate::context::AppContext;
use crate::error::Result;
use crate::models::appraisal::AppraisalRequest;
use crate::services::appraisal::appraise;

/// `POST /api/watch-price`: watch appraisal; brand and model are required.
pub async fn handle(ctx: &AppContext, method: &str, body: &[u8]) -> Result<Response<Body>, Error> {
    let outcome = run(ctx, method, body).await;
    respond(&ctx.settings.cors_allow_origin, "watch-price", outcome)
}

async fn run(ctx: &AppContext, method: &str, body: &[u8]) -> Result<Reply> {
    let body = match gate(method, body)? {
        Gate::Preflight => return Ok(Reply::Preflight),
        Gate::Post(body) => body,
    };
    let req: AppraisalRequest = parse_body(body)?;
    let input = req.validate_watch().map_err(issues)?;
    let appraisal = appraise(ctx, input).await?;
    Ok(Reply::Json(json!({"status": "ok", "result": appraisal.result})))
}
