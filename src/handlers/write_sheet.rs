use chrono::Utc;
use serde_json::json;
use vercel_runtime::{Body, Error, Response};

use super::{gate, issues, parse_body, respond, Gate, Reply};
use crate::context::AppContext;
use crate::error::{AppError, Result};
use crate::models::sheet_row::SheetRowRequest;
use crate::services::sheet_log::append_with_retry;

/// `POST /api/write-sheet`
pub async fn handle(ctx: &AppContext, method: &str, body: &[u8]) -> Result<Response<Body>, Error> {
    let outcome = run(ctx, method, body).await;
    respond(&ctx.settings.cors_allow_origin, "write-sheet", outcome)
}

async fn run(ctx: &AppContext, method: &str, body: &[u8]) -> Result<Reply> {
    let body = match gate(method, body)? {
        Gate::Preflight => return Ok(Reply::Preflight),
        Gate::Post(body) => body,
    };
    let req: SheetRowRequest = parse_body(body)?;
    req.validate().map_err(issues)?;
    let sheet = ctx
        .sheet
        .as_ref()
        .ok_or_else(|| AppError::Config("spreadsheet logging not configured".into()))?;
    let row = req.into_row(Utc::now());
    append_with_retry(
        sheet.as_ref(),
        &row,
        ctx.settings.sheet_timeout,
        ctx.settings.sheet_retry_delay,
    )
    .await?;
    Ok(Reply::Json(json!({"status": "ok"})))
}
