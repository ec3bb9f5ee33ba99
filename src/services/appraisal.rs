use std::time::Instant;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::context::AppContext;
use crate::error::{AppError, Result};
use crate::extract::extract_estimate;
use crate::models::appraisal::{AppraisalInput, AppraisalResult};
use crate::models::prompt::PricingPrompt;
use crate::models::sheet_row::SheetRow;
use crate::services::sheet_log;

pub struct Appraisal {
    pub result: AppraisalResult,
    pub log_task: Option<JoinHandle<bool>>,
}

/// The spreadsheet row is written in the background and never affects the result.
pub async fn appraise(ctx: &AppContext, input: AppraisalInput) -> Result<Appraisal> {
    let completion = ctx
        .completion
        .as_ref()
        .ok_or_else(|| AppError::Config("completion service not configured".into()))?;

    let prompt = PricingPrompt::for_input(&input);
    if let Err(issues) = prompt.validate() {
        return Err(AppError::Validation(issues.join(", ")));
    }

    let started = Instant::now();
    let timeout = ctx.settings.completion_timeout;
    let text = tokio::time::timeout(timeout, completion.complete(&prompt))
        .await
        .map_err(|_| {
            AppError::External(format!("completion timed out after {}s", timeout.as_secs()))
        })??;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if text.trim().is_empty() {
        return Err(AppError::MalformedModelOutput { raw: text });
    }

    let mut result = extract_estimate(&text, &ctx.settings.estimate).inspect_err(|e| {
        error!(
            error = %e,
            raw.preview = %text.chars().take(200).collect::<String>(),
            "completion text rejected"
        );
    })?;
    result.warnings.extend(input.notes.iter().cloned());

    info!(
        category = %input.category,
        strategy = input.strategy.as_str(),
        buy_price = result.buy_price,
        sell_price = result.sell_price,
        profit_rate = result.profit_rate,
        confidence = result.confidence,
        elapsed_ms,
        "appraisal complete"
    );

    let log_task = ctx.sheet.as_ref().map(|sheet| {
        sheet_log::spawn_append(
            sheet.clone(),
            SheetRow::from_appraisal(&input, &result, Utc::now()),
            ctx.settings.sheet_timeout,
            ctx.settings.sheet_retry_delay,
        )
    });

    Ok(Appraisal { result, log_task })
}
