use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clients::SheetAppender;
use crate::error::{AppError, Result};
use crate::models::sheet_row::SheetRow;

const MAX_ATTEMPTS: u32 = 2;

pub async fn append_with_retry(
    sheet: &dyn SheetAppender,
    row: &SheetRow,
    attempt_timeout: Duration,
    retry_delay: Duration,
) -> Result<()> {
    let mut attempt = 1;
    loop {
        let err = match tokio::time::timeout(attempt_timeout, sheet.append_row(row)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e,
            Err(_) => AppError::External(format!(
                "sheet append timed out after {}ms",
                attempt_timeout.as_millis()
            )),
        };
        if attempt >= MAX_ATTEMPTS {
            return Err(err);
        }
        warn!(attempt, error = %err, "sheet append failed; retrying");
        tokio::time::sleep(retry_delay).await;
        attempt += 1;
    }
}

/// Resolves to whether the row was written.
pub fn spawn_append(
    sheet: Arc<dyn SheetAppender>,
    row: SheetRow,
    attempt_timeout: Duration,
    retry_delay: Duration,
) -> JoinHandle<bool> {
    tokio::spawn(async move {
        match append_with_retry(sheet.as_ref(), &row, attempt_timeout, retry_delay).await {
            Ok(()) => {
                info!(category = %row.category, "appraisal row appended");
                true
            }
            Err(e) => {
                warn!(error = %e, category = %row.category, "appraisal row dropped");
                false
            }
        }
    })
}
