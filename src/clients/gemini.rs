use async_trait::async_trait;
use tracing::debug;

use crate::clients::CompletionService;
use crate::error::{AppError, Result};
use crate::models::prompt::PricingPrompt;

/// Gemini chat. gemini-rs reads `GEMINI_API_KEY` from the environment itself.
pub struct GeminiClient {
    model: String,
}

impl GeminiClient {
    pub fn new(model: String) -> Self {
        Self { model }
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &PricingPrompt) -> Result<String> {
        // No separate system role here; fold it into the one message.
        let combined = prompt.combined();
        debug!(model = %self.model, len = combined.len(), "gemini prompt");

        let resp = gemini_rs::chat(&self.model)
            .send_message(&combined)
            .await
            .map_err(|e| AppError::External(format!("gemini: {e}")))?;
        Ok(resp.to_string())
    }
}
