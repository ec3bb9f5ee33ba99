use async_trait::async_trait;

use crate::error::Result;
use crate::models::checkout::{CheckoutRequest, CheckoutSession};
use crate::models::prompt::PricingPrompt;
use crate::models::sheet_row::SheetRow;

pub mod gemini;
pub mod openai;
pub mod sheets;
pub mod stripe;

/// Text-generation service returning one completion per prompt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &PricingPrompt) -> Result<String>;
}

/// Tabular log sink that appends one row per call.
#[async_trait]
pub trait SheetAppender: Send + Sync {
    async fn append_row(&self, row: &SheetRow) -> Result<()>;
}

#[async_trait]
pub trait CheckoutService: Send + Sync {
    async fn create_session(&self, req: &CheckoutRequest) -> Result<CheckoutSession>;
}
