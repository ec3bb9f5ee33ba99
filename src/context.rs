use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::clients::gemini::GeminiClient;
use crate::clients::openai::OpenAiClient;
use crate::clients::sheets::SheetsClient;
use crate::clients::stripe::StripeClient;
use crate::clients::{CheckoutService, CompletionService, SheetAppender};
use crate::config::{CompletionConfig, Config};
use crate::error::Result;
use crate::extract::EstimatePolicy;

/// Per-process values every handler reads.
#[derive(Debug, Clone)]
pub struct Settings {
    pub estimate: EstimatePolicy,
    pub completion_timeout: Duration,
    pub sheet_timeout: Duration,
    pub sheet_retry_delay: Duration,
    pub cors_allow_origin: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            estimate: EstimatePolicy::default(),
            completion_timeout: Duration::from_secs(30),
            sheet_timeout: Duration::from_secs(10),
            sheet_retry_delay: Duration::from_millis(500),
            cors_allow_origin: "*".into(),
        }
    }
}

/// Shared, read-only handles built once at process start and borrowed by
/// every invocation.
#[derive(Clone, Default)]
pub struct AppContext {
    pub completion: Option<Arc<dyn CompletionService>>,
    pub sheet: Option<Arc<dyn SheetAppender>>,
    pub checkout: Option<Arc<dyn CheckoutService>>,
    pub settings: Settings,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn with_completion(mut self, completion: Arc<dyn CompletionService>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn with_sheet(mut self, sheet: Arc<dyn SheetAppender>) -> Self {
        self.sheet = Some(sheet);
        self
    }

    pub fn with_checkout(mut self, checkout: Arc<dyn CheckoutService>) -> Self {
        self.checkout = Some(checkout);
        self
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(&Config::from_env()?))
    }

    /// Collaborators that fail to build are left out and logged; the
    /// handlers that need them answer with a configuration error.
    pub fn from_config(config: &Config) -> Self {
        let settings = Settings {
            estimate: config.estimate,
            completion_timeout: config.completion_timeout,
            sheet_timeout: config
                .sheets
                .as_ref()
                .map(|s| s.timeout)
                .unwrap_or(Settings::default().sheet_timeout),
            cors_allow_origin: config.cors_allow_origin.clone(),
            ..Settings::default()
        };
        let mut ctx = Self::new(settings);

        if let Some(completion) = &config.completion {
            info!(provider = completion.provider(), "completion service configured");
            let client: Arc<dyn CompletionService> = match completion {
                CompletionConfig::OpenAi {
                    api_key,
                    base_url,
                    model,
                    temperature,
                } => Arc::new(OpenAiClient::new(
                    api_key.clone(),
                    base_url.clone(),
                    model.clone(),
                    *temperature,
                )),
                CompletionConfig::Gemini { model } => Arc::new(GeminiClient::new(model.clone())),
            };
            ctx.completion = Some(client);
        }

        match &config.sheets {
            Some(sheets) => match SheetsClient::new(sheets) {
                Ok(client) => {
                    info!(spreadsheet_id = %sheets.spreadsheet_id, range = %sheets.range, "spreadsheet logging enabled");
                    ctx.sheet = Some(Arc::new(client));
                }
                Err(e) => warn!(error = %e, "spreadsheet logging disabled"),
            },
            None => info!("SPREADSHEET_ID not set; spreadsheet logging disabled"),
        }

        match config.checkout.as_ref().map(StripeClient::new) {
            Some(Ok(client)) => ctx.checkout = Some(Arc::new(client)),
            Some(Err(e)) => warn!(error = %e, "checkout disabled"),
            None => {}
        }

        ctx
    }
}
