#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use appraisal_api::clients::{CheckoutService, CompletionService, SheetAppender};
use appraisal_api::models::checkout::{CheckoutRequest, CheckoutSession};
use appraisal_api::models::prompt::PricingPrompt;
use appraisal_api::models::sheet_row::SheetRow;
use appraisal_api::{AppContext, AppError, Result, Settings};
use async_trait::async_trait;
use serde_json::Value;
use vercel_runtime::{Body, Response};

/// Completion fake answering every prompt with the same text.
pub struct CannedCompletion {
    pub answer: std::result::Result<String, String>,
    pub delay: Duration,
    pub prompts: Mutex<Vec<PricingPrompt>>,
}

impl CannedCompletion {
    pub fn text(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(answer: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            delay,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> PricingPrompt {
        self.prompts.lock().unwrap().last().cloned().expect("no prompt recorded")
    }
}

#[async_trait]
impl CompletionService for CannedCompletion {
    async fn complete(&self, prompt: &PricingPrompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        tokio::time::sleep(self.delay).await;
        self.answer.clone().map_err(AppError::External)
    }
}

/// Sheet fake that records rows, or fails every call.
#[derive(Default)]
pub struct RecordingSheet {
    pub fail: bool,
    pub rows: Mutex<Vec<SheetRow>>,
    pub calls: Mutex<u32>,
}

impl RecordingSheet {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }

    /// Wait for the background log task to reach the sheet.
    pub async fn wait_for_calls(&self, n: u32) {
        for _ in 0..200 {
            if self.calls() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("sheet saw {} calls, expected {n}", self.calls());
    }
}

#[async_trait]
impl SheetAppender for RecordingSheet {
    async fn append_row(&self, row: &SheetRow) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(AppError::External("network unreachable".into()));
        }
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }
}

pub struct FakeCheckout;

#[async_trait]
impl CheckoutService for FakeCheckout {
    async fn create_session(&self, req: &CheckoutRequest) -> Result<CheckoutSession> {
        Ok(CheckoutSession {
            checkout_url: format!("https://checkout.example.com/{}", req.price_id),
        })
    }
}

pub fn settings() -> Settings {
    Settings {
        sheet_retry_delay: Duration::from_millis(1),
        sheet_timeout: Duration::from_millis(500),
        ..Settings::default()
    }
}

pub fn context(completion: Arc<CannedCompletion>) -> AppContext {
    AppContext::new(settings()).with_completion(completion)
}

pub fn json_body(resp: &Response<Body>) -> Value {
    serde_json::from_slice(resp.body()).expect("response body is JSON")
}

pub fn header<'a>(resp: &'a Response<Body>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}

pub const GOOD_ANSWER: &str =
    r#"{"buyPrice":100000,"sellPrice":150000,"profitRate":12,"confidence":80,"reason":"ok","warnings":[]}"#;

pub const BAG_REQUEST: &str = r#"{"category":"bag","brand":"Louis Vuitton","model":"Speedy 30","condition":"B","year":2015,"strategy":"balance"}"#;
