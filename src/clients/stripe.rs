use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::clients::CheckoutService;
use crate::config::CheckoutConfig;
use crate::error::{AppError, Result};
use crate::models::checkout::{CheckoutRequest, CheckoutSession};

const API_BASE: &str = "https://api.stripe.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Subscription checkout sessions via the Stripe REST API.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(config: &CheckoutConfig) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            secret_key: config.secret_key.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }

    fn session_form<'a>(&'a self, req: &'a CheckoutRequest) -> [(&'static str, &'a str); 7] {
        [
            ("mode", "subscription"),
            ("payment_method_types[0]", "card"),
            ("customer_email", req.email.trim()),
            ("line_items[0][price]", req.price_id.trim()),
            ("line_items[0][quantity]", "1"),
            ("success_url", self.success_url.as_str()),
            ("cancel_url", self.cancel_url.as_str()),
        ]
    }
}

#[async_trait]
impl CheckoutService for StripeClient {
    async fn create_session(&self, req: &CheckoutRequest) -> Result<CheckoutSession> {
        info!(price_id = %req.price_id, "creating checkout session");
        let resp = self
            .http
            .post(format!("{API_BASE}/v1/checkout/sessions"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&self.session_form(req))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            return Err(AppError::External(format!("stripe returned {status}: {message}")));
        }
        let session: SessionResponse = resp.json().await?;
        let checkout_url = session
            .url
            .ok_or_else(|| AppError::External("stripe session has no url".into()))?;
        Ok(CheckoutSession { checkout_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_carries_subscription_line_item_and_redirects() {
        let client = StripeClient::new(&CheckoutConfig {
            secret_key: "sk_test".into(),
            success_url: "https://example.com/ok".into(),
            cancel_url: "https://example.com/cancel".into(),
        })
        .unwrap();
        let req = CheckoutRequest {
            price_id: " price_123 ".into(),
            email: "a@example.com".into(),
        };
        let form = client.session_form(&req);
        assert!(form.contains(&("mode", "subscription")));
        assert!(form.contains(&("line_items[0][price]", "price_123")));
        assert!(form.contains(&("customer_email", "a@example.com")));
        assert!(form.contains(&("cancel_url", "https://example.com/cancel")));
    }
}
