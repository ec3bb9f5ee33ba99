use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::extract::{EstimatePolicy, RelationshipPolicy};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.4;
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SHEETS_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SHEET_NAME: &str = "Sheet1";
const DEFAULT_REPAIR_RATIO: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct Config {
    pub completion: Option<CompletionConfig>,
    pub completion_timeout: Duration,
    pub estimate: EstimatePolicy,
    pub cors_allow_origin: String,
    pub sheets: Option<SheetsConfig>,
    pub checkout: Option<CheckoutConfig>,
}

#[derive(Debug, Clone)]
pub enum CompletionConfig {
    OpenAi {
        api_key: String,
        base_url: String,
        model: String,
        temperature: f32,
    },
    Gemini {
        model: String,
    },
}

impl CompletionConfig {
    pub fn provider(&self) -> &'static str {
        match self {
            CompletionConfig::OpenAi { .. } => "openai",
            CompletionConfig::Gemini { .. } => "gemini",
        }
    }
}

/// Service-account key material, as found in a Google credentials JSON file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub range: String,
    pub key: ServiceAccountKey,
    pub impersonate_user: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub secret_key: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let completion = CompletionConfig::from_lookup(&get)?;
        let completion_timeout = Duration::from_secs(parse_or(
            &get,
            "COMPLETION_TIMEOUT_SECS",
            DEFAULT_COMPLETION_TIMEOUT_SECS,
        )?);

        let missing_price = parse_or(&get, "PRICE_MISSING_DEFAULT", 0.0_f64)?;
        if !missing_price.is_finite() || missing_price < 0.0 {
            return Err(AppError::Config(format!(
                "PRICE_MISSING_DEFAULT must be a non-negative number, got {missing_price}"
            )));
        }
        let relationship = match get("PRICE_RELATIONSHIP_POLICY").as_deref().map(str::trim) {
            None | Some("reject") => RelationshipPolicy::Reject,
            Some("repair") => {
                let ratio = parse_or(&get, "PRICE_REPAIR_RATIO", DEFAULT_REPAIR_RATIO)?;
                if !(ratio > 0.0 && ratio <= 1.0) {
                    return Err(AppError::Config(format!(
                        "PRICE_REPAIR_RATIO must be in (0, 1], got {ratio}"
                    )));
                }
                RelationshipPolicy::Repair { ratio }
            }
            Some(other) => {
                return Err(AppError::Config(format!(
                    "PRICE_RELATIONSHIP_POLICY must be 'reject' or 'repair', got '{other}'"
                )))
            }
        };

        let sheets = match SheetsConfig::from_lookup(&get) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "spreadsheet logging disabled");
                None
            }
        };
        let checkout = match CheckoutConfig::from_lookup(&get) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "checkout disabled");
                None
            }
        };

        Ok(Self {
            completion,
            completion_timeout,
            estimate: EstimatePolicy {
                missing_price,
                relationship,
            },
            cors_allow_origin: get("CORS_ALLOW_ORIGIN").unwrap_or_else(|| "*".into()),
            sheets,
            checkout,
        })
    }
}

impl CompletionConfig {
    fn from_lookup<F>(get: &F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = get("COMPLETION_PROVIDER").unwrap_or_else(|| "openai".into());
        match provider.trim().to_ascii_lowercase().as_str() {
            "openai" => {
                let Some(api_key) = get("OPENAI_API_KEY").or_else(|| get("OPENAI_KEY")) else {
                    warn!("OPENAI_API_KEY not set; completion service unavailable");
                    return Ok(None);
                };
                Ok(Some(CompletionConfig::OpenAi {
                    api_key,
                    base_url: get("OPENAI_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
                    model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
                    temperature: parse_or(get, "OPENAI_TEMPERATURE", DEFAULT_TEMPERATURE)?,
                }))
            }
            "gemini" => {
                // gemini-rs reads GEMINI_API_KEY itself; only its presence is checked here.
                if get("GEMINI_API_KEY").is_none() {
                    warn!("GEMINI_API_KEY not set; completion service unavailable");
                    return Ok(None);
                }
                let model = get("GEMINI_MODEL")
                    .ok_or_else(|| AppError::Config("GEMINI_MODEL env var not set".into()))?;
                Ok(Some(CompletionConfig::Gemini { model }))
            }
            other => Err(AppError::Config(format!(
                "COMPLETION_PROVIDER must be 'openai' or 'gemini', got '{other}'"
            ))),
        }
    }
}

impl SheetsConfig {
    fn from_lookup<F>(get: &F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(spreadsheet_id) = get("SPREADSHEET_ID") else {
            return Ok(None);
        };
        let sheet_name = get("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.into());
        let range = get("SHEET_RANGE").unwrap_or_else(|| format!("{sheet_name}!A:O"));
        let key = service_account_key(get)?;
        Ok(Some(Self {
            spreadsheet_id,
            range,
            key,
            impersonate_user: get("GOOGLE_IMPERSONATE_USER"),
            timeout: Duration::from_secs(parse_or(
                get,
                "SHEETS_TIMEOUT_SECS",
                DEFAULT_SHEETS_TIMEOUT_SECS,
            )?),
        }))
    }
}

impl CheckoutConfig {
    fn from_lookup<F>(get: &F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(secret_key) = get("STRIPE_SECRET_KEY") else {
            return Ok(None);
        };
        let success_url = get("SUCCESS_URL")
            .ok_or_else(|| AppError::Config("SUCCESS_URL env var not set".into()))?;
        let cancel_url = get("CANCEL_URL")
            .ok_or_else(|| AppError::Config("CANCEL_URL env var not set".into()))?;
        Ok(Some(Self {
            secret_key,
            success_url,
            cancel_url,
        }))
    }
}

/// Keys pasted into env dashboards often carry literal `\n`.
fn service_account_key<F>(get: &F) -> Result<ServiceAccountKey>
where
    F: Fn(&str) -> Option<String>,
{
    let mut key = if let Some(raw) = get("GOOGLE_SERVICE_ACCOUNT_JSON") {
        serde_json::from_str::<ServiceAccountKey>(&raw).map_err(|e| {
            AppError::Config(format!(
                "GOOGLE_SERVICE_ACCOUNT_JSON is not valid service-account JSON: {e}"
            ))
        })?
    } else {
        let client_email = get("GOOGLE_CLIENT_EMAIL")
            .ok_or_else(|| AppError::Config("GOOGLE_CLIENT_EMAIL env var not set".into()))?;
        let private_key = get("GOOGLE_PRIVATE_KEY")
            .ok_or_else(|| AppError::Config("GOOGLE_PRIVATE_KEY env var not set".into()))?;
        ServiceAccountKey {
            client_email,
            private_key,
        }
    };
    key.private_key = key.private_key.replace("\\n", "\n");
    if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
        return Err(AppError::Config(
            "service account must include client_email and private_key".into(),
        ));
    }
    Ok(key)
}

fn parse_or<F, T>(get: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{name}: cannot parse '{raw}': {e}"))),
    }
}
