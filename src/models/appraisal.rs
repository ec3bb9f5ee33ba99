use serde::{Deserialize, Serialize};

pub const MAX_IMAGE_URLS: usize = 10;
pub const WATCH_CATEGORY: &str = "watch";

/// Selling strategy hint supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    QuickSell,
    #[default]
    Balance,
    HighPrice,
}

impl Strategy {
    /// Case-insensitive, accepts the spellings seen from existing callers.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "quick_sell" | "quick" | "fast" | "quicksell" => Some(Self::QuickSell),
            "balance" | "balanced" | "standard" => Some(Self::Balance),
            "high_price" | "high" | "max" | "highprice" => Some(Self::HighPrice),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuickSell => "quick_sell",
            Self::Balance => "balance",
            Self::HighPrice => "high_price",
        }
    }
}

/// `year` arrives either as a JSON number or a string.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum YearField {
    Number(serde_json::Number),
    Text(String),
}

impl YearField {
    fn normalized(&self) -> Option<String> {
        match self {
            YearField::Number(n) => Some(n.to_string()),
            YearField::Text(s) => non_empty(s),
        }
    }
}

/// Request body as sent by callers. Everything is optional on the wire;
/// [`AppraisalRequest::validate`] decides what is required.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub year: Option<YearField>,
    #[serde(default)]
    pub accessories: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default, alias = "images")]
    pub image_urls: Option<Vec<String>>,
}

/// Normalized, validated input.
#[derive(Debug, Clone, PartialEq)]
pub struct AppraisalInput {
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: String,
    pub year: Option<String>,
    pub accessories: Option<String>,
    pub strategy: Strategy,
    pub image_urls: Vec<String>,
    /// Notes produced while normalizing, surfaced in the result warnings.
    pub notes: Vec<String>,
}

impl AppraisalRequest {
    pub fn validate(&self) -> Result<AppraisalInput, Vec<String>> {
        let mut issues = Vec::new();
        let category = self.category.as_deref().and_then(non_empty);
        if category.is_none() {
            issues.push("category is empty".into());
        }
        let input = self.normalize(category.unwrap_or_default(), &mut issues);
        if issues.is_empty() { Ok(input) } else { Err(issues) }
    }

    /// Watch appraisals fix the category and need brand and model to be useful.
    pub fn validate_watch(&self) -> Result<AppraisalInput, Vec<String>> {
        let mut issues = Vec::new();
        let mut input = self.normalize(WATCH_CATEGORY.to_string(), &mut issues);
        if let Some(sent) = self.category.as_deref().and_then(non_empty) {
            if !sent.eq_ignore_ascii_case(WATCH_CATEGORY) {
                input.notes.push(format!("category '{sent}' ignored, appraised as {WATCH_CATEGORY}"));
            }
        }
        if input.brand.is_none() {
            issues.push("brand is empty".into());
        }
        if input.model.is_none() {
            issues.push("model is empty".into());
        }
        if issues.is_empty() { Ok(input) } else { Err(issues) }
    }

    fn normalize(&self, category: String, issues: &mut Vec<String>) -> AppraisalInput {
        let condition = self.condition.as_deref().and_then(non_empty);
        if condition.is_none() {
            issues.push("condition is empty".into());
        }

        let mut notes = Vec::new();
        let strategy = match self.strategy.as_deref().and_then(non_empty) {
            None => Strategy::default(),
            Some(raw) => Strategy::parse_loose(&raw).unwrap_or_else(|| {
                notes.push(format!("unknown strategy '{raw}', using balance"));
                Strategy::Balance
            }),
        };

        let image_urls: Vec<String> = self
            .image_urls
            .iter()
            .flatten()
            .filter_map(|u| non_empty(u))
            .collect();
        if image_urls.len() > MAX_IMAGE_URLS {
            issues.push(format!(
                "imageUrls has {} entries (max {MAX_IMAGE_URLS})",
                image_urls.len()
            ));
        }
        for url in &image_urls {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                issues.push(format!("imageUrls entry is not an http(s) URL: {url}"));
            }
        }

        AppraisalInput {
            category,
            brand: self.brand.as_deref().and_then(non_empty),
            model: self.model.as_deref().and_then(non_empty),
            condition: condition.unwrap_or_default(),
            year: self.year.as_ref().and_then(YearField::normalized),
            accessories: self.accessories.as_deref().and_then(non_empty),
            strategy,
            image_urls,
            notes,
        }
    }
}

/// Final appraisal returned to callers.
///
/// `profit_rate` is a fraction of the buy price; `confidence` is a 0–100 score.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalResult {
    pub buy_price: f64,
    pub sell_price: f64,
    pub profit_rate: f64,
    pub confidence: f64,
    pub reason: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}
