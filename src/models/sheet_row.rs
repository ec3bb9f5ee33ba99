use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::extract::coerce_number;
use crate::models::appraisal::{AppraisalInput, AppraisalResult, YearField};

/// Column order of the appraisal log sheet.
pub const COLUMNS: [&str; 15] = [
    "timestamp",
    "category",
    "brand",
    "model",
    "condition",
    "year",
    "accessories",
    "strategy",
    "imageUrls",
    "imageCount",
    "buyPrice",
    "sellPrice",
    "profitRate",
    "confidence",
    "reason",
];

/// One appraisal log row, in [`COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetRow {
    pub timestamp: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub condition: String,
    pub year: String,
    pub accessories: String,
    pub strategy: String,
    pub image_urls: Vec<String>,
    pub buy_price: f64,
    pub sell_price: f64,
    pub profit_rate: f64,
    pub confidence: f64,
    pub reason: String,
}

impl SheetRow {
    pub fn from_appraisal(input: &AppraisalInput, result: &AppraisalResult, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            category: input.category.clone(),
            brand: input.brand.clone().unwrap_or_default(),
            model: input.model.clone().unwrap_or_default(),
            condition: input.condition.clone(),
            year: input.year.clone().unwrap_or_default(),
            accessories: input.accessories.clone().unwrap_or_default(),
            strategy: input.strategy.as_str().to_string(),
            image_urls: input.image_urls.clone(),
            buy_price: result.buy_price,
            sell_price: result.sell_price,
            profit_rate: result.profit_rate,
            confidence: result.confidence,
            reason: result.reason.clone(),
        }
    }

    /// Cell values for the Sheets `values` array.
    pub fn values(&self) -> Vec<Value> {
        vec![
            json!(self.timestamp),
            json!(self.category),
            json!(self.brand),
            json!(self.model),
            json!(self.condition),
            json!(self.year),
            json!(self.accessories),
            json!(self.strategy),
            json!(self.image_urls.join(",")),
            json!(self.image_urls.len()),
            json!(self.buy_price),
            json!(self.sell_price),
            json!(self.profit_rate),
            json!(self.confidence),
            json!(self.reason),
        ]
    }
}

/// Body accepted by the write-sheet endpoint. Nulls and missing values
/// become empty cells or zero; numbers may arrive as strings.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetRowRequest {
    #[serde(deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(deserialize_with = "lenient_text")]
    pub brand: String,
    #[serde(deserialize_with = "lenient_text")]
    pub model: String,
    #[serde(deserialize_with = "lenient_text")]
    pub condition: String,
    pub year: Option<YearField>,
    #[serde(deserialize_with = "lenient_text")]
    pub accessories: String,
    #[serde(deserialize_with = "lenient_text")]
    pub strategy: String,
    pub image_urls: Option<Vec<String>>,
    pub buy_price: Option<Value>,
    pub sell_price: Option<Value>,
    pub profit_rate: Option<Value>,
    pub confidence: Option<Value>,
    #[serde(deserialize_with = "lenient_text")]
    pub reason: String,
}

impl SheetRowRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        if self.category.trim().is_empty() { issues.push("category is empty".into()); }
        for (name, v) in self.numbers() {
            if cell_number(v).is_none() {
                issues.push(format!("{name} is not a number"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    pub fn into_row(self, at: DateTime<Utc>) -> SheetRow {
        let [buy_price, sell_price, profit_rate, confidence] =
            self.numbers().map(|(_, v)| cell_number(v).unwrap_or(0.0));
        let year = match self.year {
            Some(YearField::Number(n)) => n.to_string(),
            Some(YearField::Text(s)) => s.trim().to_string(),
            None => String::new(),
        };
        SheetRow {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            category: self.category.trim().to_string(),
            brand: self.brand,
            model: self.model,
            condition: self.condition,
            year,
            accessories: self.accessories,
            strategy: self.strategy,
            image_urls: self
                .image_urls
                .unwrap_or_default()
                .into_iter()
                .filter(|u| !u.trim().is_empty())
                .collect(),
            buy_price,
            sell_price,
            profit_rate,
            confidence,
            reason: self.reason,
        }
    }

    fn numbers(&self) -> [(&'static str, Option<&Value>); 4] {
        [
            ("buyPrice", self.buy_price.as_ref()),
            ("sellPrice", self.sell_price.as_ref()),
            ("profitRate", self.profit_rate.as_ref()),
            ("confidence", self.confidence.as_ref()),
        ]
    }
}

/// Missing, null and blank cells are zero; anything else must coerce.
fn cell_number(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::String(s)) if s.trim().is_empty() => Some(0.0),
        Some(v) => coerce_number(v),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
