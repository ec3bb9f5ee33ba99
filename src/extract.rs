use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::appraisal::AppraisalResult;

const DEFAULT_CONFIDENCE: f64 = 50.0;

/// What to do when the model proposes `sellPrice < buyPrice`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelationshipPolicy {
    Reject,
    /// Lower the buy price to `floor(sellPrice * ratio)`.
    Repair { ratio: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatePolicy {
    pub missing_price: f64,
    pub relationship: RelationshipPolicy,
}

impl Default for EstimatePolicy {
    fn default() -> Self {
        Self {
            missing_price: 0.0,
            relationship: RelationshipPolicy::Reject,
        }
    }
}

pub fn extract_estimate(raw: &str, policy: &EstimatePolicy) -> Result<AppraisalResult> {
    let object = parse_object(raw).ok_or_else(|| AppError::MalformedModelOutput {
        raw: raw.to_string(),
    })?;

    let mut buy_price = price_field(&object, "buyPrice").unwrap_or(policy.missing_price);
    let sell_price = price_field(&object, "sellPrice").unwrap_or(policy.missing_price);
    let mut warnings = string_list(object.get("warnings"));

    if buy_price > sell_price {
        match policy.relationship {
            RelationshipPolicy::Repair { ratio } if sell_price > 0.0 => {
                let repaired = (sell_price * ratio).floor();
                warnings.push(format!(
                    "buy price {buy_price} exceeded sell price {sell_price}; lowered to {repaired}"
                ));
                buy_price = repaired;
            }
            _ => {
                return Err(AppError::InvalidPriceRelationship {
                    buy_price,
                    sell_price,
                })
            }
        }
    }
    if buy_price <= 0.0 {
        return Err(AppError::InvalidPriceRelationship {
            buy_price,
            sell_price,
        });
    }

    Ok(AppraisalResult {
        buy_price,
        sell_price,
        profit_rate: profit_rate(buy_price, sell_price),
        confidence: confidence_score(object.get("confidence").and_then(coerce_number)),
        reason: object
            .get("reason")
            .map(|v| match v {
                Value::String(s) => s.trim().to_string(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .unwrap_or_default(),
        warnings,
    })
}

pub fn profit_rate(buy_price: f64, sell_price: f64) -> f64 {
    if buy_price > 0.0 {
        (sell_price - buy_price) / buy_price
    } else {
        0.0
    }
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw.trim()) {
        return Some(map);
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn price_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object.get(key).and_then(coerce_number)
}

/// Accepts JSON numbers and numeric strings such as `"¥150,000"`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_end_matches("JPY")
                .trim_end_matches('円')
                .chars()
                .filter(|c| !matches!(c, ',' | '¥' | '￥' | '$' | ' ' | '_'))
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Values in (0, 1] are read as fractions.
fn confidence_score(raw: Option<f64>) -> f64 {
    match raw {
        None => DEFAULT_CONFIDENCE,
        Some(v) if v > 0.0 && v <= 1.0 => v * 100.0,
        Some(v) => v.clamp(0.0, 100.0),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
