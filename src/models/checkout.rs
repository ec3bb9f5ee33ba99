use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub price_id: String,
    #[serde(default)]
    pub email: String,
}

impl CheckoutRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        if self.price_id.trim().is_empty() { issues.push("priceId is empty".into()); }
        if self.email.trim().is_empty() {
            issues.push("email is empty".into());
        } else if !self.email.contains('@') {
            issues.push("email is not an address".into());
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub checkout_url: String,
}
