use crate::models::appraisal::{AppraisalInput, Strategy, WATCH_CATEGORY};

const SYSTEM_PROMPT: &str = "You are a professional appraiser for the Japanese second-hand market. \
Answer with a single JSON object and nothing else.";

/// System and user messages for one completion call, plus image references.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingPrompt {
    pub system: String,
    pub user: String,
    pub image_urls: Vec<String>,
}

impl PricingPrompt {
    pub fn for_input(input: &AppraisalInput) -> Self {
        let mut user = format!(
            "Estimate a realistic buy-in price and resale price in JPY for the item below, \
based on current domestic second-hand market prices. Avoid prices that are unrealistically \
low or high; aim for prices at which trades actually close.\n\n\
[Item]\n\
Category: {category}\n\
Brand: {brand}\n\
Model: {model}\n\
Condition: {condition}\n\
Year: {year}\n\
Accessories: {accessories}\n\
Selling strategy: {strategy} ({hint})\n",
            category = input.category,
            brand = input.brand.as_deref().unwrap_or("unknown"),
            model = input.model.as_deref().unwrap_or("unknown"),
            condition = input.condition,
            year = input.year.as_deref().unwrap_or("unknown"),
            accessories = input.accessories.as_deref().unwrap_or("none"),
            strategy = input.strategy.as_str(),
            hint = strategy_hint(input.strategy),
        );

        if input.category == WATCH_CATEGORY {
            user.push_str(
                "\n[Watch notes]\n\
Consider the reference number, movement condition, whether box and papers are included, \
and recent auction and dealer prices for the same reference.\n",
            );
        }

        if !input.image_urls.is_empty() {
            user.push_str("\n[Images]\n");
            for url in &input.image_urls {
                user.push_str("- ");
                user.push_str(url);
                user.push('\n');
            }
        }

        user.push_str(
            "\n[Output format: JSON only]\n\
{\n  \"buyPrice\": number,\n  \"sellPrice\": number,\n  \"confidence\": number (0-100),\n  \
\"reason\": string,\n  \"warnings\": string[]\n}\n\n\
[Constraints]\n\
- sellPrice must not be lower than buyPrice\n\
- stay within +/-50% of the market price\n\
- when information is missing, lower confidence and explain why in warnings\n",
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
            image_urls: input.image_urls.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        if self.system.trim().is_empty() { issues.push("prompt.system is empty".into()); }
        if self.user.trim().is_empty() { issues.push("prompt.user is empty".into()); }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    /// Single-message form for providers without a separate system role.
    pub fn combined(&self) -> String {
        let system = self.system.trim();
        let user = self.user.trim();
        if system.is_empty() {
            user.to_string()
        } else {
            format!("{system}\n\nUser: {user}")
        }
    }
}

fn strategy_hint(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::QuickSell => "prioritise a fast sale; price towards the lower end of the market band",
        Strategy::Balance => "balance turnover speed and margin",
        Strategy::HighPrice => "prioritise margin; price towards the upper end of the market band",
    }
}
