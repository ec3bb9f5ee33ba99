use async_trait::async_trait;
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use openai::Credentials;
use tracing::debug;

use crate::clients::CompletionService;
use crate::error::{AppError, Result};
use crate::models::prompt::PricingPrompt;

pub struct OpenAiClient {
    creds: Credentials,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, model: String, temperature: f32) -> Self {
        Self {
            creds: Credentials::new(api_key, base_url),
            model,
            temperature,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, prompt: &PricingPrompt) -> Result<String> {
        debug_log_preview(&prompt.system, &prompt.user);
        let messages = vec![
            message(ChatCompletionMessageRole::System, prompt.system.clone()),
            message(ChatCompletionMessageRole::User, prompt.user.clone()),
        ];

        let completion_res = ChatCompletion::builder(&self.model, messages)
            .temperature(self.temperature)
            .credentials(self.creds.clone())
            .create()
            .await;

        match completion_res {
            Ok(resp) => {
                let assistant = resp.choices.first()
                    .and_then(|c| c.message.content.as_ref())
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                debug!(model = %self.model, len = assistant.len(), "openai completion received");
                Ok(assistant)
            }
            Err(e) => Err(AppError::External(format!("openai: {e}"))),
        }
    }
}

fn message(role: ChatCompletionMessageRole, content: String) -> ChatCompletionMessage {
    ChatCompletionMessage {
        role,
        content: Some(content),
        name: None,
        function_call: None,
        tool_calls: None,
        tool_call_id: None,
    }
}

fn debug_log_preview(system: &str, user: &str) {
    debug!(
        system.len = system.len(),
        user.len = user.len(),
        system.preview = %system.chars().take(80).collect::<String>(),
        user.preview = %user.chars().take(80).collect::<String>(),
        "openai prompt"
    );
}
