//! OpenAI-backed oracle implementation.
//! This sends the plain transcript and the search instructions to the chat
//! completions API and hands back the raw assistant text.

use super::{prompt, Oracle};
use crate::config::Config;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::trace;

/// Oracle that delegates to the OpenAI chat completion API.
pub struct OpenAiOracle {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiOracle {
    /// Create a new oracle from the resolved configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            url: config.chat_url(),
        }
    }

    /// Send a JSON body to the chat completions endpoint and return the JSON response.
    async fn post_chat(&self, body: Value) -> Result<Value> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = resp.error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    /// Ask the model for segments of `transcript` matching `instructions`.
    async fn propose(&self, transcript: &str, instructions: &str) -> Result<String> {
        trace!(
            "propose model={} transcript_bytes={}",
            self.model,
            transcript.len()
        );
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt::SYSTEM},
                {"role": "user", "content": format!("Transcript text: {transcript}\n\nPrompt: {instructions}")},
            ],
        });
        let value = self.post_chat(body).await?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("missing content"))?;
        Ok(content.to_string())
    }
}
