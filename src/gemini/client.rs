use super::types::{GenerateContentRequest, GenerateContentResponse};
use super::Classifier;
use crate::config::GeminiConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// REST client for the generative-language API.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_content_chars: usize,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_max_idle_per_host(4)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_content_chars: config.max_content_chars,
        })
    }

    fn build_prompt(&self, content: &str, allowed_keys: &[String]) -> String {
        let truncated: String = content.chars().take(self.max_content_chars).collect();
        let keys_json = serde_json::to_string(allowed_keys).unwrap_or_else(|_| "[]".to_string());
        format!(
            "You are a rigid file classifier. Match the following text to THESE allowed keys strictly: {keys_json}.\n\
             Rules:\n\
             1. Output ONLY a JSON list of strings, e.g., [\"finance\", \"work-project\"].\n\
             2. If no keys match, output [].\n\
             \n\
             Text content (truncated):\n\
             {truncated}"
        )
    }
}

#[async_trait]
impl Classifier for GeminiClient {
    async fn classify(
        &self,
        path: &Path,
        content: &str,
        allowed_keys: &[String],
    ) -> Result<Vec<String>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateContentRequest::from_prompt(self.build_prompt(content, allowed_keys));

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("generateContent request failed for {}", path.display()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("generateContent failed ({}): {}", status, body);
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .context("failed to parse generateContent response")?;
        let text = parsed
            .first_text()
            .context("generateContent response had no candidates")?;
        parse_key_list(text)
    }
}

/// The model is told to answer with a bare JSON list, but routinely wraps it
/// in a ```json fence anyway. Strip fences before parsing.
pub fn parse_key_list(raw: &str) -> Result<Vec<String>> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    serde_json::from_str(cleaned)
        .with_context(|| format!("model reply was not a JSON list of strings: {}", cleaned))
}
