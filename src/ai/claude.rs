//! Claude API integration.
//!
//! Implements the GenerationProvider trait for Claude. This is the
//! deep/reasoning provider used for documents and estimates.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GenerationProvider, PermanentKind, ProviderError};
use crate::core::ClaudeConfig;

/// Claude API provider.
pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeProvider {
    /// Create a new Claude provider.
    ///
    /// Reads API key from ANTHROPIC_API_KEY environment variable.
    pub fn new(config: &ClaudeConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY not set"))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl GenerationProvider for ClaudeProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message { role: "user".to_string(), content: prompt.to_string() }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &body));
        }

        let response: ClaudeResponse =
            response.json().await.map_err(|e| ProviderError::from_reqwest(&e))?;

        response
            .content
            .first()
            .map(|c| c.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::permanent(PermanentKind::Other, "No response from Claude"))
    }

    fn name(&self) -> &str {
        "claude"
    }
}

/// Claude API request structure.
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

/// Message in a Claude request.
#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

/// Claude API response structure.
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

/// Content block in a Claude response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_claude_provider_creation_fails_without_key() {
        // Clear the env var for this test
        std::env::remove_var("ANTHROPIC_API_KEY");
        let result = ClaudeProvider::new(&ClaudeConfig::default());
        assert!(result.is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_claude_provider_uses_config_model() {
        std::env::set_var("ANTHROPIC_API_KEY", "test-key");
        let config = ClaudeConfig { model: "claude-test".to_string(), max_tokens: 1000 };
        let provider = ClaudeProvider::new(&config).unwrap();
        std::env::remove_var("ANTHROPIC_API_KEY");

        assert_eq!(provider.model, "claude-test");
        assert_eq!(provider.max_tokens, 1000);
        assert_eq!(provider.name(), "claude");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"content":[{"type":"text","text":"<PRD>doc</PRD>"}]}"#;
        let response: ClaudeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content[0].text, "<PRD>doc</PRD>");
    }
}
