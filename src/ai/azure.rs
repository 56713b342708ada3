//! Azure OpenAI API integration.
//!
//! Implements the GenerationProvider trait for Azure OpenAI deployments.
//! This is the fast/structured provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GenerationProvider, PermanentKind, ProviderError};
use crate::core::AzureConfig;

const SYSTEM_PROMPT: &str = "You are an expert technical writer specializing in creating clear and concise functional requirements.";

/// Azure OpenAI API provider.
pub struct AzureOpenAIProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    max_tokens: u32,
}

impl AzureOpenAIProvider {
    /// Create a new Azure OpenAI provider from config and environment variables.
    ///
    /// Environment variables take precedence over config values:
    /// - AZURE_OPENAI_API_KEY (required)
    /// - AZURE_OPENAI_ENDPOINT
    /// - AZURE_OPENAI_DEPLOYMENT_NAME
    /// - AZURE_OPENAI_API_VERSION
    pub fn new(config: &AzureConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var("AZURE_OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("AZURE_OPENAI_API_KEY not set"))?;
        let endpoint = std::env::var("AZURE_OPENAI_ENDPOINT")
            .ok()
            .or_else(|| config.endpoint.clone())
            .ok_or_else(|| anyhow::anyhow!("AZURE_OPENAI_ENDPOINT not set"))?;
        let deployment =
            std::env::var("AZURE_OPENAI_DEPLOYMENT_NAME").unwrap_or_else(|_| config.deployment.clone());
        let api_version =
            std::env::var("AZURE_OPENAI_API_VERSION").unwrap_or_else(|_| config.api_version.clone());

        Ok(Self::from_config(endpoint, api_key, deployment)
            .with_api_version(api_version)
            .with_max_tokens(config.max_tokens))
    }

    /// Create from explicit config values.
    pub fn from_config(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: "2024-02-15-preview".to_string(),
            max_tokens: 2000,
        }
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the completion token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn url(&self) -> String {
        // {endpoint}/openai/deployments/{deployment}/chat/completions?api-version={api_version}
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

#[async_trait]
impl GenerationProvider for AzureOpenAIProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = AzureOpenAIRequest {
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user".to_string(), content: prompt.to_string() },
            ],
            max_tokens: Some(self.max_tokens),
            temperature: Some(0.7),
        };

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key) // Azure uses api-key header, not Bearer
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &body));
        }

        let response: AzureOpenAIResponse =
            response.json().await.map_err(|e| ProviderError::from_reqwest(&e))?;

        response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::permanent(PermanentKind::Other, "No response from Azure OpenAI"))
    }

    fn name(&self) -> &str {
        "azure"
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct AzureOpenAIRequest {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AzureOpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_provider_from_config() {
        let provider = AzureOpenAIProvider::from_config(
            "https://my-resource.openai.azure.com/",
            "test-key",
            "gpt-4o-mini",
        );
        assert_eq!(provider.deployment, "gpt-4o-mini");
        assert_eq!(
            provider.url(),
            "https://my-resource.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn test_azure_provider_with_api_version() {
        let provider = AzureOpenAIProvider::from_config(
            "https://my-resource.openai.azure.com",
            "test-key",
            "gpt-4",
        )
        .with_api_version("2024-06-01")
        .with_max_tokens(512);
        assert_eq!(provider.api_version, "2024-06-01");
        assert_eq!(provider.max_tokens, 512);
        assert_eq!(provider.name(), "azure");
    }

    #[test]
    #[serial_test::serial]
    fn test_azure_provider_requires_key() {
        std::env::remove_var("AZURE_OPENAI_API_KEY");
        let result = AzureOpenAIProvider::new(&AzureConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"  FR list  "}}]}"#;
        let response: AzureOpenAIResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content.trim(), "FR list");
    }
}
