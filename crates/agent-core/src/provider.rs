//! LLM Provider Strategy Pattern
//!
//! Defines the interface the agent uses to talk to a language model, plus an
//! explicit registry of provider factories.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{ProviderConfig, ProviderRegistry};
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register("ollama", |config| Ok(Arc::new(OllamaProvider::from_provider_config(config)?)));
//!
//! let provider = registry.create("ollama", &ProviderConfig::default())?;
//! let response = provider.generate_response(&messages, Some(&tools)).await;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::{Message, ToolCallRequest};
use crate::tool::ToolSchema;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "llama3.2", "mistral", "phi")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

const fn default_temperature() -> f32 {
    0.7
}
const fn default_max_tokens() -> u32 {
    2048
}
const fn default_top_p() -> f32 {
    0.9
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "llama3.2".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reply from a model: either final text or tool call requests
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Final textual answer
    pub content: Option<String>,

    /// Requested tool calls, in the order the model listed them
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,

    /// Model that generated this response
    #[serde(default)]
    pub model: Option<String>,

    /// Token usage statistics (if available)
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    /// Transport failure degraded into a readable answer
    pub fn error(err: impl fmt::Display) -> Self {
        Self::text(format!("Error: {err}"))
    }

    /// Collapse a fallible call into a response, logging the failure
    pub fn from_result(result: Result<Self>) -> Self {
        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Model call failed");
            Self::error(e)
        })
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn text_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub context_length: Option<u32>,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
///
/// `generate_response` never fails: transport errors must come back as a
/// [`ModelResponse::error`] so every turn still produces an answer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "ollama")
    fn name(&self) -> &str;

    /// Generate a response from the transcript, optionally offering tools
    async fn generate_response(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> ModelResponse;

    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(Vec::new())
    }
}

/// Settings handed to a provider factory
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub generation: GenerationOptions,

    /// Server host URL, provider default when absent
    #[serde(default)]
    pub host: Option<String>,

    /// Server port, provider default when absent
    #[serde(default)]
    pub port: Option<u16>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            generation: GenerationOptions {
                model: model.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Builds a provider from configuration
pub type ProviderFactory =
    Arc<dyn Fn(&ProviderConfig) -> Result<Arc<dyn LlmProvider>> + Send + Sync>;

/// Named provider factories, passed explicitly to whoever builds agents
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; replaces any earlier factory with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ProviderConfig) -> Result<Arc<dyn LlmProvider>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self
            .factories
            .insert(name.clone(), Arc::new(factory))
            .is_some()
        {
            tracing::warn!(provider = %name, "Provider already registered. Overwriting.");
        }
    }

    /// Instantiate a provider by name
    pub fn create(&self, name: &str, config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| AgentError::ProviderNotRegistered(name.to_string()))?;
        factory(config)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered provider names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate_response(
            &self,
            messages: &[Message],
            _tools: Option<&[ToolSchema]>,
        ) -> ModelResponse {
            ModelResponse::text(messages.last().map(Message::text).unwrap_or_default())
        }
    }

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 2048);
        assert_eq!(opts.model, "llama3.2");
    }

    #[test]
    fn test_error_response_is_text() {
        let response = ModelResponse::from_result(Err(AgentError::Provider("refused".into())));
        assert!(!response.has_tool_calls());
        assert_eq!(response.text_or_empty(), "Error: Provider error: refused");
    }

    #[tokio::test]
    async fn test_registry_creates_registered_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register("echo", |_| Ok(Arc::new(EchoProvider) as Arc<dyn LlmProvider>));

        let provider = registry.create("echo", &ProviderConfig::default()).unwrap();
        assert_eq!(provider.name(), "echo");
        assert!(provider.health_check().await.unwrap());

        let response = provider
            .generate_response(&[Message::user("ping")], None)
            .await;
        assert_eq!(response.text_or_empty(), "ping");
    }

    #[test]
    fn test_registry_unknown_provider() {
        let registry = ProviderRegistry::new();
        let err = registry
            .create("missing", &ProviderConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::ProviderNotRegistered(name) if name == "missing"));
    }
}
