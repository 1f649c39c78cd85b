//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference. Chat requests
//! go straight to `/api/chat` so tool schemas travel in the standard
//! function-calling format; model listing uses `ollama-rs`.

use std::sync::Arc;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, ToolCallRequest},
    provider::{GenerationOptions, LlmProvider, ModelInfo, ModelResponse, ProviderConfig, TokenUsage},
    shaping::{ContentOnly, MessageShaper, WireMessage},
    tool::{ToolSchema, parse_arguments},
};
use async_trait::async_trait;
use ollama_rs::Ollama;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Model and sampling options
    pub generation: GenerationOptions,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            timeout_secs: 120,
            generation: GenerationOptions::default(),
        }
    }
}

impl OllamaConfig {
    /// Fill unset fields of a factory config with the Ollama defaults
    pub fn from_provider_config(config: &ProviderConfig) -> Self {
        let defaults = Self::default();
        Self {
            host: config.host.clone().unwrap_or(defaults.host),
            port: config.port.unwrap_or(defaults.port),
            timeout_secs: config.timeout_secs.unwrap_or(defaults.timeout_secs),
            generation: config.generation.clone(),
        }
    }

    /// Server root with the port applied; the host must be an absolute
    /// `http` or `https` URL
    pub fn base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.host).map_err(|e| {
            AgentError::Config(format!(
                "OLLAMA_HOST must be an absolute URL such as http://localhost, got '{}': {e}",
                self.host
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AgentError::Config(format!(
                "OLLAMA_HOST must use http or https, got '{}'",
                self.host
            )));
        }
        url.set_port(Some(self.port)).map_err(|()| {
            AgentError::Config(format!("OLLAMA_HOST '{}' cannot take a port", self.host))
        })?;
        Ok(url)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSchema]>,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    message: ResponseMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    http: reqwest::Client,
    chat_url: Url,
    config: OllamaConfig,
    shaper: Arc<dyn MessageShaper>,
}

impl OllamaProvider {
    /// Create from configuration, flattening tool traffic to role + content
    pub fn from_config(config: OllamaConfig) -> Result<Self> {
        Self::with_shaper(config, ContentOnly)
    }

    /// Create with an explicit message-shaping strategy
    pub fn with_shaper(config: OllamaConfig, shaper: impl MessageShaper + 'static) -> Result<Self> {
        let base = config.base_url()?;
        let chat_url = base
            .join("api/chat")
            .map_err(|e| AgentError::Config(format!("chat endpoint: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client: Ollama::from_url(base),
            http,
            chat_url,
            config,
            shaper: Arc::new(shaper),
        })
    }

    /// Create from a registry factory config
    pub fn from_provider_config(config: &ProviderConfig) -> Result<Self> {
        Self::from_config(OllamaConfig::from_provider_config(config))
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn build_request<'a>(
        &'a self,
        messages: &[Message],
        tools: Option<&'a [ToolSchema]>,
    ) -> ChatRequest<'a> {
        let generation = &self.config.generation;
        ChatRequest {
            model: &generation.model,
            messages: self.shaper.shape(messages),
            stream: false,
            tools: tools.filter(|t| !t.is_empty()),
            options: ChatOptions {
                temperature: generation.temperature,
                top_p: generation.top_p,
                num_predict: generation.max_tokens,
            },
        }
    }

    /// Convert an Ollama chat response; tool calls only count when tools
    /// were offered
    fn convert_response(response: ChatResponse, tools_offered: bool, model: &str) -> ModelResponse {
        let tool_calls: Vec<ToolCallRequest> = if tools_offered {
            response
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| {
                    let request =
                        ToolCallRequest::new(call.function.name, parse_arguments(&call.function.arguments));
                    match call.id.filter(|id| !id.is_empty()) {
                        Some(id) => request.with_id(id),
                        None => request,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (None, None) => None,
            (prompt, completion) => {
                let prompt_tokens = prompt.unwrap_or(0);
                let completion_tokens = completion.unwrap_or(0);
                Some(TokenUsage {
                    prompt_tokens,
                    completion_tokens,
                    total_tokens: prompt_tokens.saturating_add(completion_tokens),
                })
            }
        };

        ModelResponse {
            // A reply requesting tools carries no final text
            content: if tool_calls.is_empty() {
                Some(response.message.content.unwrap_or_default())
            } else {
                None
            },
            tool_calls,
            model: Some(response.model.unwrap_or_else(|| model.to_string())),
            usage,
        }
    }

    async fn try_generate(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<ModelResponse> {
        let request = self.build_request(messages, tools);
        let tools_offered = request.tools.is_some();

        let response = self
            .http
            .post(self.chat_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AgentError::ProviderUnavailable(e.to_string())
                } else {
                    AgentError::Provider(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Provider(format!("HTTP {status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        Ok(Self::convert_response(
            body,
            tools_offered,
            &self.config.generation.model,
        ))
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate_response(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> ModelResponse {
        ModelResponse::from_result(self.try_generate(messages, tools).await)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
                context_length: None, // Not exposed by Ollama API
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use agent_core::{GeneralTools, NativeToolCalls, ToolProvider, ToolRegistry};
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> ChatResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 11434);
        let provider = OllamaProvider::from_config(config).unwrap();
        assert_eq!(provider.chat_url.as_str(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_host_without_scheme_is_config_error() {
        for host in ["localhost", "localhost:11434", "ftp://localhost"] {
            let config = OllamaConfig {
                host: host.into(),
                ..Default::default()
            };
            let err = OllamaProvider::from_config(config).err().unwrap();
            assert!(matches!(err, AgentError::Config(_)), "{host}: {err}");
        }
    }

    #[test]
    fn test_host_with_trailing_slash() {
        let config = OllamaConfig {
            host: "http://gpu-box/".into(),
            port: 8080,
            ..Default::default()
        };
        let provider = OllamaProvider::from_config(config).unwrap();
        assert_eq!(provider.chat_url.as_str(), "http://gpu-box:8080/api/chat");
    }

    #[test]
    fn test_config_from_provider_config() {
        let mut provider_config = ProviderConfig::for_model("mistral");
        provider_config.port = Some(8080);

        let config = OllamaConfig::from_provider_config(&provider_config);
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 8080);
        assert_eq!(config.generation.model, "mistral");
    }

    #[test]
    fn test_request_offers_tools_only_when_present() {
        let provider = OllamaProvider::from_config(OllamaConfig::default()).unwrap();
        let mut registry = ToolRegistry::new();
        registry.register_provider(GeneralTools);
        let schemas = registry.list_tools();
        let messages = vec![Message::system("sys"), Message::user("hi")];

        let with_tools = serde_json::to_value(provider.build_request(&messages, Some(schemas.as_slice()))).unwrap();
        assert_eq!(with_tools["stream"], json!(false));
        assert_eq!(with_tools["tools"].as_array().unwrap().len(), GeneralTools.tools().len());
        assert_eq!(with_tools["tools"][0]["type"], "function");
        assert_eq!(with_tools["messages"][1]["content"], "hi");

        let without = serde_json::to_value(provider.build_request(&messages, Some(&[][..]))).unwrap();
        assert!(without.get("tools").is_none());
    }

    #[test]
    fn test_shaper_is_pluggable() {
        let provider = OllamaProvider::with_shaper(OllamaConfig::default(), NativeToolCalls).unwrap();
        let messages = vec![
            Message::user("add"),
            Message::tool_call(ToolCallRequest::new("add", parse_arguments(&json!({"a": 1})))),
        ];

        let request = serde_json::to_value(provider.build_request(&messages, None)).unwrap();
        assert_eq!(request["messages"].as_array().unwrap().len(), 2);
        assert_eq!(request["messages"][1]["tool_calls"][0]["function"]["name"], "add");

        let flat = OllamaProvider::from_config(OllamaConfig::default()).unwrap();
        let request = serde_json::to_value(flat.build_request(&messages, None)).unwrap();
        assert_eq!(request["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_convert_text_response() {
        let response = parse(json!({
            "model": "llama3.2",
            "message": {"role": "assistant", "content": "hello"},
            "prompt_eval_count": 10,
            "eval_count": 5
        }));

        let converted = OllamaProvider::convert_response(response, true, "llama3.2");
        assert_eq!(converted.content.as_deref(), Some("hello"));
        assert!(!converted.has_tool_calls());
        assert_eq!(converted.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_usage_total_saturates() {
        let response = parse(json!({
            "message": {"content": "hi"},
            "prompt_eval_count": u32::MAX,
            "eval_count": 10
        }));

        let converted = OllamaProvider::convert_response(response, false, "llama3.2");
        assert_eq!(converted.usage.unwrap().total_tokens, u32::MAX);
    }

    #[test]
    fn test_convert_tool_calls() {
        let response = parse(json!({
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "add", "arguments": {"a": 2, "b": 3}}},
                    {"id": "call_7", "function": {"name": "echo", "arguments": "{\"text\": \"hi\"}"}},
                    {"function": {"name": "broken", "arguments": "{not json"}}
                ]
            }
        }));

        let converted = OllamaProvider::convert_response(response, true, "llama3.2");
        assert!(converted.content.is_none());
        assert_eq!(converted.tool_calls.len(), 3);

        let add = &converted.tool_calls[0];
        assert_eq!(add.name, "add");
        assert_eq!(add.arguments["b"], json!(3));
        assert!(!add.id.is_empty());

        assert_eq!(converted.tool_calls[1].id, "call_7");
        assert_eq!(converted.tool_calls[1].arguments["text"], json!("hi"));
        assert!(converted.tool_calls[2].arguments.is_empty());
        assert_eq!(converted.model.as_deref(), Some("llama3.2"));
    }

    #[test]
    fn test_tool_calls_ignored_when_not_offered() {
        let response = parse(json!({
            "message": {
                "content": "final answer",
                "tool_calls": [{"function": {"name": "add", "arguments": {}}}]
            }
        }));

        let converted = OllamaProvider::convert_response(response, false, "llama3.2");
        assert!(!converted.has_tool_calls());
        assert_eq!(converted.text_or_empty(), "final answer");
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_text() {
        let config = OllamaConfig {
            host: "http://127.0.0.1".into(),
            port: 1,
            timeout_secs: 5,
            ..Default::default()
        };
        let provider = OllamaProvider::from_config(config).unwrap();

        let response = provider
            .generate_response(&[Message::user("hi")], None)
            .await;
        assert!(!response.has_tool_calls());
        assert!(response.text_or_empty().starts_with("Error:"));
    }
}
