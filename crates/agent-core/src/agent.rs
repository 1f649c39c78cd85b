//! Agent Orchestrator
//!
//! Runs one user turn at a time: a first model call that may request tools,
//! sequential dispatch of every requested tool, and a second model call that
//! must produce the final answer. A turn therefore takes at most two model
//! round-trips.

use std::sync::Arc;
use std::time::Duration;

use crate::context::{ContextWindow, FullHistory};
use crate::error::{AgentError, Result, ToolError, ToolErrorKind};
use crate::message::{Message, ToolCallRequest};
use crate::provider::{LlmProvider, ModelResponse};
use crate::state::ConversationState;
use crate::tool::{Tool, ToolContext, ToolProvider, ToolRegistry, ToolResult, ToolSchema};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant with access to tools. \
Use them when appropriate to provide accurate information.";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Display name
    pub name: String,

    /// First message of every conversation
    pub system_prompt: String,

    /// Trace every appended message and tool invocation
    pub verbose: bool,

    /// Upper bound for a single tool invocation
    pub tool_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Agent".into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            verbose: false,
            tool_timeout: None,
        }
    }
}

/// Everything one turn produced
#[derive(Clone, Debug)]
pub struct TurnReport {
    /// Final answer returned to the caller
    pub reply: String,

    /// Tool outcomes in the order the model requested them
    pub tool_results: Vec<ToolResult>,

    /// Model round-trips taken (1 or 2)
    pub model_calls: usize,
}

/// Binds one conversation, one tool registry and one model client
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    context: Arc<dyn ContextWindow>,
    config: AgentConfig,
    state: ConversationState,
}

impl Agent {
    /// Create a new agent; the log starts with the system prompt
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        verbose: bool,
    ) -> Self {
        let config = AgentConfig {
            name: name.into(),
            system_prompt: system_prompt.into(),
            verbose,
            ..Default::default()
        };
        Self::from_config(config, provider, tools)
    }

    pub fn from_config(
        config: AgentConfig,
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let state = ConversationState::with_system_prompt(config.system_prompt.clone());
        Self {
            provider,
            tools,
            context: Arc::new(FullHistory),
            config,
            state,
        }
    }

    /// Replace the strategy selecting which messages reach the model
    pub fn with_context_window(mut self, window: impl ContextWindow + 'static) -> Self {
        self.context = Arc::new(window);
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Store cross-turn scratch data visible to tools
    pub fn remember(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.state.store_memory(key, value);
    }

    /// Process user input and return the agent's answer.
    ///
    /// Never fails: tool and model failures surface as text.
    pub async fn process_input(&mut self, input: &str) -> String {
        self.process_turn(input).await.reply
    }

    /// Like [`Agent::process_input`], also returning the tool outcomes
    pub async fn process_turn(&mut self, input: &str) -> TurnReport {
        self.record(Message::user(input));

        let schemas = self.tools.list_tools();
        let offered = (!schemas.is_empty()).then_some(schemas.as_slice());
        if self.config.verbose {
            tracing::debug!(agent = %self.config.name, tools = schemas.len(), "Sending request to model");
        }
        let response = self.call_model(offered).await;

        if !response.has_tool_calls() {
            if self.config.verbose {
                tracing::debug!(agent = %self.config.name, "No tool calls requested, returning direct response");
            }
            let reply = response.content.unwrap_or_default();
            self.record(Message::assistant(reply.clone()));
            return TurnReport {
                reply,
                tool_results: Vec::new(),
                model_calls: 1,
            };
        }

        if self.config.verbose {
            tracing::debug!(
                agent = %self.config.name,
                count = response.tool_calls.len(),
                "Model requested tool calls"
            );
        }

        // Every requested call runs, in order, even after a failure
        let mut tool_results = Vec::with_capacity(response.tool_calls.len());
        for call in response.tool_calls {
            self.record(Message::tool_call(call.clone()));

            let result = self.execute_tool(&call).await;
            if let Ok(value) = &result.outcome {
                self.state.store_tool_result(&call.name, value.clone());
            }

            self.record(Message::tool(result.render(), Some(call.id)));
            tool_results.push(result);
        }

        if self.config.verbose {
            tracing::debug!(agent = %self.config.name, "Getting final response after tool execution");
        }
        let final_response = self.call_model(None).await;
        if final_response.has_tool_calls() {
            tracing::warn!(
                agent = %self.config.name,
                count = final_response.tool_calls.len(),
                "Ignoring tool calls requested in the final response"
            );
        }

        let reply = final_response.content.unwrap_or_default();
        self.record(Message::assistant(reply.clone()));

        TurnReport {
            reply,
            tool_results,
            model_calls: 2,
        }
    }

    async fn call_model(&self, tools: Option<&[ToolSchema]>) -> ModelResponse {
        let window = self.context.select(self.state.messages());
        self.provider.generate_response(&window, tools).await
    }

    /// Resolve and run one call; failures become tagged results
    async fn execute_tool(&self, call: &ToolCallRequest) -> ToolResult {
        if self.config.verbose {
            tracing::debug!(tool = %call.name, arguments = ?call.arguments, "Executing tool");
        }

        let ctx = ToolContext::new(&self.state);
        let run = self.tools.execute(call, &ctx);
        let result = match self.config.tool_timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.unwrap_or_else(|_| {
                ToolResult::failure(
                    &call.name,
                    ToolError::new(ToolErrorKind::TimedOut, format!("timed out after {limit:?}")),
                )
                .with_id(&call.id)
            }),
            None => run.await,
        };

        match &result.outcome {
            Ok(value) if self.config.verbose => {
                let text = crate::tool::render_value(value);
                tracing::debug!(tool = %call.name, result = %preview(&text, 100), "Tool result");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(tool = %call.name, kind = ?err.kind, error = %err, "Tool call failed");
            }
        }

        result
    }

    fn record(&mut self, message: Message) {
        if self.config.verbose {
            match &message.tool_call {
                Some(call) => tracing::debug!(
                    agent = %self.config.name,
                    role = %message.role,
                    tool = %call.name,
                    "Added tool call message"
                ),
                None => tracing::debug!(
                    agent = %self.config.name,
                    role = %message.role,
                    content = %preview(message.text(), 50),
                    "Added message"
                ),
            }
        }
        self.state.push(message);
    }
}

/// Truncate to `max_chars` characters, marking the cut
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    context: Option<Arc<dyn ContextWindow>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            context: None,
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool(mut self, tool: Tool) -> Self {
        self.tools.register_tool(tool);
        self
    }

    pub fn tool_provider(mut self, provider: impl ToolProvider) -> Self {
        self.tools.register_provider(provider);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub const fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = Some(timeout);
        self
    }

    pub fn context_window(mut self, window: impl ContextWindow + 'static) -> Self {
        self.context = Some(Arc::new(window));
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let mut agent = Agent::from_config(self.config, provider, Arc::new(self.tools));
        if let Some(context) = self.context {
            agent.context = context;
        }
        Ok(agent)
    }
}
