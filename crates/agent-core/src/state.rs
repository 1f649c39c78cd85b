//! Conversation State
//!
//! Append-only message log plus scratch memory and the last-result cache.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::message::{Message, Role, ToolCallRequest};

/// Per-agent conversation state.
///
/// The log is the transcript: insertion order is significant and nothing is
/// ever removed. Context-window limits are handled on a view of the log (see
/// [`crate::context::ContextWindow`]), never by editing it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,

    /// Free-form cross-turn scratch data
    #[serde(default)]
    memory: HashMap<String, serde_json::Value>,

    /// Last successful result per tool name
    #[serde(default)]
    tool_results: HashMap<String, serde_json::Value>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a log whose first entry is the system prompt
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.push(Message::system(prompt));
        state
    }

    /// Append a message built from its parts
    pub fn add_message(
        &mut self,
        role: Role,
        content: Option<String>,
        tool_call: Option<ToolCallRequest>,
    ) {
        if role == Role::Tool && content.is_none() {
            tracing::warn!("tool message appended without content");
        }
        if content.is_some() && tool_call.is_some() {
            tracing::warn!(%role, "message carries both content and a tool call");
        }

        self.push(Message {
            role,
            content,
            tool_call,
            tool_call_id: None,
            timestamp: Utc::now(),
        });
    }

    /// Append a prepared message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Full ordered log
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn store_memory(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.memory.insert(key.into(), value);
    }

    pub fn memory(&self, key: &str) -> Option<&serde_json::Value> {
        self.memory.get(key)
    }

    /// Overwrites any previous result for the same tool
    pub fn store_tool_result(&mut self, tool: impl Into<String>, result: serde_json::Value) {
        self.tool_results.insert(tool.into(), result);
    }

    pub fn tool_result(&self, tool: &str) -> Option<&serde_json::Value> {
        self.tool_results.get(tool)
    }
}
