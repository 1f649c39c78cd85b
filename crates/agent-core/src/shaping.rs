//! Message Shaping
//!
//! Provider-specific rules for turning the transcript into wire messages.
//! Model clients take a shaper instead of hard-coding one.

use serde::{Deserialize, Serialize};

use crate::message::{Message, Role, ToolArguments};

/// A message as transmitted to a chat endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    pub function: WireFunctionCall,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    pub arguments: ToolArguments,
}

pub trait MessageShaper: Send + Sync {
    fn shape(&self, messages: &[Message]) -> Vec<WireMessage>;
}

/// Role and content only; messages without content (tool call requests)
/// are dropped
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentOnly;

impl MessageShaper for ContentOnly {
    fn shape(&self, messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .filter_map(|m| {
                m.content.as_ref().map(|content| WireMessage {
                    role: m.role.to_string(),
                    content: content.clone(),
                    tool_calls: None,
                })
            })
            .collect()
    }
}

/// Keeps tool call requests as structured `tool_calls` on assistant messages
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeToolCalls;

impl MessageShaper for NativeToolCalls {
    fn shape(&self, messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| {
                let tool_calls = match (&m.role, &m.tool_call) {
                    (Role::Assistant, Some(call)) => Some(vec![WireToolCall {
                        function: WireFunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        },
                    }]),
                    _ => None,
                };
                WireMessage {
                    role: m.role.to_string(),
                    content: m.text().to_string(),
                    tool_calls,
                }
            })
            .collect()
    }
}
