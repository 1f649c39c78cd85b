//! # agent-core
//!
//! Agent orchestration core: a provider-agnostic model client contract, a
//! declarative tool registry and the two-call turn loop that ties them to a
//! conversation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐   │
//! │  │ Conversation │  │    Tools     │  │   LlmProvider    │   │
//! │  │    State     │──│   Registry   │──│   (Strategy)     │   │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each call to [`Agent::process_input`] takes at most two model round-trips:
//! the first may request tools, the second must answer in prose.

pub mod agent;
pub mod builtin;
pub mod context;
pub mod error;
pub mod message;
pub mod provider;
pub mod shaping;
pub mod state;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AgentConfig, TurnReport};
pub use builtin::GeneralTools;
pub use context::{ContextWindow, FullHistory, TokenBudget};
pub use error::{AgentError, Result, ToolError, ToolErrorKind};
pub use message::{Message, Role, ToolArguments, ToolCallRequest};
pub use provider::{LlmProvider, ModelResponse, ProviderConfig, ProviderRegistry};
pub use shaping::{ContentOnly, MessageShaper, NativeToolCalls};
pub use state::ConversationState;
pub use tool::{
    ParamType, ParameterSchema, Tool, ToolContext, ToolHandler, ToolProvider, ToolRegistry,
    ToolResult, ToolSchema,
};
