//! # agent-runtime
//!
//! Runtime model clients and environment-driven assembly of agents.
//!
//! ## Providers
//!
//! - **Ollama** (default): Local LLM inference via Ollama
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{RuntimeSettings, create_agent, default_registry};
//!
//! let settings = RuntimeSettings::from_env()?;
//! let mut agent = create_agent(&settings, &default_registry())?;
//! let reply = agent.process_input("What is 2 + 2?").await;
//! ```

use std::sync::Arc;

pub mod config;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use config::RuntimeSettings;
#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, GeneralTools, LlmProvider, Message, ProviderRegistry, Result, Role, Tool,
    ToolRegistry,
};

/// Registry holding every provider compiled into this crate
pub fn default_registry() -> ProviderRegistry {
    #[allow(unused_mut)]
    let mut registry = ProviderRegistry::new();

    #[cfg(feature = "ollama")]
    registry.register("ollama", |config| {
        Ok(Arc::new(OllamaProvider::from_provider_config(config)?) as Arc<dyn LlmProvider>)
    });

    registry
}

/// Assemble an agent from settings, resolving the provider by name
pub fn create_agent(settings: &RuntimeSettings, registry: &ProviderRegistry) -> Result<Agent> {
    let provider = registry.create(&settings.provider, &settings.provider_config)?;

    let mut tools = ToolRegistry::new();
    if settings.general_tools {
        tools.register_provider(GeneralTools);
    }

    tracing::info!(
        agent = %settings.agent.name,
        provider = %provider.name(),
        model = %settings.provider_config.generation.model,
        tools = tools.len(),
        "Agent created"
    );

    Ok(Agent::from_config(
        settings.agent.clone(),
        provider,
        Arc::new(tools),
    ))
}
