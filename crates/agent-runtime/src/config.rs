//! Runtime settings read from the environment
//!
//! | Variable                   | Default              |
//! |----------------------------|----------------------|
//! | `AGENT_NAME`               | `Agent`              |
//! | `AGENT_SYSTEM_PROMPT`      | built-in prompt      |
//! | `LLM_PROVIDER`             | `ollama`             |
//! | `LLM_MODEL`                | `llama3.2`           |
//! | `OLLAMA_HOST`              | `http://localhost`   |
//! | `OLLAMA_PORT`              | `11434`              |
//! | `AGENT_VERBOSE`            | `false`              |
//! | `AGENT_TOOL_TIMEOUT_SECS`  | unset (no timeout)   |
//! | `AGENT_GENERAL_TOOLS`      | `true`               |

use std::str::FromStr;
use std::time::Duration;

use agent_core::{
    AgentConfig,
    error::{AgentError, Result},
    provider::ProviderConfig,
};

/// Everything needed to assemble an agent outside of code
#[derive(Clone, Debug)]
pub struct RuntimeSettings {
    pub agent: AgentConfig,

    /// Name looked up in the provider registry
    pub provider: String,

    pub provider_config: ProviderConfig,

    /// Register the general-purpose tool collection
    pub general_tools: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            provider: "ollama".into(),
            provider_config: ProviderConfig::default(),
            general_tools: true,
        }
    }
}

impl RuntimeSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; unset keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(name) = get("AGENT_NAME") {
            settings.agent.name = name;
        }
        if let Some(prompt) = get("AGENT_SYSTEM_PROMPT") {
            settings.agent.system_prompt = prompt;
        }
        if let Some(value) = get("AGENT_VERBOSE") {
            settings.agent.verbose = parse_bool("AGENT_VERBOSE", &value)?;
        }
        if let Some(value) = get("AGENT_TOOL_TIMEOUT_SECS") {
            let secs: u64 = parse_number("AGENT_TOOL_TIMEOUT_SECS", &value)?;
            settings.agent.tool_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(value) = get("AGENT_GENERAL_TOOLS") {
            settings.general_tools = parse_bool("AGENT_GENERAL_TOOLS", &value)?;
        }

        if let Some(provider) = get("LLM_PROVIDER") {
            settings.provider = provider.trim().to_lowercase();
        }
        if let Some(model) = get("LLM_MODEL") {
            settings.provider_config.generation.model = model;
        }
        settings.provider_config.host = get("OLLAMA_HOST");
        if let Some(value) = get("OLLAMA_PORT") {
            settings.provider_config.port = Some(parse_number("OLLAMA_PORT", &value)?);
        }

        Ok(settings)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AgentError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AgentError::Config(format!("{key} must be a number, got '{value}'")))
}
