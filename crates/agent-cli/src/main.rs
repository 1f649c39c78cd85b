//! Interactive chat with a tool-using agent
//!
//! Reads one line per turn from stdin and prints the agent's answer.
//! Type `exit` to quit.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_runtime::{RuntimeSettings, create_agent, default_registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let settings = match RuntimeSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    // Initialize tracing
    let default_filter = if settings.agent.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let registry = default_registry();
    let mut agent = match create_agent(&settings, &registry) {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create agent");
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    // Verify the model backend before the first turn
    match agent.provider().health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to {}", agent.provider().name());
            if let Ok(models) = agent.provider().list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not available, answers will be errors", agent.provider().name());
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    let tool_names = agent.tools().tool_names().join(", ");
    tracing::info!("Tools: {}", tool_names);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(format!("Chatting with {}. Type 'exit' to quit.\n", agent.name()).as_bytes())
        .await?;

    loop {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        let reply = agent.process_input(input).await;
        stdout
            .write_all(format!("{}: {}\n", agent.name(), reply).as_bytes())
            .await?;
    }

    tracing::info!(messages = agent.messages().len(), "Session ended");
    Ok(())
}
