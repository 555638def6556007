mod agent;
mod config;
mod conversation;
mod init;
mod ollama;
mod tools;

use agent::{AgentRunner, OllamaAgentLoop};
use anyhow::Result;
use clap::Parser;
use config::Config;
use std::path::PathBuf;

/// Note-taking assistant backed by a local Ollama model.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Question or instruction for the assistant
    #[arg(default_value = "hello how are you")]
    query: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::load(&cli.config)?;

    // Initialize logging; RUST_LOG wins over the config file
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
    log::info!("Starting note agent (provider={})", config.ai_model.provider);

    let session = match init::initialize(&config.ai_model).await {
        Ok(session) => session,
        Err(e) => {
            println!("✗ {}", e);
            println!("{}", e.hint());
            std::process::exit(1);
        }
    };
    println!("✓ Ollama is running: {}", session.status);
    println!("✓ LLM initialized successfully");

    let agent = OllamaAgentLoop::new(session.client, config.agent.max_iterations);
    let runner = AgentRunner::new(Box::new(agent), config.agent.system_prompt.clone());

    let query = cli.query.join(" ");
    log::info!("Running query: {}", query);
    println!("{}", runner.run(&query).await);

    Ok(())
}
