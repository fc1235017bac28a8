//! Keystone — Chatbot Stack Composition Demo CLI
//!
//! Composes the chatbot reference stack and prints what the provisioning
//! engine would receive: the resource graph as JSON plus its fingerprint.
//!
//! Usage:
//!   cargo run -p demo -- compose
//!   cargo run -p demo -- compose --config stack.toml
//!   cargo run -p demo -- fingerprint

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use keystone_contracts::{
    agent::FoundationModel,
    error::KeystoneResult,
    identity::ResourceIdentity,
};
use keystone_core::{clock::SystemClock, fingerprint::fingerprint};
use keystone_ref_chatbot::{compose_chatbot_stack, ChatbotStack, ChatbotStackConfig};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Keystone — declarative resource-graph composer demo.
///
/// Composes the chatbot reference stack (agent, alias, chat-log bucket,
/// action handler) without touching any cloud API: the output is the graph
/// an external provisioning engine would realize.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Keystone chatbot-stack composition demo",
    long_about = "Composes the chatbot reference stack and prints the resource graph\n\
                  plus its SHA-256 fingerprint. Composition is pure: no cloud calls."
)]
struct Cli {
    /// Path to a TOML stack configuration. A built-in beta-stage sample is
    /// used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose the stack and print the full graph as pretty JSON.
    Compose,
    /// Compose the stack and print only the graph fingerprint.
    Fingerprint,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Compose => run_compose(cli.config, true),
        Command::Fingerprint => run_compose(cli.config, false),
    };

    if let Err(e) = result {
        eprintln!("Composition error: {}", e);
        std::process::exit(1);
    }
}

// ── Composition ───────────────────────────────────────────────────────────────

fn run_compose(config: Option<PathBuf>, print_graph: bool) -> KeystoneResult<()> {
    let cfg = match config {
        Some(path) => ChatbotStackConfig::from_file(&path)?,
        None => sample_config(),
    };

    let stack: ChatbotStack = compose_chatbot_stack(&cfg, &SystemClock)?;

    if print_graph {
        let json = serde_json::to_string_pretty(&stack.graph)
            .expect("ResourceGraph must always be serializable to JSON");
        println!("{json}");
    }
    println!("fingerprint: {}", fingerprint(&stack.graph));

    Ok(())
}

/// The built-in sample used when no --config is given.
fn sample_config() -> ChatbotStackConfig {
    ChatbotStackConfig {
        agent_name: "ChatbotAgent".to_string(),
        identity: ResourceIdentity {
            stage: "beta".to_string(),
            account: "123456789012".to_string(),
            partition: "aws".to_string(),
            region: "us-east-1".to_string(),
        },
        instruction: "Answer employee questions about leave policy.".to_string(),
        foundation_model: FoundationModel::AnthropicClaude3Sonnet,
        action_handler: "com.example.ChatHandler::handleRequest".to_string(),
        enable_user_input: true,
        overrides: Default::default(),
    }
}
