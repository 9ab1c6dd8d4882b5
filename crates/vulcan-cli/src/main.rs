use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod prompt;
mod session;

use commands::agent::{run_agent, AgentPersona};
use commands::ask::run_ask;
use commands::chat::run_chat;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    provider: ProviderArgs,

    #[command(subcommand)]
    command: Command,
}

/// Backend selection; each flag overrides the matching environment variable
#[derive(Args, Debug, Clone, Default)]
pub struct ProviderArgs {
    /// Backend to talk to (defaults depend on the command)
    #[arg(short, long, value_enum, global = true)]
    pub provider: Option<CliProviderVariant>,

    /// API base URL (OPENAI_API_BASE or OLLAMA_BASE_URL)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// API key for OpenAI-compatible servers (OPENAI_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Model to use (OPENAI_MODEL or OLLAMA_MODEL)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature (OPENAI_TEMPERATURE or OLLAMA_TEMPERATURE)
    #[arg(short, long, global = true)]
    pub temperature: Option<f32>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliProviderVariant {
    OpenAi,
    Ollama,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with Spock about James T. Kirk; type 'bye' to exit
    Chat {
        /// Wait for complete answers instead of streaming tokens
        #[arg(long)]
        no_stream: bool,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question
        #[arg(default_value = "Who is James T. Kirk's best friend?")]
        prompt: String,

        /// Print tokens as they arrive
        #[arg(long)]
        stream: bool,
    },

    /// Talk to a tool-using agent
    Agent {
        #[arg(value_enum)]
        persona: AgentPersona,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Chat { no_stream } => run_chat(&cli.provider, !no_stream).await,
        Command::Ask { prompt, stream } => run_ask(&cli.provider, &prompt, stream).await,
        Command::Agent { persona } => run_agent(&cli.provider, persona).await,
    }
}
