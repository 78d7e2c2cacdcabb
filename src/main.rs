use anyhow::Result;
use appforge::config::Config;
use appforge::transport;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Package version with the short commit hash from `build.rs`
const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("APPFORGE_GIT_HASH"),
    ")"
);

#[derive(Parser)]
#[command(name = "appforge")]
#[command(author, version = VERSION, about = "appforge - generate and review application code with an LLM agent pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: platform config dir, config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,
    },

    /// Run one generation from a request file and print the response JSON
    Orchestrate {
        /// Path to a JSON generation request
        #[arg(short, long)]
        request: PathBuf,
    },

    /// Show the resolved configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "appforge=debug,llm=debug,tower_http=debug"
    } else {
        "appforge=info,llm=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            tracing::info!(
                "Starting HTTP server on {}:{}, provider: {}, model: {}",
                config.server.host,
                config.server.port,
                config.llm.provider,
                config.llm.model
            );
            transport::run_http_server(config).await?;
        }
        Commands::Orchestrate { request } => {
            transport::cli::run_orchestrate(&request, &config).await?;
        }
        Commands::CheckConfig => {
            transport::cli::run_check_config(&config, cli.config.as_deref())?;
        }
    }

    Ok(())
}
