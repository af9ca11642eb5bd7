use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use palace_server::{
    analyzer::analyze_sample, build_router, config::ServerConfig, AppState,
};

#[derive(Parser)]
#[command(name = "palace-server", about = "Turn a speech into memory-palace images")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Port to listen on, overriding PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Analyze a speech once and print the chunk -> prompt mapping
    Analyze {
        /// Read the speech from this file instead of the built-in sample
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for the `analyze` output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env();
    if !config.openai.has_api_key() {
        warn!("OPENAI_API_KEY is not set; model calls will fail authentication");
    }

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Command::Analyze { file } => analyze_once(config, file).await,
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("Starting memory palace server...");
    info!(
        "Server configuration loaded: port={}, chat_model={}, llm_timeout={}s",
        config.port, config.openai.chat_model, config.llm_timeout_secs
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let app = build_router(AppState::with_openai(config))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT."))?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn analyze_once(config: ServerConfig, file: Option<PathBuf>) -> anyhow::Result<()> {
    let state = AppState::with_openai(config);
    let analysis =
        analyze_sample(state.chat.as_ref(), file.as_deref(), state.config.llm_timeout()).await?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
