use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use summarist_common::{logger, AppConfig};

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    match find_project_root().map(|root| root.join(".env")) {
        Some(env_path) if env_path.exists() => {
            dotenv::from_path(&env_path).ok();
        }
        _ => {
            dotenv::dotenv().ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "summarist")]
#[command(about = "Summarist - AI summaries of text, documents and audio", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Prompt template directory (overrides PROMPTS_DIR)
        #[arg(long)]
        prompts_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();
    let mut config = AppConfig::from_env()?;

    if let Some(Commands::Serve {
        host,
        port,
        prompts_dir,
    }) = cli.command
    {
        if let Some(host) = host {
            config.server_host = host;
        }
        if let Some(port) = port {
            config.server_port = port;
        }
        if let Some(dir) = prompts_dir {
            config.prompts_dir = dir;
        }
        config.validate()?;
    }

    logger::setup_logging(config.log_dir.as_deref(), &config.log_level)?;

    tracing::info!("{} v{} starting...", config.app_name, config.version);
    tracing::info!("Configuration loaded:");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  LLM: {} ({})", config.llm_provider, config.llm_model);
    tracing::info!("  Cache: {} (ttl {}s)", config.cache_backend, config.cache_ttl_secs);
    tracing::info!("  Prompts: {}", config.prompts_dir.display());

    summarist_server::start_server(config).await?;

    Ok(())
}
