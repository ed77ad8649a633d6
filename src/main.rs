use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apiport_mcp::client::ApiPortClient;
use apiport_mcp::config::{self, Config};
use apiport_mcp::mcp;

#[derive(Parser)]
#[command(name = "apiport-mcp")]
#[command(about = "MCP server for the ApiPort task manager")]
struct Cli {
    /// ApiPort base URL
    #[arg(long, global = true, env = "APIPORT_API_URL")]
    api_url: Option<String>,

    /// Account email
    #[arg(long, global = true, env = "APIPORT_EMAIL")]
    email: Option<String>,

    /// Account password
    #[arg(long, global = true, env = "APIPORT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "APIPORT_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server via stdio (default)
    Mcp,
    /// Log in and check that the API is reachable
    Status,
}

impl Cli {
    fn config(&self) -> Result<Config, apiport_mcp::client::ClientError> {
        let verify_ssl = !self.insecure && config::verify_ssl_from_env();
        let config = Config::new(
            self.api_url.clone(),
            self.email.clone(),
            self.password.clone(),
            verify_ssl,
        )?;
        Ok(config.with_timeout(std::time::Duration::from_secs(self.timeout_secs.max(1))))
    }
}

/// Initialize tracing with output to stderr; stdout carries the protocol.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "apiport_mcp=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.config()?;
    tracing::debug!("Loaded configuration: {:?}", config);
    let client = ApiPortClient::new(&config)?;

    match cli.command {
        Some(Commands::Mcp) | None => {
            mcp::run_stdio_server(client).await?;
        }
        Some(Commands::Status) => {
            println!("Checking ApiPort at {}...", config.api_url);
            let projects = client.list_projects().await?;
            let credential = client.credentials().status().await;
            println!("Authenticated as {}", config.email);
            if let Some(expires_in) = credential.expires_in {
                println!("Access token valid for {} minutes", expires_in.as_secs() / 60);
            }
            println!("{} projects accessible", projects.len());
        }
    }

    Ok(())
}
