use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{stdin, stdout, BufReader};
use tracing::{info, warn};

use cse_bridge::config::Settings;
use cse_bridge::market_data::adapters::cse::CseAdapter;
use cse_bridge::market_data::cache::ResponseCache;
use cse_bridge::market_data::gateway::Gateway;
use cse_bridge::server::Server;
use cse_bridge::telemetry;
use cse_bridge::tools::{catalog, Arguments, ToolDispatcher};

#[derive(Parser)]
#[command(name = "cse-bridge")]
#[command(about = "Colombo Stock Exchange market data as callable tools", long_about = None)]
struct Cli {
    /// TOML settings file layered over the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tracing filter used when RUST_LOG is unset (e.g. "debug", "cse_bridge=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tool catalogue over stdio (default)
    Serve {
        /// Skip populating the symbol directory at startup
        #[arg(long)]
        no_warm_up: bool,
    },
    /// Print the tool catalogue as JSON
    Tools,
    /// Invoke one tool and print its result envelope
    Call {
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },
}

fn build_dispatcher(settings: &Settings) -> anyhow::Result<ToolDispatcher> {
    let upstream = CseAdapter::new(&settings.upstream)?;
    info!(base_url = upstream.base_url(), "upstream configured");
    let gateway = Gateway::new(
        Arc::new(upstream),
        ResponseCache::new(settings.cache_ttl()),
        settings.cdn_base()?,
    );
    Ok(ToolDispatcher::new(Arc::new(gateway)))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    telemetry::init_tracing(cli.log_level.as_deref().unwrap_or(&settings.server.log_filter));

    match cli.command.unwrap_or(Commands::Serve { no_warm_up: false }) {
        Commands::Serve { no_warm_up } => {
            let dispatcher = build_dispatcher(&settings)?;
            if settings.server.warm_up && !no_warm_up {
                let gateway = Arc::clone(dispatcher.gateway());
                tokio::spawn(async move {
                    match gateway.warm_up().await {
                        Ok(n) => info!(symbols = n, "symbol directory warmed"),
                        Err(e) => warn!(error = %e, "warm-up failed; symbols resolve on demand"),
                    }
                });
            }
            let server = Server::new(dispatcher, settings.server.name.clone());
            server.run(BufReader::new(stdin()), stdout()).await?;
        }
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&catalog())?);
        }
        Commands::Call { tool, args } => {
            let args: Arguments = match args {
                Some(raw) => serde_json::from_str(&raw).context("--args must be a JSON object")?,
                None => Arguments::new(),
            };
            let dispatcher = build_dispatcher(&settings)?;
            let result = dispatcher.call(&tool, &args).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.is_error {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
