//! Ember daemon: entry point for running an Ember node.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ember_node::{init_logging, EmberNode, NodeConfig, ShutdownController};
use ember_rpc::{convert_named_values, convert_values, Request};
use ember_types::NetworkId;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// How often `run` writes a changed ban list to disk.
const PERSIST_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "ember-daemon", about = "Ember node daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "EMBER_CONFIG")]
    config: Option<PathBuf>,

    /// Network: "main", "test" or "regtest".
    #[arg(long, env = "EMBER_NETWORK")]
    network: Option<NetworkId>,

    /// Directory holding the ban list.
    #[arg(long, env = "EMBER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "EMBER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "EMBER_LOG_FORMAT")]
    log_format: Option<String>,

    /// Start with peer-to-peer networking disabled.
    #[arg(long, env = "EMBER_NO_NETWORK")]
    no_network: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve newline-delimited JSON-RPC requests on stdin, replies on stdout.
    Run,

    /// Run one command and print its result.
    Call {
        /// Arguments are `name=value` pairs.
        #[arg(long)]
        named: bool,

        method: String,

        args: Vec<String>,
    },
}

impl Cli {
    /// File values first, then CLI/env overrides.
    fn node_config(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(&path.to_string_lossy())?,
            None => NodeConfig::default(),
        };
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        if self.no_network {
            config.network_active = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.node_config()?;
    init_logging(config.log_format()?, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let node = EmberNode::new(config)?;
    node.start()?;

    let outcome = match cli.command {
        Command::Run => serve(&node).await,
        Command::Call { named, method, args } => call(&node, named, method, &args),
    };

    node.stop()?;
    tracing::info!("Ember daemon exited cleanly");
    outcome
}

async fn serve(node: &EmberNode) -> anyhow::Result<()> {
    let shutdown = Arc::new(ShutdownController::new());
    let mut stop = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move { shutdown.wait_for_signal().await }
    });

    tracing::info!(
        network = %node.config().network.as_str(),
        data_dir = %node.config().data_dir.display(),
        "serving JSON-RPC on stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut persist = tokio::time::interval(PERSIST_INTERVAL);
    persist.tick().await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("end of input, shutting down");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let mut reply = node.handle_request_text(&line);
                reply.push('\n');
                stdout.write_all(reply.as_bytes()).await?;
                stdout.flush().await?;
            }
            _ = persist.tick() => {
                if let Err(e) = node.persist_bans() {
                    tracing::warn!(error = %e, "periodic ban list save failed");
                }
            }
            _ = stop.recv() => break,
        }
    }
    Ok(())
}

fn call(node: &EmberNode, named: bool, method: String, args: &[String]) -> anyhow::Result<()> {
    let params = if named {
        convert_named_values(&method, args)?
    } else {
        convert_values(&method, args)?
    };
    match node.execute(&Request::new(method, params)) {
        Ok(Value::Null) => {}
        Ok(Value::String(text)) => println!("{text}"),
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(e) => anyhow::bail!("error code: {}\nerror message:\n{e}", e.code()),
    }
    Ok(())
}
