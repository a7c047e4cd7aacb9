//! Demografi server and CLI entry point

use clap::{Parser, Subcommand};
use demografi::{run_server, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// Demografi: natural-language questions over a population dataset
#[derive(Parser, Debug)]
#[command(name = "demografi")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Send commands to a running Demografi server (e.g. http://localhost:8000)
    #[arg(short, long, global = true)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a question in Malay or English
    Ask {
        /// The question
        question: String,
    },
    /// Evaluate a filter plan without calling the plan generator
    Evaluate {
        /// Plan as inline JSON or the path of a JSON file
        plan: String,
    },
    /// Show the dataset rows most similar to a question
    Retrieve {
        /// The question
        query: String,
        /// Number of rows to return (defaults to retrieval.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Summarize the loaded dataset
    Inspect {
        /// Only list distinct values of this column
        #[arg(long)]
        column: Option<String>,
    },
    /// Run the HTTP server (default behavior)
    Serve {
        /// Bind address. If not specified, uses config file value.
        #[arg(long)]
        host: Option<String>,
        /// HTTP port. If not specified, uses config file value.
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable JSON logging format
        #[arg(long)]
        json_logs: bool,
    },
}

fn load_config(path: &Option<String>) -> anyhow::Result<Config> {
    let config = if let Some(path) = path {
        let expanded = shellexpand::tilde(path);
        Config::from_file(&*expanded)?
    } else {
        Config::load()?
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // For CLI commands (non-serve), use minimal logging
    let is_serve = matches!(args.command, Some(Command::Serve { .. }) | None);

    if !is_serve {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    let mode = || -> anyhow::Result<cli::ExecutionMode> {
        Ok(match &args.remote {
            Some(url) => cli::ExecutionMode::Remote(url.clone()),
            None => cli::ExecutionMode::Local(Box::new(load_config(&args.config)?)),
        })
    };

    match &args.command {
        Some(Command::Ask { question }) => {
            cli::run_ask(mode()?, question.clone(), args.json).await
        }
        Some(Command::Evaluate { plan }) => {
            cli::run_evaluate(mode()?, plan.clone(), args.json).await
        }
        Some(Command::Retrieve { query, top_k }) => {
            cli::run_retrieve(mode()?, query.clone(), *top_k, args.json).await
        }
        Some(Command::Inspect { column }) => {
            cli::run_inspect(mode()?, column.clone(), args.json).await
        }
        Some(Command::Serve {
            host,
            port,
            json_logs,
        }) => serve(&args.config, host.clone(), *port, *json_logs).await,
        None => serve(&args.config, None, None, false).await,
    }
}

/// Run the HTTP server.
async fn serve(
    config_path: &Option<String>,
    host: Option<String>,
    port: Option<u16>,
    json_logs: bool,
) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Demografi v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(config_path)?;

    // Override bind address from CLI args only if explicitly provided
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    tracing::info!(
        csv_path = %config.csv_path().display(),
        planner_model = %config.planner.model,
        embedding_provider = ?config.embedding.provider,
        retrieval = config.retrieval.enabled,
        "Configuration loaded"
    );

    run_server(&config).await?;

    Ok(())
}
