#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod engine;
mod errors;
mod fill;
mod locator;
mod page;
mod protocol;
mod scorer;
mod session;
mod store;
mod suggest;
pub mod types;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const _EXIT_COMMAND_ERROR: i32 = 1;
const _EXIT_NO_FIELDS: i32 = 2;
const _EXIT_ELEMENT_NOT_FOUND: i32 = 3;
const _EXIT_PERSISTENCE_FAILED: i32 = 4;
const _EXIT_SUGGESTION_FAILED: i32 = 5;

use crate::commands::cache::CacheCommands;
use crate::session::{Session, SessionConfig};
use types::OutputFormat;

#[derive(Parser)]
#[command(name = "formprobe")]
#[command(about = "Form field context inference for LLMs and automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cache directory override
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a page and infer the context of every form field
    Analyze {
        /// Page file: raw HTML or a JSON snapshot
        page: PathBuf,

        /// URL to key the analysis on (defaults to the snapshot URL, then the path)
        #[arg(short, long)]
        url: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Skip writing the analysis to the cache
        #[arg(long)]
        no_persist: bool,
    },

    /// Re-acquire one analyzed field on a page
    Resolve {
        /// Page file: raw HTML or a JSON snapshot
        page: PathBuf,

        /// Field key from the analysis
        key: String,

        /// URL the analysis was keyed on
        #[arg(short, long)]
        url: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Fill analyzed fields with values
    Fill {
        /// Page file: raw HTML or a JSON snapshot
        page: PathBuf,

        /// Field value as key=value; repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Ask the suggestion provider for values not passed with --set
        #[arg(long)]
        suggest: bool,

        /// Suggestion endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// URL the analysis was keyed on
        #[arg(short, long)]
        url: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Query the suggestion provider for a field title
    Suggest {
        /// Field title to suggest values for
        title: String,

        /// Input type (email, tel, number, ...)
        #[arg(long = "type")]
        field_type: Option<String>,

        /// Placeholder text to enrich the query
        #[arg(long)]
        placeholder: Option<String>,

        /// Suggestion endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// API key for the endpoint
        #[arg(long)]
        api_key: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Inspect or clear cached analyses
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Handle exit codes based on error type
    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            // Convert to our error type to get proper exit code
            let formprobe_err: errors::FormprobeError = err.into();

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": formprobe_err.to_string(),
                "exit_code": formprobe_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", formprobe_err);
            std::process::exit(formprobe_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formprobe=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr) // Output logs to stderr
                .with_target(false), // Don't show target module in logs
        )
        .init();

    let cli = Cli::parse();

    let mut config = SessionConfig::from_env();
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }

    // Per-command provider overrides beat the environment
    let (endpoint_override, key_override) = match &cli.command {
        Commands::Fill { endpoint, .. } => (endpoint.clone(), None),
        Commands::Suggest {
            endpoint, api_key, ..
        } => (endpoint.clone(), api_key.clone()),
        _ => (None, None),
    };

    let mut session = Session::new(config)?;
    if endpoint_override.is_some() || key_override.is_some() {
        session.reconfigure(endpoint_override, key_override)?;
    }
    let engine = protocol::spawn(session);

    let result = match cli.command {
        Commands::Analyze {
            page,
            url,
            format,
            no_persist,
        } => commands::analyze::handle_analyze(&engine, page, url, format, no_persist).await,

        Commands::Resolve {
            page,
            key,
            url,
            format,
        } => commands::resolve::handle_resolve(&engine, page, key, url, format).await,

        Commands::Fill {
            page,
            set,
            suggest,
            endpoint: _,
            url,
            format,
        } => commands::fill::handle_fill(&engine, page, set, suggest, url, format).await,

        Commands::Suggest {
            title,
            field_type,
            placeholder,
            endpoint: _,
            api_key: _,
            format,
        } => commands::suggest::handle_suggest(&engine, title, field_type, placeholder, format).await,

        Commands::Cache { command } => commands::cache::handle_cache(&engine, command).await,
    };

    if let Err(err) = engine.shutdown().await {
        warn!("Engine shutdown failed: {}", err);
    }
    result
}
