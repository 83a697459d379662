use anyhow::Result;
use clap::Subcommand;

use crate::commands::utils;
use crate::errors::FormprobeError;
use crate::protocol::{EngineHandle, EngineRequest, EngineResponse};
use crate::types::OutputFormat;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// List cached page analyses
    List {
        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Show the cached analysis for a page URL
    Show {
        /// Page URL or file path the analysis was keyed on
        url: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Remove one cached analysis, or all of them
    Clear {
        /// Page URL to clear; clears everything when omitted
        url: Option<String>,
    },
}

pub async fn handle_cache(engine: &EngineHandle, command: CacheCommands) -> Result<()> {
    match command {
        CacheCommands::List { format } => {
            match engine.request(EngineRequest::CacheList).await? {
                EngineResponse::CacheKeys(keys) => {
                    match format {
                        OutputFormat::Json => utils::print_json(&keys)?,
                        OutputFormat::Simple => {
                            println!("{} cached page(s)", keys.len());
                            for key in &keys {
                                println!("  {}", key);
                            }
                        }
                    }
                    Ok(())
                }
                EngineResponse::Error(fault) => {
                    Err(anyhow::Error::new(FormprobeError::from(fault)))
                }
                _ => Err(anyhow::anyhow!("Unexpected response from engine")),
            }
        }
        CacheCommands::Show { url, format } => {
            match engine.request(EngineRequest::CacheShow { url }).await? {
                EngineResponse::CachedMap(map) => {
                    match format {
                        OutputFormat::Json => utils::print_json(&map)?,
                        OutputFormat::Simple => {
                            println!("{} field(s) for {}", map.fields.len(), map.url);
                            for field in &map.fields {
                                println!(
                                    "  {}: \"{}\" ({:.2})",
                                    field.key, field.title.text, field.title.confidence
                                );
                            }
                        }
                    }
                    Ok(())
                }
                EngineResponse::Error(fault) => {
                    Err(anyhow::Error::new(FormprobeError::from(fault)))
                }
                _ => Err(anyhow::anyhow!("Unexpected response from engine")),
            }
        }
        CacheCommands::Clear { url } => {
            match engine.request(EngineRequest::CacheClear { url }).await? {
                EngineResponse::Cleared { removed } => {
                    println!("Removed {} cached record(s)", removed);
                    Ok(())
                }
                EngineResponse::Error(fault) => {
                    Err(anyhow::Error::new(FormprobeError::from(fault)))
                }
                _ => Err(anyhow::anyhow!("Unexpected response from engine")),
            }
        }
    }
}
