use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::commands::utils;
use crate::errors::FormprobeError;
use crate::protocol::{EngineHandle, EngineRequest, EngineResponse};
use crate::types::OutputFormat;

pub async fn handle_fill(
    engine: &EngineHandle,
    page: PathBuf,
    set: Vec<String>,
    suggest: bool,
    url: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let values = utils::parse_pairs(&set)?;
    if values.is_empty() && !suggest {
        anyhow::bail!("Nothing to fill: pass --set key=value or --suggest");
    }

    let source = utils::load_source(&page)?;
    let url = utils::effective_url(&page, &source, url);
    info!("Filling {} with {} explicit value(s)", url, values.len());

    let request = EngineRequest::Fill {
        source,
        url,
        values,
        suggest,
    };
    match engine.request(request).await? {
        EngineResponse::Fill(report) => {
            match format {
                OutputFormat::Json => utils::print_json(&report)?,
                OutputFormat::Simple => {
                    println!(
                        "Filled {}/{} field(s) on {}",
                        report.filled,
                        report.outcomes.len(),
                        report.url
                    );
                    for outcome in &report.outcomes {
                        let mut line = format!("  {}: {:?}", outcome.key, outcome.status);
                        if let Some(strategy) = outcome.strategy {
                            line.push_str(&format!(
                                " via {:?} in {} attempt(s)",
                                strategy, outcome.attempts
                            ));
                        }
                        if let Some(error) = &outcome.error {
                            line.push_str(&format!(" ({})", error));
                        }
                        println!("{}", line);
                    }
                }
            }
            Ok(())
        }
        EngineResponse::Error(fault) => Err(anyhow::Error::new(FormprobeError::from(fault))),
        _ => Err(anyhow::anyhow!("Unexpected response from engine")),
    }
}
