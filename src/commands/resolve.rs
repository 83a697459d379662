use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::commands::utils;
use crate::errors::FormprobeError;
use crate::protocol::{EngineHandle, EngineRequest, EngineResponse};
use crate::types::OutputFormat;

pub async fn handle_resolve(
    engine: &EngineHandle,
    page: PathBuf,
    key: String,
    url: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let source = utils::load_source(&page)?;
    let url = utils::effective_url(&page, &source, url);
    info!("Resolving field '{}' on {}", key, url);

    let request = EngineRequest::Resolve { source, url, key };
    match engine.request(request).await? {
        EngineResponse::Resolution(report) => {
            match format {
                OutputFormat::Json => utils::print_json(&report)?,
                OutputFormat::Simple => {
                    println!(
                        "{}: <{}> via {:?} in {} attempt(s)",
                        report.key, report.tag, report.strategy, report.attempts
                    );
                }
            }
            Ok(())
        }
        EngineResponse::Error(fault) => Err(anyhow::Error::new(FormprobeError::from(fault))),
        _ => Err(anyhow::anyhow!("Unexpected response from engine")),
    }
}
