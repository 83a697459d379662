use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::commands::utils;
use crate::errors::FormprobeError;
use crate::protocol::{EngineHandle, EngineRequest, EngineResponse};
use crate::types::OutputFormat;

pub async fn handle_analyze(
    engine: &EngineHandle,
    page: PathBuf,
    url: Option<String>,
    format: OutputFormat,
    no_persist: bool,
) -> Result<()> {
    let source = utils::load_source(&page)?;
    let url = utils::effective_url(&page, &source, url);
    info!("Analyzing {}", url);

    let request = EngineRequest::Analyze {
        source,
        url,
        persist: !no_persist,
    };
    match engine.request(request).await? {
        EngineResponse::Analysis { report, tier } => {
            match format {
                OutputFormat::Json => utils::print_json(&report)?,
                OutputFormat::Simple => {
                    println!(
                        "{} field(s) in {} container(s) on {}",
                        report.fields.len(),
                        report.container_count,
                        report.url
                    );
                    for field in &report.fields {
                        println!(
                            "  {}: \"{}\" ({:.2} via {:?}, {} clue(s))",
                            field.descriptor.key,
                            field.title.text,
                            field.title.confidence,
                            field.title.source,
                            field.clues.len()
                        );
                    }
                    if let Some(tier) = tier {
                        println!("Cached in the {:?} tier", tier);
                    }
                }
            }
            Ok(())
        }
        EngineResponse::Error(fault) => Err(anyhow::Error::new(FormprobeError::from(fault))),
        _ => Err(anyhow::anyhow!("Unexpected response from engine")),
    }
}
