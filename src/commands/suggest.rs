use anyhow::Result;
use tracing::info;

use crate::commands::utils;
use crate::errors::FormprobeError;
use crate::protocol::{EngineHandle, EngineRequest, EngineResponse};
use crate::suggest::build_query;
use crate::types::OutputFormat;

pub async fn handle_suggest(
    engine: &EngineHandle,
    title: String,
    field_type: Option<String>,
    placeholder: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let query = build_query(&title, field_type.as_deref(), placeholder.as_deref(), None);
    info!("Requesting suggestions for \"{}\"", query.search_query);

    match engine.request(EngineRequest::Suggest { query }).await? {
        EngineResponse::Suggestions(suggestions) => {
            match format {
                OutputFormat::Json => utils::print_json(&suggestions)?,
                OutputFormat::Simple => {
                    if suggestions.is_empty() {
                        println!("No suggestions");
                    }
                    for suggestion in &suggestions {
                        println!(
                            "  {} ({:.2}, {:?})",
                            suggestion.value, suggestion.confidence, suggestion.source
                        );
                    }
                }
            }
            Ok(())
        }
        EngineResponse::Error(fault) => Err(anyhow::Error::new(FormprobeError::from(fault))),
        _ => Err(anyhow::anyhow!("Unexpected response from engine")),
    }
}
