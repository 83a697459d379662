//! Shared helpers for the command handlers

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Read a page file. The engine accepts raw HTML or a JSON snapshot and
/// tells them apart by the leading '{'.
pub fn load_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page file {}", path.display()))
}

/// The URL an analysis is keyed on: an explicit override wins, then the
/// URL recorded in a snapshot, then the file path as given.
pub fn effective_url(path: &Path, source: &str, override_url: Option<String>) -> String {
    if let Some(url) = override_url {
        return url;
    }
    if source.trim_start().starts_with('{')
        && let Ok(value) = serde_json::from_str::<serde_json::Value>(source)
        && let Some(url) = value.get("url").and_then(|v| v.as_str())
    {
        return url.to_string();
    }
    path.display().to_string()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Split repeated `--set key=value` arguments into a map
pub fn parse_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("Invalid --set argument '{}', expected key=value", pair);
        };
        values.insert(key.to_string(), value.to_string());
    }
    Ok(values)
}
