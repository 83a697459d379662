//! Engine protocol: serde request/response enums served by a task that
//! owns the `Session`. Transport is an in-process mpsc channel with a
//! oneshot responder per request; every request gets exactly one reply.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::engine;
use crate::errors::{EngineError, EngineFault, FaultKind};
use crate::fill;
use crate::locator::resolve_with_retry;
use crate::page::PageTree;
use crate::session::Session;
use crate::store::{Tier, cache_key};
use crate::types::{
    AnalysisReport, FillReport, ResolveReport, StoredFieldMap, Suggestion, SuggestionQuery,
};

/// Messages accepted by the engine task
#[derive(Debug, Serialize, Deserialize)]
pub enum EngineRequest {
    Analyze {
        /// Page source, raw HTML or a JSON snapshot
        source: String,
        url: String,
        /// Cache the result under the page's cache key
        persist: bool,
    },
    Resolve {
        source: String,
        url: String,
        key: String,
    },
    Fill {
        source: String,
        url: String,
        /// Explicit values by field key or radio-group name
        values: HashMap<String, String>,
        /// Ask the provider for values the caller did not set
        suggest: bool,
    },
    Suggest {
        query: SuggestionQuery,
    },
    CacheList,
    CacheShow {
        url: String,
    },
    CacheClear {
        /// Clear one page, or the whole cache when unset
        url: Option<String>,
    },
    Ping,
    Shutdown,
}

impl EngineRequest {
    /// Short name for logs; request payloads can hold entire pages
    pub fn label(&self) -> &'static str {
        match self {
            EngineRequest::Analyze { .. } => "analyze",
            EngineRequest::Resolve { .. } => "resolve",
            EngineRequest::Fill { .. } => "fill",
            EngineRequest::Suggest { .. } => "suggest",
            EngineRequest::CacheList => "cache-list",
            EngineRequest::CacheShow { .. } => "cache-show",
            EngineRequest::CacheClear { .. } => "cache-clear",
            EngineRequest::Ping => "ping",
            EngineRequest::Shutdown => "shutdown",
        }
    }
}

/// Replies from the engine task
#[derive(Debug, Serialize, Deserialize)]
pub enum EngineResponse {
    Analysis {
        report: AnalysisReport,
        /// Tier that took the record when the analysis was persisted
        tier: Option<Tier>,
    },
    Resolution(ResolveReport),
    Fill(FillReport),
    Suggestions(Vec<Suggestion>),
    CacheKeys(Vec<String>),
    CachedMap(StoredFieldMap),
    Cleared {
        removed: usize,
    },
    Pong,
    ShuttingDown,
    Error(EngineFault),
}

struct Envelope {
    request: EngineRequest,
    responder: oneshot::Sender<EngineResponse>,
}

/// Client half of the engine protocol
pub struct EngineHandle {
    tx: mpsc::Sender<Envelope>,
    join: tokio::task::JoinHandle<()>,
}

impl EngineHandle {
    /// Send one request and wait for its reply.
    pub async fn request(&self, request: EngineRequest) -> Result<EngineResponse> {
        let (responder, rx) = oneshot::channel();
        self.tx
            .send(Envelope { request, responder })
            .await
            .map_err(|_| anyhow::anyhow!("engine task is not running"))?;
        rx.await
            .context("engine dropped the request without answering")
    }

    /// Ask the engine to stop and wait for the task to finish.
    pub async fn shutdown(self) -> Result<()> {
        match self.request(EngineRequest::Shutdown).await? {
            EngineResponse::ShuttingDown => {}
            other => warn!("Unexpected shutdown reply: {:?}", other),
        }
        self.join.await.context("engine task panicked")?;
        Ok(())
    }
}

/// Start the engine task that owns the session.
pub fn spawn(session: Session) -> EngineHandle {
    let (tx, rx) = mpsc::channel(32);
    let join = tokio::spawn(engine_loop(session, rx));
    EngineHandle { tx, join }
}

async fn engine_loop(session: Session, mut rx: mpsc::Receiver<Envelope>) {
    info!("Engine task for session {} started", session.id);
    while let Some(Envelope { request, responder }) = rx.recv().await {
        debug!("Engine request: {}", request.label());
        let stopping = matches!(request, EngineRequest::Shutdown);
        let response = handle(&session, request).await;
        if responder.send(response).is_err() {
            warn!("Requester went away before the reply was sent");
        }
        if stopping {
            break;
        }
    }
    info!("Engine task for session {} stopped", session.id);
}

async fn handle(session: &Session, request: EngineRequest) -> EngineResponse {
    let outcome = match request {
        EngineRequest::Analyze {
            source,
            url,
            persist,
        } => analyze_page(session, &source, &url, persist),
        EngineRequest::Resolve { source, url, key } => {
            resolve_field(session, &source, &url, &key).await
        }
        EngineRequest::Fill {
            source,
            url,
            values,
            suggest,
        } => fill_page(session, &source, &url, values, suggest).await,
        EngineRequest::Suggest { query } => suggest_values(session, &query).await,
        EngineRequest::CacheList => cache_list(session),
        EngineRequest::CacheShow { url } => cache_show(session, &url),
        EngineRequest::CacheClear { url } => cache_clear(session, url.as_deref()),
        EngineRequest::Ping => Ok(EngineResponse::Pong),
        EngineRequest::Shutdown => Ok(EngineResponse::ShuttingDown),
    };
    outcome.unwrap_or_else(EngineResponse::Error)
}

/// Raw HTML and JSON snapshots share one entry point; snapshots are the
/// only accepted input starting with '{'.
fn parse_page(source: &str) -> Result<PageTree, EngineFault> {
    let loaded = if source.trim_start().starts_with('{') {
        PageTree::from_snapshot_json(source)
    } else {
        PageTree::from_html(source)
    };
    loaded.map_err(|err| EngineFault::other(format!("failed to parse page: {err}")))
}

/// Cached field map for the URL when one exists, a fresh un-persisted
/// analysis of the tree otherwise.
fn field_map(session: &Session, tree: &PageTree, url: &str) -> Result<StoredFieldMap, EngineFault> {
    let key = cache_key(url);
    match session.store.get(&key) {
        Ok(Some(map)) => return Ok(map),
        Ok(None) => {}
        Err(err) => warn!("Cache read failed for '{}': {}", key, err),
    }
    let report = engine::analyze(tree, url).map_err(|err| EngineFault::from(&err))?;
    Ok(engine::to_stored(&report))
}

fn analyze_page(
    session: &Session,
    source: &str,
    url: &str,
    persist: bool,
) -> Result<EngineResponse, EngineFault> {
    let tree = parse_page(source)?;
    let report = engine::analyze(&tree, url).map_err(|err| EngineFault::from(&err))?;

    let tier = if persist {
        let key = cache_key(url);
        let tier = session
            .store
            .put(&key, &engine::to_compact(&report), &engine::to_stored(&report))
            .map_err(|err| EngineFault::from(&err))?;
        debug!("Cached '{}' in the {:?} tier", key, tier);
        Some(tier)
    } else {
        None
    };
    Ok(EngineResponse::Analysis { report, tier })
}

async fn resolve_field(
    session: &Session,
    source: &str,
    url: &str,
    key: &str,
) -> Result<EngineResponse, EngineFault> {
    let tree = parse_page(source)?;
    let map = field_map(session, &tree, url)?;
    let Some(field) = map.field(key) else {
        return Err(EngineFault {
            kind: FaultKind::NotFound,
            message: format!("no field '{key}' known for {url}"),
        });
    };

    let descriptor = field.descriptor();
    let (resolution, attempts) = resolve_with_retry(
        &tree,
        &descriptor,
        Some(&field.title.text),
        session.config.retry_delay(),
    )
    .await;
    match resolution {
        Some(found) => Ok(EngineResponse::Resolution(ResolveReport {
            key: key.to_string(),
            strategy: found.strategy,
            attempts,
            tag: tree.tag(found.node).unwrap_or_default().to_string(),
        })),
        None => {
            let err = EngineError::ElementNotFound {
                key: key.to_string(),
                attempts,
            };
            Err(EngineFault::from(&err))
        }
    }
}

async fn fill_page(
    session: &Session,
    source: &str,
    url: &str,
    values: HashMap<String, String>,
    suggest: bool,
) -> Result<EngineResponse, EngineFault> {
    let mut tree = parse_page(source)?;
    let map = field_map(session, &tree, url)?;
    let plans = fill::build_plans(&map, &values, suggest, session.provider.as_ref()).await;
    let report = fill::fill_fields(&mut tree, url, &plans, session.config.retry_delay()).await;
    Ok(EngineResponse::Fill(report))
}

async fn suggest_values(
    session: &Session,
    query: &SuggestionQuery,
) -> Result<EngineResponse, EngineFault> {
    let suggestions = session
        .provider
        .lookup(query)
        .await
        .map_err(|err| EngineFault::from(&err))?;
    Ok(EngineResponse::Suggestions(suggestions))
}

fn cache_list(session: &Session) -> Result<EngineResponse, EngineFault> {
    session
        .store
        .list()
        .map(EngineResponse::CacheKeys)
        .map_err(|err| EngineFault::other(format!("cache listing failed: {err}")))
}

fn cache_show(session: &Session, url: &str) -> Result<EngineResponse, EngineFault> {
    let key = cache_key(url);
    match session.store.get(&key) {
        Ok(Some(map)) => Ok(EngineResponse::CachedMap(map)),
        Ok(None) => Err(EngineFault::other(format!(
            "no cached analysis for '{key}'"
        ))),
        Err(err) => Err(EngineFault::other(format!("cache read failed: {err}"))),
    }
}

fn cache_clear(session: &Session, url: Option<&str>) -> Result<EngineResponse, EngineFault> {
    let clear_failed = |err: anyhow::Error| EngineFault::other(format!("cache clear failed: {err}"));
    match url {
        Some(url) => {
            let removed = session
                .store
                .remove(&cache_key(url))
                .map_err(clear_failed)?;
            Ok(EngineResponse::Cleared {
                removed: usize::from(removed),
            })
        }
        None => {
            let keys = session.store.list().map_err(clear_failed)?;
            let mut removed = 0;
            for key in keys {
                if session.store.remove(&key).map_err(clear_failed)? {
                    removed += 1;
                }
            }
            Ok(EngineResponse::Cleared { removed })
        }
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod protocol_test;
