//! Port trait for the underlying search engine.
//!
//! The engine exposes a single primitive: a bounded, sorted, resumable
//! search that returns, per document, both the projection-ready source
//! payload and the document's value for each sort field. Adapters live in
//! infrastructure crates (e.g. `crescendo-elastic`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::EngineResult;

use super::filter::FilterPredicate;
use super::sort::SortSpec;

/// How the total matching count is computed.
///
/// Exact counting is correct but unbounded in cost on very large result
/// sets; approximate counting trades accuracy for a bounded count phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountMode {
    /// Accurate count matching the filter, independent of the page window.
    #[default]
    Exact,
    /// Engine-default lower-bound counting.
    Approximate,
}

/// One bounded search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Caller-supplied constraints, passed through unmodified.
    pub filter: FilterPredicate,
    /// Total ordering for the result stream.
    pub sort: SortSpec,
    /// Resume strictly after this sort-value tuple, when present.
    /// `None` means "start from the beginning of the ordering".
    pub search_after: Option<Vec<Value>>,
    /// Maximum number of documents to return.
    pub limit: usize,
    /// Count accuracy for `total`.
    pub count_mode: CountMode,
}

/// One returned document.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Projection-ready source payload.
    pub source: Value,
    /// The document's value for each sort field, in sort order.
    /// This tuple is what the next cursor is derived from.
    pub sort_values: Vec<Value>,
}

/// Result of one search call.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// Up to `limit` documents, in sort order.
    pub hits: Vec<Hit>,
    /// Matching count for the filter (exact or approximate per request).
    pub total: u64,
}

/// The search engine collaborator boundary.
///
/// Implementations must be pure reads: a search call is idempotent and
/// side-effect-free from the engine's perspective. Timeout handling is the
/// implementation's concern; on timeout the call fails, there is no
/// partial-page result.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Issue one bounded, sorted, resumable search.
    async fn search(&self, request: &SearchRequest) -> EngineResult<SearchResponse>;

    /// Cheap reachability check, used at startup and by the status query.
    async fn ping(&self) -> EngineResult<()>;
}
