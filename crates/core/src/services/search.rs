//! Core search service - orchestrates one page fetch.
//!
//! One call is one pure read: decode cursor, compose the ordering,
//! validate the filter, make exactly one engine round trip with one extra
//! document requested, trim the overfetch, derive the next cursor from the
//! last retained hit, project the sources. No session, no lock, no shared
//! mutable state; cursors carry everything needed to resume, so calls may
//! run concurrently against the same index with no coordination.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::{CursorError, EngineError, SearchError, SearchResult};
use crate::metrics::{PageTimer, record_cursor_rejection, record_page_served, record_search_error};
use crate::ports::{
    CountMode, Cursor, FilterPredicate, Hit, Page, SearchEngine, SearchRequest, SortKey, SortSpec,
};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the search service.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Hard upper bound on the page size. Requests above it are silently
    /// clamped; this is resource protection, not a caller mistake.
    pub max_page_size: usize,
    /// Page size used when the caller does not supply one.
    pub default_page_size: usize,
    /// Exact or approximate total counting. Exact is correct but its cost
    /// grows with the result set; approximate bounds the count phase.
    pub count_mode: CountMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_page_size: 250,
            default_page_size: 20,
            count_mode: CountMode::Exact,
        }
    }
}

// =============================================================================
// SearchService
// =============================================================================

/// Pagination executor over an injected search engine.
///
/// The engine client and configuration are constructor parameters: there is
/// no ambient global client, so multiple differently-configured services
/// (e.g. multi-tenant index prefixes) can coexist in one process.
pub struct SearchService {
    config: SearchConfig,
    engine: Arc<dyn SearchEngine>,
}

impl SearchService {
    pub fn new(config: SearchConfig, engine: Arc<dyn SearchEngine>) -> Self {
        Self { config, engine }
    }

    /// The active configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Whether the underlying engine currently answers pings.
    pub async fn engine_healthy(&self) -> bool {
        self.engine.ping().await.is_ok()
    }

    /// Fetch one page of results.
    ///
    /// `requested_sort` is the caller's ordering preference; the unique
    /// tiebreaker is appended internally. `after` is the opaque cursor from
    /// the previous page, absent on the first page. `size` is clamped to
    /// the configured maximum.
    ///
    /// The returned page never carries a cursor when `has_more` is false.
    #[instrument(skip_all, fields(has_cursor = after.is_some()))]
    pub async fn fetch_page<T>(
        &self,
        filter: FilterPredicate,
        requested_sort: &[SortKey],
        after: Option<&str>,
        size: Option<usize>,
    ) -> SearchResult<Page<T>>
    where
        T: DeserializeOwned,
    {
        let _timer = PageTimer::new();

        match self.fetch_page_inner(filter, requested_sort, after, size).await {
            Ok(page) => {
                record_page_served();
                Ok(page)
            }
            Err(err) => {
                match &err {
                    SearchError::Cursor(CursorError::Malformed { .. }) => {
                        record_cursor_rejection("malformed")
                    }
                    SearchError::Cursor(CursorError::Incompatible { .. }) => {
                        record_cursor_rejection("incompatible")
                    }
                    _ => {}
                }
                record_search_error(error_kind(&err));
                Err(err)
            }
        }
    }

    async fn fetch_page_inner<T>(
        &self,
        filter: FilterPredicate,
        requested_sort: &[SortKey],
        after: Option<&str>,
        size: Option<usize>,
    ) -> SearchResult<Page<T>>
    where
        T: DeserializeOwned,
    {
        let size = size
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);

        filter.validate()?;

        let sort = SortSpec::compose(requested_sort);

        // A cursor is only honored if it was produced under this exact
        // ordering; anything else must fail, not resume a wrong page.
        let search_after = match after {
            Some(token) => {
                let cursor = Cursor::decode(token)?;
                cursor.verify(&sort)?;
                Some(cursor.into_values())
            }
            None => None,
        };

        // Overfetch by one to learn whether more results exist without a
        // second query.
        let request = SearchRequest {
            filter,
            sort: sort.clone(),
            search_after,
            limit: size + 1,
            count_mode: self.config.count_mode,
        };

        let response = self.engine.search(&request).await?;

        let has_more = response.hits.len() > size;
        let mut hits = response.hits;
        hits.truncate(size);

        let next_cursor = match (has_more, hits.last()) {
            (true, Some(last)) => {
                if last.sort_values.len() != sort.len() {
                    return Err(EngineError::MalformedResponse(format!(
                        "hit carries {} sort values, ordering has {}",
                        last.sort_values.len(),
                        sort.len()
                    ))
                    .into());
                }
                Some(Cursor::new(last.sort_values.clone(), &sort).encode()?)
            }
            _ => None,
        };

        debug!(
            returned = hits.len(),
            total = response.total,
            has_more,
            "Page assembled"
        );

        let items = hits
            .into_iter()
            .map(project::<T>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total_count: response.total,
            has_more,
            next_cursor,
        })
    }
}

/// Project one raw hit into the caller-facing result shape.
///
/// A source that does not deserialize is a broken contract with the index
/// owner and surfaces as an engine-class error.
fn project<T: DeserializeOwned>(hit: Hit) -> Result<T, EngineError> {
    serde_json::from_value(hit.source).map_err(|e| EngineError::MalformedDocument(e.to_string()))
}

/// Error family label for metrics.
fn error_kind(err: &SearchError) -> &'static str {
    match err {
        SearchError::Cursor(_) => "cursor",
        SearchError::Query(_) => "query",
        SearchError::Engine(_) => "engine",
    }
}

// =============================================================================
// Tests
// =============================================================================
