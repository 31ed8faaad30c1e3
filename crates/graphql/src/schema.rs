//! GraphQL schema definition.
//!
//! This module provides the search query surface: one cursor-paginated
//! `search` query plus a service status query. Input validation follows
//! the same DoS-hygiene rules as the rest of the service: bounded string
//! lengths, bounded facet group counts, silently clamped page sizes.

use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Result, Schema,
    SchemaBuilder,
};
use chrono::{DateTime, Utc};

use crescendo_core::error::{CursorError, SearchError};
use crescendo_core::models::CatalogWork;
use crescendo_core::ports::{
    CountMode, FacetCombine, FacetFilter, FilterPredicate, Page, SortDirection,
    SortField as CoreSortField, SortKey,
};
use crescendo_core::services::SearchService;

use crate::types::CrescendoSchema;

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// Maximum length for the free-text term.
const MAX_TERM_LENGTH: usize = 256;
/// Maximum length for string filter parameters (facet values, collection).
const MAX_FILTER_STRING_LENGTH: usize = 128;
/// Maximum number of facet groups per request.
const MAX_FACET_GROUPS: usize = 8;
/// Maximum number of values within one facet group.
const MAX_FACET_VALUES: usize = 32;

// -----------------------------------------------------------------------------
// Schema Builder
// -----------------------------------------------------------------------------

/// Build the search schema with depth and complexity limits.
pub fn build_schema(service: Arc<SearchService>) -> CrescendoSchema {
    Schema::build(SearchQuery, EmptyMutation, EmptySubscription)
        .data(service)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

/// Create a schema builder with the service attached.
///
/// Use this to register extra context data before `.finish()`.
/// Remember to call `.limit_depth()` and `.limit_complexity()`.
pub fn schema_builder(
    service: Arc<SearchService>,
) -> SchemaBuilder<SearchQuery, EmptyMutation, EmptySubscription> {
    Schema::build(SearchQuery, EmptyMutation, EmptySubscription).data(service)
}

// -----------------------------------------------------------------------------
// Search Query
// -----------------------------------------------------------------------------

/// GraphQL query root for catalog search.
#[derive(Default)]
pub struct SearchQuery;

#[Object]
impl SearchQuery {
    /// Search catalog works with cursor pagination.
    ///
    /// Forward-only: follow `nextCursor` until `hasMore` is false. A cursor
    /// is only valid for the sort it was produced under; changing the sort
    /// mid-pagination requires restarting from the first page.
    #[allow(clippy::too_many_arguments)]
    async fn search<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        #[graphql(desc = "Free-text search term")] term: Option<String>,
        #[graphql(desc = "Facet constraints, combined with AND across groups")]
        facets: Option<Vec<FacetInput>>,
        #[graphql(desc = "Restrict to one catalog")] collection: Option<String>,
        #[graphql(default = 20)] first: Option<i32>,
        #[graphql(desc = "Cursor from the previous page")] after: Option<String>,
        #[graphql(desc = "Sort preference; a unique tiebreaker is always appended")]
        sort: Option<Vec<SortInput>>,
    ) -> Result<WorkConnection> {
        validate_term(&term)?;
        validate_filter_string(&collection, "collection")?;
        let facets = facets.unwrap_or_default();
        validate_facets(&facets)?;

        let service = ctx.data::<Arc<SearchService>>()?;

        let filter = FilterPredicate {
            term: term.filter(|t| !t.is_empty()),
            facets: facets.into_iter().map(FacetFilter::from).collect(),
            collection,
        };

        let requested: Vec<SortKey> = sort
            .unwrap_or_default()
            .into_iter()
            .map(SortKey::from)
            .collect();

        let page = service
            .fetch_page::<CatalogWork>(
                filter,
                &requested,
                after.as_deref(),
                first.map(|n| n.max(1) as usize),
            )
            .await
            .map_err(graphql_error)?;

        Ok(WorkConnection::from(page))
    }

    /// Service status: engine reachability and pagination limits.
    async fn status<'ctx>(&self, ctx: &Context<'ctx>) -> Result<SearchStatus> {
        let service = ctx.data::<Arc<SearchService>>()?;

        Ok(SearchStatus {
            engine_healthy: service.engine_healthy().await,
            max_page_size: service.config().max_page_size as i32,
            exact_counts: service.config().count_mode == CountMode::Exact,
        })
    }
}

// -----------------------------------------------------------------------------
// Input Types
// -----------------------------------------------------------------------------

/// Ordering direction.
#[derive(async_graphql::Enum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl From<Order> for SortDirection {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortDirection::Asc,
            Order::Desc => SortDirection::Desc,
        }
    }
}

/// Fields available for sorting.
///
/// Only fields with a sortable index representation are listed; free-text
/// fields without one cannot be requested at all.
#[derive(async_graphql::Enum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortableField {
    Title,
    Artist,
    ReleasedAt,
    Duration,
    Relevance,
    Id,
}

impl From<SortableField> for CoreSortField {
    fn from(field: SortableField) -> Self {
        match field {
            SortableField::Title => CoreSortField::Title,
            SortableField::Artist => CoreSortField::Artist,
            SortableField::ReleasedAt => CoreSortField::ReleasedAt,
            SortableField::Duration => CoreSortField::Duration,
            SortableField::Relevance => CoreSortField::Relevance,
            SortableField::Id => CoreSortField::Id,
        }
    }
}

/// One requested sort criterion.
#[derive(async_graphql::InputObject)]
pub struct SortInput {
    pub field: SortableField,
    #[graphql(default)]
    pub direction: Order,
}

impl From<SortInput> for SortKey {
    fn from(input: SortInput) -> Self {
        SortKey::new(input.field.into(), input.direction.into())
    }
}

/// How values within one facet group combine.
#[derive(async_graphql::Enum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FacetCombinator {
    /// Match documents carrying any of the values (OR).
    #[default]
    Any,
    /// Match documents carrying all of the values (AND).
    All,
}

impl From<FacetCombinator> for FacetCombine {
    fn from(combinator: FacetCombinator) -> Self {
        match combinator {
            FacetCombinator::Any => FacetCombine::Any,
            FacetCombinator::All => FacetCombine::All,
        }
    }
}

/// One facet constraint group.
#[derive(async_graphql::InputObject)]
pub struct FacetInput {
    /// Facet name (e.g. "genre", "artist", "format").
    pub field: String,
    /// Values to match.
    pub values: Vec<String>,
    #[graphql(default)]
    pub combine: FacetCombinator,
}

impl From<FacetInput> for FacetFilter {
    fn from(input: FacetInput) -> Self {
        FacetFilter {
            field: input.field,
            values: input.values,
            combine: input.combine.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// Output Types
// -----------------------------------------------------------------------------

/// A catalog work in search results.
#[derive(async_graphql::SimpleObject)]
pub struct Work {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genres: Vec<String>,
    pub format: Option<String>,
    pub catalog: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i32>,
}

impl From<CatalogWork> for Work {
    fn from(w: CatalogWork) -> Self {
        Self {
            id: w.id,
            title: w.title,
            artist: w.artist,
            album: w.album,
            genres: w.genres,
            format: w.format,
            catalog: w.catalog,
            released_at: w.released_at,
            duration_secs: w.duration_secs.map(|d| d as i32),
        }
    }
}

/// One page of search results.
///
/// `nextCursor` is present only when `hasMore` is true. There is no
/// previous-page cursor; backward navigation is unsupported by design.
#[derive(async_graphql::SimpleObject)]
pub struct WorkConnection {
    pub items: Vec<Work>,
    pub total_count: i64,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

impl From<Page<CatalogWork>> for WorkConnection {
    fn from(page: Page<CatalogWork>) -> Self {
        Self {
            items: page.items.into_iter().map(Work::from).collect(),
            total_count: page.total_count as i64,
            has_more: page.has_more,
            next_cursor: page.next_cursor,
        }
    }
}

/// Service status.
#[derive(async_graphql::SimpleObject)]
pub struct SearchStatus {
    pub engine_healthy: bool,
    pub max_page_size: i32,
    pub exact_counts: bool,
}

// -----------------------------------------------------------------------------
// Helpers & Validation
// -----------------------------------------------------------------------------

/// Stable machine-readable code for a search failure.
fn error_code(err: &SearchError) -> &'static str {
    match err {
        SearchError::Cursor(CursorError::Malformed { .. }) => "MALFORMED_CURSOR",
        SearchError::Cursor(CursorError::Incompatible { .. }) => "INCOMPATIBLE_CURSOR",
        SearchError::Query(_) => "INVALID_FILTER",
        SearchError::Engine(_) => "SEARCH_UNAVAILABLE",
    }
}

/// Map a search failure to a GraphQL error with a `code` extension.
fn graphql_error(err: SearchError) -> async_graphql::Error {
    let code = error_code(&err);
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}

/// Validate the free-text term.
fn validate_term(term: &Option<String>) -> Result<()> {
    if let Some(value) = term {
        if value.len() > MAX_TERM_LENGTH {
            return Err(async_graphql::Error::new(format!(
                "term too long: maximum {} characters allowed",
                MAX_TERM_LENGTH
            )));
        }
    }
    Ok(())
}

/// Validate a filter string parameter.
fn validate_filter_string(s: &Option<String>, field_name: &str) -> Result<()> {
    if let Some(value) = s {
        if value.len() > MAX_FILTER_STRING_LENGTH {
            return Err(async_graphql::Error::new(format!(
                "{} too long: maximum {} characters allowed",
                field_name, MAX_FILTER_STRING_LENGTH
            )));
        }
        if value.is_empty() {
            return Err(async_graphql::Error::new(format!(
                "{} cannot be empty",
                field_name
            )));
        }
    }
    Ok(())
}

/// Validate facet group structure and sizes.
fn validate_facets(facets: &[FacetInput]) -> Result<()> {
    if facets.len() > MAX_FACET_GROUPS {
        return Err(async_graphql::Error::new(format!(
            "too many facet groups: maximum {} allowed",
            MAX_FACET_GROUPS
        )));
    }
    for facet in facets {
        validate_filter_string(&Some(facet.field.clone()), "facet field")?;
        if facet.values.len() > MAX_FACET_VALUES {
            return Err(async_graphql::Error::new(format!(
                "too many values for facet '{}': maximum {} allowed",
                facet.field, MAX_FACET_VALUES
            )));
        }
        for value in &facet.values {
            validate_filter_string(&Some(value.clone()), "facet value")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crescendo_core::error::{EngineError, QueryError};

    // Tests de validation critiques - protègent contre les requêtes DoS

    #[test]
    fn test_term_length_boundary() {
        assert!(validate_term(&None).is_ok());
        assert!(validate_term(&Some("nocturne".into())).is_ok());
        // Trop long (DoS prevention)
        assert!(validate_term(&Some("x".repeat(MAX_TERM_LENGTH + 1))).is_err());
    }

    #[test]
    fn test_validate_filter_string_boundaries() {
        // Vide = erreur (évite les requêtes inutiles)
        assert!(validate_filter_string(&Some("".into()), "x").is_err());
        // Trop long = erreur (DoS prevention)
        assert!(validate_filter_string(&Some("x".repeat(200)), "x").is_err());
        // None = OK (optionnel)
        assert!(validate_filter_string(&None, "x").is_ok());
    }

    #[test]
    fn test_facet_group_limits() {
        let group = |field: &str| FacetInput {
            field: field.into(),
            values: vec!["v".into()],
            combine: FacetCombinator::Any,
        };

        let ok: Vec<FacetInput> = (0..MAX_FACET_GROUPS).map(|_| group("genre")).collect();
        assert!(validate_facets(&ok).is_ok());

        let too_many: Vec<FacetInput> =
            (0..MAX_FACET_GROUPS + 1).map(|_| group("genre")).collect();
        assert!(validate_facets(&too_many).is_err());

        let too_many_values = vec![FacetInput {
            field: "genre".into(),
            values: (0..MAX_FACET_VALUES + 1).map(|i| i.to_string()).collect(),
            combine: FacetCombinator::Any,
        }];
        assert!(validate_facets(&too_many_values).is_err());
    }

    // Test critique: chaque famille d'erreur a un code stable côté client

    #[test]
    fn test_error_codes_map_one_to_one() {
        let malformed: SearchError = CursorError::Malformed { reason: "x".into() }.into();
        let incompatible: SearchError = CursorError::Incompatible {
            expected: "a".into(),
            found: "b".into(),
        }
        .into();
        let filter: SearchError = QueryError::UnknownFacetField("mood".into()).into();
        let engine: SearchError = EngineError::Transport("down".into()).into();

        assert_eq!(error_code(&malformed), "MALFORMED_CURSOR");
        assert_eq!(error_code(&incompatible), "INCOMPATIBLE_CURSOR");
        assert_eq!(error_code(&filter), "INVALID_FILTER");
        assert_eq!(error_code(&engine), "SEARCH_UNAVAILABLE");
    }

    #[test]
    fn test_graphql_error_carries_extension() {
        let err = graphql_error(EngineError::Transport("down".into()).into());
        assert!(err.message.contains("down"));
        assert!(err.extensions.is_some());
    }

    // Test de conversion critique - vérifie le format de sortie GraphQL

    #[test]
    fn test_sort_input_conversion() {
        let key: SortKey = SortInput {
            field: SortableField::ReleasedAt,
            direction: Order::Desc,
        }
        .into();
        assert_eq!(key.field, CoreSortField::ReleasedAt);
        assert_eq!(key.direction, SortDirection::Desc);
    }

    #[test]
    fn test_work_conversion_from_model() {
        let work = Work::from(CatalogWork {
            id: "wrk_1".into(),
            title: "Aria".into(),
            artist: "Bach".into(),
            album: None,
            genres: vec!["baroque".into()],
            format: Some("single".into()),
            catalog: None,
            released_at: None,
            duration_secs: Some(183),
        });
        assert_eq!(work.id, "wrk_1");
        assert_eq!(work.duration_secs, Some(183));
    }

    #[test]
    fn test_connection_from_page() {
        let page = Page {
            items: vec![],
            total_count: 42,
            has_more: false,
            next_cursor: None,
        };
        let conn = WorkConnection::from(page);
        assert_eq!(conn.total_count, 42);
        assert!(!conn.has_more);
        assert_eq!(conn.next_cursor, None);
    }
}
