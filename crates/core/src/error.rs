//! Error types for the search domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CursorError`] - Cursor token decoding and compatibility errors
//! - [`QueryError`] - Filter predicate validation errors
//! - [`EngineError`] - Search engine transport and contract errors
//! - [`SearchError`] - Top-level search operation errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! The first two families are caller errors (a broken or stale token, an
//! unknown filter field) and are never retried. Engine errors are
//! server-side: the service performs no internal retry, so callers own
//! any backoff policy.

use thiserror::Error;

// =============================================================================
// Cursor Errors
// =============================================================================

/// Cursor token errors.
///
/// A cursor is valid only against the exact sort-key sequence that produced
/// it. Both variants are caller errors: the recommended resolution for an
/// incompatible cursor is to restart from the first page.
#[derive(Debug, Error)]
pub enum CursorError {
    /// Token is not a valid serialized cursor (bad base64, bad JSON,
    /// unknown version, or inconsistent shape).
    #[error("Malformed cursor: {reason}")]
    Malformed {
        /// What failed while decoding.
        reason: String,
    },

    /// Token decoded but was produced under a different sort-key sequence.
    #[error("Incompatible cursor: expected sort signature [{expected}], found [{found}]")]
    Incompatible {
        /// Sort signature of the current request.
        expected: String,
        /// Sort signature embedded in the token.
        found: String,
    },
}

// =============================================================================
// Query Errors
// =============================================================================

/// Filter predicate validation errors.
///
/// Raised at the query-translation boundary, before any network call.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A facet group references a field that is not part of the index contract.
    #[error("Unknown facet field: {0}")]
    UnknownFacetField(String),

    /// A facet group was supplied with no values.
    ///
    /// An absent group means "no constraint"; an empty group is ambiguous
    /// and is rejected rather than silently reinterpreted.
    #[error("Facet group '{0}' has no values")]
    EmptyFacetGroup(String),
}

// =============================================================================
// Engine Errors
// =============================================================================

/// Search engine transport and contract errors.
///
/// These originate from the underlying index engine call. The original
/// engine message is preserved for diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Connection or protocol-level failure reaching the engine.
    #[error("Engine transport error: {0}")]
    Transport(String),

    /// The engine call exceeded the configured request timeout.
    #[error("Engine request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The engine rejected the request (non-success HTTP status).
    #[error("Engine rejected request (status {status}): {message}")]
    Rejected {
        /// HTTP status code returned by the engine.
        status: u16,
        /// Engine-reported error body (truncated).
        message: String,
    },

    /// The engine response did not match the expected wire shape.
    #[error("Malformed engine response: {0}")]
    MalformedResponse(String),

    /// A returned document did not match the projection shape.
    ///
    /// The document schema is a contract with the index owner, so this
    /// indicates a broken contract rather than a transient condition.
    #[error("Malformed document in engine response: {0}")]
    MalformedDocument(String),
}

// =============================================================================
// Search Errors
// =============================================================================

/// Top-level error type for one page-fetch operation.
///
/// This is the main error type returned by
/// [`crate::services::SearchService`]. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Cursor decoding or compatibility error.
    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    /// Filter predicate validation error.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Search engine failure.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl SearchError {
    /// Whether this error is caused by the caller's request (400-class)
    /// rather than by the engine or the service (500-class).
    pub fn is_caller_error(&self) -> bool {
        matches!(self, SearchError::Cursor(_) | SearchError::Query(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Result type for query translation.
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: la chaîne de conversion d'erreurs fonctionne
    // Permet d'utiliser ? à travers les couches
    #[test]
    fn test_error_conversion_chain() {
        // Cursor -> Search
        let cursor_err = CursorError::Malformed {
            reason: "bad base64".into(),
        };
        let search_err: SearchError = cursor_err.into();
        assert!(search_err.to_string().contains("bad base64"));

        // Engine -> Search
        let engine_err = EngineError::Transport("connection refused".into());
        let search_err: SearchError = engine_err.into();
        assert!(search_err.to_string().contains("connection refused"));

        // Query -> Search
        let query_err = QueryError::UnknownFacetField("mood".into());
        let search_err: SearchError = query_err.into();
        assert!(search_err.to_string().contains("mood"));
    }

    // Test critique: la classification client/serveur pilote le mapping HTTP
    #[test]
    fn test_caller_error_classification() {
        let malformed: SearchError = CursorError::Malformed { reason: "x".into() }.into();
        let unknown: SearchError = QueryError::UnknownFacetField("x".into()).into();
        let transport: SearchError = EngineError::Transport("x".into()).into();

        assert!(malformed.is_caller_error());
        assert!(unknown.is_caller_error());
        assert!(!transport.is_caller_error());
    }

    #[test]
    fn test_incompatible_cursor_includes_both_signatures() {
        let err = CursorError::Incompatible {
            expected: "title.sort, id".into(),
            found: "released_at, id".into(),
        };
        let msg = err.to_string();
        // Les deux signatures doivent être visibles pour le debug
        assert!(msg.contains("title.sort, id") && msg.contains("released_at, id"));
    }
}
