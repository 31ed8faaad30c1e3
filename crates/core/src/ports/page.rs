//! Page types for cursor-paginated queries.
//!
//! Forward-only keyset pagination: a page carries the items, the exact
//! matching count, a more-results signal, and the opaque cursor for the
//! next page. There is no previous-page cursor by design; backward
//! navigation would require a mirrored reverse-ordered query.

/// The result of one page fetch.
///
/// Ephemeral: exists only for the duration of one request/response cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Retained items, in sort order. Never longer than the requested size.
    pub items: Vec<T>,
    /// Total matching count for the filter, independent of the page window.
    pub total_count: u64,
    /// Whether strictly more documents exist beyond the last item under
    /// the current ordering.
    pub has_more: bool,
    /// Opaque resumption token. Present iff `has_more`.
    pub next_cursor: Option<String>,
}
