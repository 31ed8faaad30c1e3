//! Sort-key composition for deterministic result ordering.
//!
//! Every query runs under a total ordering: the caller's requested sort keys
//! followed by a unique per-document tiebreaker. The tiebreaker makes the
//! ordering total, which is what allows a cursor to resume mid-stream
//! without duplicating or skipping documents.

use serde::{Deserialize, Serialize};

/// Ordering direction for a sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl SortDirection {
    /// Wire spelling used by the index engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Fields with an efficiently sortable index representation.
///
/// This is a closed set: a field without a sortable (keyword/numeric)
/// representation in the index cannot be named here, so an unsortable sort
/// request is unrepresentable rather than silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    /// Work title (`title.sort` keyword subfield).
    Title,
    /// Credited artist (`artist.sort` keyword subfield).
    Artist,
    /// Release date (`released_at`).
    ReleasedAt,
    /// Duration in seconds (`duration_secs`).
    Duration,
    /// Engine relevance score (`_score`). Only meaningful with a text term.
    Relevance,
    /// Unique document identifier (`id`). The designated tiebreaker.
    Id,
}

impl SortField {
    /// The index field this sort key orders on.
    pub fn index_field(&self) -> &'static str {
        match self {
            Self::Title => "title.sort",
            Self::Artist => "artist.sort",
            Self::ReleasedAt => "released_at",
            Self::Duration => "duration_secs",
            Self::Relevance => "_score",
            Self::Id => "id",
        }
    }
}

/// One requested ordering criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// The fixed tiebreaker key: `id` ascending, regardless of the other
    /// requested directions.
    pub fn tiebreaker() -> Self {
        Self::new(SortField::Id, SortDirection::Asc)
    }
}

/// The final, total ordering for one request.
///
/// Immutable once composed; one `SortSpec` governs exactly one
/// cursor-compatibility domain (see [`crate::ports::Cursor`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Compose the final ordering from the caller's requested keys.
    ///
    /// Requested keys are preserved verbatim, in order. A single `(id, asc)`
    /// tiebreaker is appended unless the requested sequence already
    /// terminates in the `id` field. Pure and deterministic.
    pub fn compose(requested: &[SortKey]) -> Self {
        let mut keys = requested.to_vec();
        if keys.last().map(|k| k.field) != Some(SortField::Id) {
            keys.push(SortKey::tiebreaker());
        }
        Self { keys }
    }

    /// The composed keys, tiebreaker included.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Number of sort keys (always at least 1).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// A composed spec is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index field names, in order. This sequence is the cursor
    /// compatibility signature.
    pub fn index_fields(&self) -> Vec<&'static str> {
        self.keys.iter().map(|k| k.field.index_field()).collect()
    }

    /// Human-readable signature for error messages.
    pub fn signature(&self) -> String {
        self.index_fields().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_yields_tiebreaker_only() {
        let spec = SortSpec::compose(&[]);
        assert_eq!(spec.keys(), &[SortKey::tiebreaker()]);
        assert_eq!(spec.index_fields(), vec!["id"]);
    }

    #[test]
    fn requested_order_preserved_verbatim() {
        let requested = [
            SortKey::new(SortField::Artist, SortDirection::Desc),
            SortKey::new(SortField::Title, SortDirection::Asc),
        ];
        let spec = SortSpec::compose(&requested);

        assert_eq!(spec.len(), 3);
        assert_eq!(&spec.keys()[..2], &requested);
        assert_eq!(spec.keys()[2], SortKey::tiebreaker());
    }

    #[test]
    fn no_double_tiebreaker_when_request_ends_in_id() {
        // Même en descendant, un tri terminant par id est déjà total
        let requested = [SortKey::new(SortField::Id, SortDirection::Desc)];
        let spec = SortSpec::compose(&requested);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec.keys()[0].direction, SortDirection::Desc);
    }

    #[test]
    fn id_in_middle_still_gets_tiebreaker() {
        // id au milieu ne termine pas la séquence : on ajoute quand même
        let requested = [
            SortKey::new(SortField::Id, SortDirection::Asc),
            SortKey::new(SortField::Title, SortDirection::Asc),
        ];
        let spec = SortSpec::compose(&requested);

        assert_eq!(spec.len(), 3);
        assert_eq!(spec.index_fields(), vec!["id", "title.sort", "id"]);
    }

    #[test]
    fn compose_is_deterministic() {
        let requested = [SortKey::new(SortField::ReleasedAt, SortDirection::Desc)];
        assert_eq!(SortSpec::compose(&requested), SortSpec::compose(&requested));
    }

    #[test]
    fn signature_joins_index_fields() {
        let spec = SortSpec::compose(&[SortKey::new(SortField::Title, SortDirection::Asc)]);
        assert_eq!(spec.signature(), "title.sort, id");
    }
}
