//! Caller-supplied filter predicates.
//!
//! The filter predicate is engine-agnostic and opaque to the pagination
//! engine: it is constructed by the API layer, validated against the index
//! contract, and translated to the engine's native query representation by
//! the engine adapter.

use crate::error::{QueryError, QueryResult};
use crate::models::FacetField;

/// How multiple values within one facet group combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FacetCombine {
    /// A document matches if it carries any of the values (logical OR).
    #[default]
    Any,
    /// A document matches only if it carries all of the values (logical AND).
    All,
}

/// One facet constraint group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetFilter {
    /// Public facet name (e.g. "genre"); resolved via [`FacetField`].
    pub field: String,
    /// Values to match.
    pub values: Vec<String>,
    /// Combination semantics within this group.
    pub combine: FacetCombine,
}

/// Engine-agnostic description of text/facet/collection constraints.
///
/// All present groups combine as logical AND at the top level. An absent
/// group constrains nothing; it never means "match no documents".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    /// Free-text search term.
    pub term: Option<String>,
    /// Facet constraint groups.
    pub facets: Vec<FacetFilter>,
    /// Collection (catalog) scope.
    pub collection: Option<String>,
}

impl FilterPredicate {
    /// Whether no constraint is present at all.
    pub fn is_empty(&self) -> bool {
        self.term.as_deref().map_or(true, str::is_empty)
            && self.facets.is_empty()
            && self.collection.is_none()
    }

    /// Validate against the index contract.
    ///
    /// Unknown facet fields and empty facet groups are caller errors,
    /// reported before any network call is made.
    pub fn validate(&self) -> QueryResult<()> {
        for facet in &self.facets {
            if FacetField::from_name(&facet.field).is_none() {
                return Err(QueryError::UnknownFacetField(facet.field.clone()));
            }
            if facet.values.is_empty() {
                return Err(QueryError::EmptyFacetGroup(facet.field.clone()));
            }
        }
        Ok(())
    }
}
