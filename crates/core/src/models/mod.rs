//! Domain models for indexed catalog documents.
//!
//! These models are engine-agnostic and represent the canonical form of a
//! search result within the domain layer. The field set is a contract with
//! the index owner: a document that does not project into [`CatalogWork`]
//! indicates index-schema drift, not a user error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog Documents
// =============================================================================

/// A musical work as stored in the search index.
///
/// This is the projection target of the Result Mapper: the raw `_source`
/// payload of a hit deserializes into this shape. Optional fields may be
/// absent in the index; required fields may not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogWork {
    /// Stable unique identifier. Also the sort tiebreaker field.
    pub id: String,
    /// Work title.
    pub title: String,
    /// Main credited artist.
    pub artist: String,
    /// Album or release the work belongs to.
    #[serde(default)]
    pub album: Option<String>,
    /// Genre labels attached to the work.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Release format (e.g. "single", "album", "ep").
    #[serde(default)]
    pub format: Option<String>,
    /// Catalog (collection) this work is scoped to.
    #[serde(default)]
    pub catalog: Option<String>,
    /// Release date, when known.
    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,
    /// Duration in seconds, when known.
    #[serde(default)]
    pub duration_secs: Option<u32>,
}

// =============================================================================
// Facet Fields
// =============================================================================

/// Fields that support facet filtering.
///
/// This is a closed set: the index only maintains filterable (keyword)
/// representations for these fields. Caller-supplied facet names outside
/// this set are rejected at the query-translation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetField {
    /// Genre labels (`genres`).
    Genre,
    /// Credited artist (`artist.raw`).
    Artist,
    /// Release format (`format`).
    Format,
}

impl FacetField {
    /// Resolve a caller-supplied facet name.
    ///
    /// Names follow the public API spelling, not the index mapping.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "genre" => Some(Self::Genre),
            "artist" => Some(Self::Artist),
            "format" => Some(Self::Format),
            _ => None,
        }
    }

    /// The filterable index field backing this facet.
    pub fn index_field(&self) -> &'static str {
        match self {
            Self::Genre => "genres",
            Self::Artist => "artist.raw",
            Self::Format => "format",
        }
    }
}

/// Index field holding the collection (catalog) scope.
pub const CATALOG_FIELD: &str = "catalog";

/// Full-text fields queried by the free-text term, with boosts.
pub const TEXT_SEARCH_FIELDS: &[&str] = &["title^3", "artist^2", "album"];
