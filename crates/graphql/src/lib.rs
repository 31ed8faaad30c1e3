//! GraphQL API for the Crescendo search service.
//!
//! Provides a cursor-paginated `search` query over the catalog index.
//!
//! # Building the Schema
//!
//! ```ignore
//! use std::sync::Arc;
//! use crescendo_graphql::{build_schema, ServerConfig, serve};
//!
//! let schema = build_schema(search_service);
//! serve(schema, ServerConfig::default()).await?;
//! ```

mod schema;
mod server;
mod types;

pub use schema::{
    FacetCombinator, FacetInput, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH, Order, SearchQuery,
    SearchStatus, SortInput, SortableField, Work, WorkConnection, build_schema, schema_builder,
};
pub use server::{ServerConfig, serve, serve_with_shutdown};
pub use types::CrescendoSchema;
