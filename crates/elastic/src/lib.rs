//! Elasticsearch-compatible engine adapter for Crescendo.
//!
//! This crate implements the `SearchEngine` port defined in
//! `crescendo-core` against an HTTP `_search` API. It owns the two pieces
//! of engine-specific knowledge:
//!
//! - [`query`] - translation of filter predicates and sort specs into the
//!   native query DSL
//! - [`client`] - the HTTP client, endpoint/index configuration, and
//!   response parsing
//!
//! # Usage
//!
//! ```ignore
//! use crescendo_elastic::{ElasticConfig, ElasticEngine};
//!
//! let engine = ElasticEngine::new(ElasticConfig {
//!     endpoint: "http://127.0.0.1:9200".into(),
//!     index_pattern: "catalog-works".into(),
//!     ..Default::default()
//! })?;
//!
//! let service = SearchService::new(SearchConfig::default(), Arc::new(engine));
//! ```

mod client;
pub mod query;

pub use client::{ElasticConfig, ElasticEngine};
