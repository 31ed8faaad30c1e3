//! Core domain layer for the Crescendo search service.
//!
//! This crate contains the domain models, port traits (interfaces), and the
//! cursor-pagination engine for the catalog search API. It follows
//! hexagonal architecture principles - this is the innermost layer with
//! no dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    crescendo (binary)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │       crescendo-graphql       │      crescendo-elastic      │
//! │           (API)               │      (engine adapter)       │
//! ├───────────────────────────────┴─────────────────────────────┤
//! │                   crescendo-core  ← YOU ARE HERE            │
//! │               (models, ports, services)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (CatalogWork, facet fields)
//! - [`ports`] - Pagination engine types and the SearchEngine trait
//! - [`services`] - Page-fetch orchestration (SearchService)
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Keyset pagination
//!
//! Pages are addressed by opaque cursors rather than offsets. A cursor
//! encodes the sort-value tuple of the last document of a page together
//! with the sort signature that produced it; the engine resumes strictly
//! after that tuple. This keeps deep pages as cheap as the first one and
//! removes any result-count ceiling, at the price of forward-only
//! navigation.
//!
//! ## One page fetch
//!
//! 1. Decode and verify the caller's cursor against the composed ordering
//! 2. Validate the filter predicate against the index contract
//! 3. Issue one engine query for `size + 1` documents
//! 4. Trim the overfetch, derive the next cursor from the last kept hit
//! 5. Project raw sources into domain results

pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
