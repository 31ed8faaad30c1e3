//! GraphQL type definitions.

use async_graphql::{EmptyMutation, EmptySubscription, Schema};

use crate::schema::SearchQuery;

/// The search GraphQL schema type.
pub type CrescendoSchema = Schema<SearchQuery, EmptyMutation, EmptySubscription>;
