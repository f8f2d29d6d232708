//! Server module for merging fragments and running requests
//!
//! This module provides:
//! - a `SchemaBuilder` that merges fragments into one schema
//! - the merged `Schema`, delegating execution to the engine
//! - the `Api` façade with future-based and suspend-based entry points

pub mod api;
pub mod builder;
pub mod schema;

pub use api::{
    Api, ExecutionFuture, ExecutionResult, GraphQLApi, GraphQLRequest, SubscriptionFuture,
    SubscriptionResult, VariableValues,
};
pub use builder::{SchemaBuilder, build_schema};
pub use schema::Schema;
