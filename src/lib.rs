//! # schema-compose
//!
//! Compose independently authored GraphQL schema fragments into one
//! executable schema.
//!
//! ## Features
//!
//! - **Fragments**: Declare types and root fields in separate pieces, builder-style or declaratively
//! - **Order-Independent Merge**: Any permutation of fragments yields the same schema or the same error
//! - **Forward References**: Fragments name types owned by other fragments
//! - **Uniform Accessors**: Plain, fallible, async and fallible-async accessors behave alike
//! - **Type Descriptors**: `Option`/`Vec` wrappers map to nullable/list types at compile time
//! - **Configuration-Based Limits**: Depth, complexity and introspection from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schema_compose::prelude::*;
//!
//! pub struct Human {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! impl_object_type!(Human, "Human");
//!
//! #[derive(Deserialize)]
//! struct HumanArgs {
//!     id: String,
//! }
//!
//! let base = Fragment::<StarWars, Ctx>::builder("base")
//!     .add_type(Object::<Human, Ctx>::new("Human").field(Field::at("name", |h: &Human| h.name.clone())))
//!     .build()?;
//!
//! let search = Fragment::<StarWars, Ctx>::builder("search")
//!     .add_query(
//!         Field::sync("human", |r: &StarWars, _: &Ctx, args: HumanArgs| r.human(&args.id))
//!             .argument(Argument::new::<String>("id")),
//!     )
//!     .build()?;
//!
//! // Order does not matter
//! let schema = SchemaBuilder::new().use_fragment(search).use_fragment(base).build()?;
//! let api = GraphQLApi::new(StarWars::default(), schema);
//!
//! let result = api
//!     .execute_async(r#"{ human(id: "1000") { name } }"#, Ctx, &Handle::current(), VariableValues::new(), None)
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;

pub use async_graphql;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        definition::{Enum, EnumValue, InputObject, Interface, Object, Scalar, TypeDefinition, Union},
        error::{ApiError, BuildError},
        field::{Accessor, Argument, Field, FieldSignature, ResolveInfo, SubscriptionField},
        fragment::{Fragment, FragmentBuilder, Operation, PartialSchema},
        types::{GraphQLType, Modifier, Position, TypeDescriptor, TypeKind, unwrap},
        value::{Arguments, NoArguments, OutputType, Resolved},
    };

    // === Macros ===
    pub use crate::{impl_abstract_type, impl_enum_type, impl_object_type};

    // === Config ===
    pub use crate::config::SchemaConfig;

    // === Server ===
    pub use crate::server::{
        Api, ExecutionFuture, ExecutionResult, GraphQLApi, GraphQLRequest, Schema, SchemaBuilder,
        SubscriptionFuture, SubscriptionResult, VariableValues, build_schema,
    };

    // === External dependencies ===
    pub use async_graphql::ID;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
