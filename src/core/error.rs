//! Typed errors for schema composition
//!
//! # Error Categories
//!
//! - [`BuildError`]: fatal problems found while building fragments or merging
//!   them. A schema is never produced when one of these is returned.
//! - [`ApiError`]: failures of the façade itself (not of the query). Query and
//!   accessor failures are reported inside the engine's response instead.
//!
//! # Example
//!
//! ```rust,ignore
//! match SchemaBuilder::new().use_fragment(base).use_fragment(search).build() {
//!     Ok(schema) => serve(schema),
//!     Err(BuildError::DuplicateTypeName { name, fragments }) => {
//!         eprintln!("{} is declared by {:?}", name, fragments);
//!     }
//!     Err(e) => eprintln!("schema build failed: {}", e),
//! }
//! ```

use super::types::{Position, TypeKind};
use thiserror::Error;

/// Result of building fragments or merging them
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors raised while building fragments or merging them into a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A type name is declared more than once
    ///
    /// `fragments` holds one entry per declaration, sorted so the error does
    /// not depend on input order. A fragment declaring the name twice, or two
    /// fragments sharing a name, appear twice.
    #[error("Type '{name}' is declared more than once (by {})", .fragments.join(", "))]
    DuplicateTypeName { name: String, fragments: Vec<String> },

    /// A field name is declared more than once within one owner
    ///
    /// `owner` is a root operation type (`Query`, `Mutation`, `Subscription`)
    /// or the object/interface type declaring the field.
    #[error("Field '{owner}.{name}' is declared more than once (by {})", .fragments.join(", "))]
    DuplicateFieldName {
        owner: String,
        name: String,
        fragments: Vec<String>,
    },

    /// A referenced type name is absent from the merged schema
    #[error("'{referencing}' references unknown type '{name}'")]
    UnresolvedReference { referencing: String, name: String },

    /// A referenced type exists but has the wrong kind
    #[error("'{referencing}' expects '{name}' to be {expected}, but it is {found}")]
    KindMismatch {
        referencing: String,
        name: String,
        expected: TypeKind,
        found: TypeKind,
    },

    /// A type is used where its kind is not allowed
    ///
    /// Arguments and input fields take scalars, enums and input objects;
    /// field return types take anything but input objects.
    #[error("'{referencing}' uses {kind} '{name}' as an {position} type")]
    MisplacedType {
        referencing: String,
        name: String,
        kind: TypeKind,
        position: Position,
    },

    /// No fragment declares a query field, so there is no `Query` root
    #[error("No fragment declares a query field")]
    MissingQueryRoot,

    /// An argument name is declared more than once on one field
    #[error("Argument '{name}' is declared more than once on field '{field}'")]
    DuplicateArgumentName { field: String, name: String },

    /// The execution engine rejected the merged schema
    #[error("Execution engine rejected the schema: {0}")]
    Engine(String),
}

impl BuildError {
    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BuildError::DuplicateTypeName { .. } => "DUPLICATE_TYPE_NAME",
            BuildError::DuplicateFieldName { .. } => "DUPLICATE_FIELD_NAME",
            BuildError::UnresolvedReference { .. } => "UNRESOLVED_REFERENCE",
            BuildError::KindMismatch { .. } => "KIND_MISMATCH",
            BuildError::MisplacedType { .. } => "MISPLACED_TYPE",
            BuildError::MissingQueryRoot => "MISSING_QUERY_ROOT",
            BuildError::DuplicateArgumentName { .. } => "DUPLICATE_ARGUMENT_NAME",
            BuildError::Engine(_) => "ENGINE_REJECTED",
        }
    }
}

/// Errors raised by the API façade
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request task spawned on the caller's executor did not complete
    #[error("Request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
