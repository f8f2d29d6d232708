//! Core module containing the building blocks of schema fragments

pub mod definition;
pub mod error;
pub mod field;
pub mod fragment;
pub mod types;
pub mod value;

pub use definition::{Enum, EnumValue, InputObject, Interface, Object, Scalar, TypeDefinition, Union};
pub use error::{ApiError, BuildError};
pub use field::{
    Accessor, Argument, Field, FieldDescriptor, FieldSignature, ResolveFuture, ResolveInfo,
    ResolveResult, SubscriptionDescriptor, SubscriptionField,
};
pub use fragment::{Fragment, FragmentBuilder, Operation, PartialSchema};
pub use types::{GraphQLType, Modifier, Position, TypeDescriptor, TypeKind, unwrap};
pub use value::{Arguments, NoArguments, OutputType, Resolved};
