//! Values crossing the boundary between accessors and the execution engine

use super::types::GraphQLType;
use async_graphql::dynamic::{FieldValue, ResolverContext};
use async_graphql::indexmap::IndexMap;
use async_graphql::{ID, Name, Value};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Native values that can be handed to the execution engine
///
/// Scalars convert to engine values, `Option` maps `None` to null, `Vec`
/// becomes a list. Domain objects are passed through untouched so nested field
/// accessors can borrow them again (see the `impl_object_type!` macro).
///
/// A null field value is handed to the engine as "no value". Inside a list the
/// engine resolves every item, so null items are only rendered as null for
/// scalar item types.
pub trait OutputType: GraphQLType + Send + Sync + 'static {
    fn into_field_value(self) -> FieldValue<'static>;
}

impl<T: OutputType> OutputType for Option<T> {
    fn into_field_value(self) -> FieldValue<'static> {
        match self {
            Some(value) => value.into_field_value(),
            None => FieldValue::NULL,
        }
    }
}

impl<T: OutputType> OutputType for Vec<T> {
    fn into_field_value(self) -> FieldValue<'static> {
        FieldValue::list(self.into_iter().map(OutputType::into_field_value))
    }
}

impl<T: OutputType> OutputType for Box<T> {
    fn into_field_value(self) -> FieldValue<'static> {
        (*self).into_field_value()
    }
}

macro_rules! scalar_output {
    ($($type:ty),+) => {
        $(
            impl OutputType for $type {
                fn into_field_value(self) -> FieldValue<'static> {
                    FieldValue::value(Value::from(self))
                }
            }
        )+
    };
}

scalar_output!(String, i8, i16, i32, i64, u8, u16, u32, u64, f64, bool);

impl OutputType for f32 {
    fn into_field_value(self) -> FieldValue<'static> {
        FieldValue::value(Value::from(f64::from(self)))
    }
}

impl OutputType for ID {
    fn into_field_value(self) -> FieldValue<'static> {
        FieldValue::value(Value::String(self.0))
    }
}

/// Convert a member of an interface or union, tagging it with its concrete type
#[doc(hidden)]
pub fn member_value<T: OutputType>(value: T) -> FieldValue<'static> {
    let type_name = T::type_descriptor().name().to_string();
    value.into_field_value().with_type(type_name)
}

/// A resolved field value, owned and ready for the engine
pub struct Resolved(FieldValue<'static>);

impl Resolved {
    pub fn new(value: FieldValue<'static>) -> Self {
        Self(value)
    }

    pub fn from_output<T: OutputType>(value: T) -> Self {
        Self(value.into_field_value())
    }

    /// Plain engine value, if this is not a pass-through object
    pub fn as_value(&self) -> Option<&Value> {
        self.0.as_value()
    }

    pub fn into_inner(self) -> FieldValue<'static> {
        self.0
    }

    pub fn is_null(&self) -> bool {
        matches!(self.0.as_value(), Some(Value::Null))
    }

    /// `None` for null, so the engine never descends into a missing object
    pub(crate) fn into_non_null(self) -> Option<Self> {
        (!self.is_null()).then_some(self)
    }
}

impl<'a> From<Resolved> for FieldValue<'a> {
    fn from(resolved: Resolved) -> Self {
        resolved.0
    }
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_value() {
            Some(value) => f.debug_tuple("Resolved").field(value).finish(),
            None => f.write_str("Resolved(<object>)"),
        }
    }
}

/// Marker for fields that take no arguments
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NoArguments {}

/// Argument values of one field invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(IndexMap<Name, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the request's arguments, filling in declared defaults
    pub(crate) fn collect(ctx: &ResolverContext<'_>, declared: &[super::field::Argument]) -> Self {
        let mut values = ctx.args.as_index_map().clone();
        for argument in declared {
            if let Some(default) = argument.default() {
                values
                    .entry(Name::new(argument.name()))
                    .or_insert_with(|| default.clone());
            }
        }
        Self(values)
    }

    /// Add or replace one argument value
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(Name::new(name), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the arguments into a typed structure
    pub fn parse<A: DeserializeOwned>(&self) -> Result<A, async_graphql::Error> {
        async_graphql::from_value(Value::Object(self.0.clone()))
            .map_err(|e| async_graphql::Error::new(format!("Invalid arguments: {}", e)))
    }
}

/// Request data carrying the root value (the resolver) of an operation
pub(crate) struct RootValue<R>(pub(crate) Arc<R>);
