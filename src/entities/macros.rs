//! Macros for reducing boilerplate when exposing native types to a schema
//!
//! These macros generate the `GraphQLType` and `OutputType` implementations
//! each domain type needs so that fields can return it directly.

/// Expose a struct as a schema object type
///
/// Values are handed to the engine untouched, so the object's own field
/// accessors receive them back as `&Self`.
///
/// # Example
/// ```rust,ignore
/// pub struct Planet {
///     pub id: String,
///     pub name: String,
///     pub diameter: i32,
/// }
///
/// impl_object_type!(Planet, "Planet");
///
/// // `Field::at("planet", |_: &Query| planet())` now has type `Planet!`
/// ```
#[macro_export]
macro_rules! impl_object_type {
    ($type:ty, $type_name:expr) => {
        impl $crate::core::types::GraphQLType for $type {
            fn type_descriptor() -> $crate::core::types::TypeDescriptor {
                $crate::core::types::TypeDescriptor::object($type_name)
            }
        }

        impl $crate::core::value::OutputType for $type {
            fn into_field_value(self) -> $crate::async_graphql::dynamic::FieldValue<'static> {
                $crate::async_graphql::dynamic::FieldValue::owned_any(self)
            }
        }
    };
}

/// Expose an enum wrapping object types as an interface or union
///
/// Each variant holds exactly one value of an object type registered with
/// `impl_object_type!`; the value is tagged with that object's type name so
/// the engine can resolve the concrete type.
///
/// # Example
/// ```rust,ignore
/// pub enum Character {
///     Human(Human),
///     Droid(Droid),
/// }
///
/// impl_abstract_type!(Character, "Character", Interface, [Human, Droid]);
///
/// pub enum SearchResult {
///     Planet(Planet),
///     Human(Human),
///     Droid(Droid),
/// }
///
/// impl_abstract_type!(SearchResult, "SearchResult", Union, [Planet, Human, Droid]);
/// ```
#[macro_export]
macro_rules! impl_abstract_type {
    (
        $type:ident,
        $type_name:expr,
        $kind:ident,
        [ $( $variant:ident ),+ $(,)? ]
    ) => {
        impl $crate::core::types::GraphQLType for $type {
            fn type_descriptor() -> $crate::core::types::TypeDescriptor {
                $crate::core::types::TypeDescriptor::terminal(
                    $type_name,
                    $crate::core::types::TypeKind::$kind,
                )
            }
        }

        impl $crate::core::value::OutputType for $type {
            fn into_field_value(self) -> $crate::async_graphql::dynamic::FieldValue<'static> {
                match self {
                    $( $type::$variant(value) => $crate::core::value::member_value(value), )+
                }
            }
        }
    };
}

/// Expose a fieldless enum as a schema enum type
///
/// Generates the type registration, the output conversion, and an
/// `enum_definition()` constructor listing the values in declaration order.
///
/// # Example
/// ```rust,ignore
/// #[derive(Debug, Clone, Copy, Deserialize)]
/// pub enum Episode {
///     #[serde(rename = "NEWHOPE")]
///     NewHope,
///     #[serde(rename = "EMPIRE")]
///     Empire,
///     #[serde(rename = "JEDI")]
///     Jedi,
/// }
///
/// impl_enum_type!(Episode, "Episode", {
///     NewHope => "NEWHOPE",
///     Empire => "EMPIRE",
///     Jedi => "JEDI",
/// });
/// ```
#[macro_export]
macro_rules! impl_enum_type {
    (
        $type:ident,
        $type_name:expr,
        { $( $variant:ident => $value:expr ),+ $(,)? }
    ) => {
        impl $crate::core::types::GraphQLType for $type {
            fn type_descriptor() -> $crate::core::types::TypeDescriptor {
                $crate::core::types::TypeDescriptor::enumeration($type_name)
            }
        }

        impl $crate::core::value::OutputType for $type {
            fn into_field_value(self) -> $crate::async_graphql::dynamic::FieldValue<'static> {
                let name = match self {
                    $( $type::$variant => $value, )+
                };
                $crate::async_graphql::dynamic::FieldValue::value(
                    $crate::async_graphql::Value::Enum($crate::async_graphql::Name::new(name)),
                )
            }
        }

        impl $type {
            /// Enum declaration listing every value
            #[allow(dead_code)]
            pub fn enum_definition() -> $crate::core::definition::Enum {
                $crate::core::definition::Enum::new($type_name)
                    $( .value($crate::core::definition::EnumValue::new($value)) )+
            }
        }
    };
}
