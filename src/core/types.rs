//! Type descriptors and the Optional/List modifier unwrapper
//!
//! A [`TypeDescriptor`] names a terminal schema type, records its kind, and
//! carries the stack of wrapper layers found around it. The stack is assembled
//! statically through the [`GraphQLType`] trait: `Option<T>` and `Vec<T>`
//! prepend their modifier to whatever `T` reports, so no runtime inspection of
//! native types is ever needed.

use async_graphql::ID;
use async_graphql::dynamic::TypeRef;
use std::fmt;
use std::sync::Arc;

/// A single wrapper layer around a terminal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// The value at this depth may be null
    Optional,
    /// The value at this depth is a list
    List,
}

/// Kind of a named schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Enum,
    Union,
    Input,
}

impl TypeKind {
    /// Human-readable name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Object => "object",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Union => "union",
            TypeKind::Input => "input object",
        }
    }

    /// Whether values of this kind may be returned by a field
    pub fn is_output(&self) -> bool {
        !matches!(self, TypeKind::Input)
    }

    /// Whether values of this kind may be passed as arguments
    pub fn is_input(&self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::Input)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a type is used: as a value going in or coming out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Argument or input object field
    Input,
    /// Field return type
    Output,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Input => "input",
            Position::Output => "output",
        }
    }

    pub fn accepts(&self, kind: TypeKind) -> bool {
        match self {
            Position::Input => kind.is_input(),
            Position::Output => kind.is_output(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the scalars every schema provides
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// A terminal type plus its modifier stack (outermost first)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    modifiers: Vec<Modifier>,
}

impl TypeDescriptor {
    /// Create a descriptor for a terminal (unwrapped) type
    pub fn terminal(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Vec::new(),
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::terminal(name, TypeKind::Scalar)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::terminal(name, TypeKind::Object)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::terminal(name, TypeKind::Interface)
    }

    pub fn union(name: impl Into<String>) -> Self {
        Self::terminal(name, TypeKind::Union)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::terminal(name, TypeKind::Enum)
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self::terminal(name, TypeKind::Input)
    }

    /// Wrap this descriptor in one more (outer) layer
    pub fn wrap(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(0, modifier);
        self
    }

    /// Name of the terminal type
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Modifier stack, outermost layer first
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// True when no wrapper layer remains
    pub fn is_terminal(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// True when the outermost layer accepts null
    pub fn is_nullable(&self) -> bool {
        matches!(self.modifiers.first(), Some(Modifier::Optional))
    }

    /// The descriptor with every wrapper layer stripped
    pub fn terminal_type(&self) -> TypeDescriptor {
        Self::terminal(self.name.clone(), self.kind)
    }

    /// Render as an engine type reference
    ///
    /// Layers are applied innermost-out. A depth without an `Optional` layer
    /// renders as non-null, matching GraphQL's implicit non-null convention.
    pub fn to_type_ref(&self) -> TypeRef {
        render(&self.name, &self.modifiers)
    }
}

fn render(name: &str, modifiers: &[Modifier]) -> TypeRef {
    match modifiers.split_first() {
        None => TypeRef::NonNull(Box::new(TypeRef::named(name))),
        Some((Modifier::Optional, rest)) => match render(name, rest) {
            TypeRef::NonNull(inner) => *inner,
            nullable => nullable,
        },
        Some((Modifier::List, rest)) => {
            TypeRef::NonNull(Box::new(TypeRef::List(Box::new(render(name, rest)))))
        }
    }
}

fn write_notation(f: &mut fmt::Formatter<'_>, name: &str, modifiers: &[Modifier]) -> fmt::Result {
    // Collapse consecutive Optional layers, then print the non-null bang
    // whenever a depth has none.
    let (nullable, rest) = match modifiers.split_first() {
        Some((Modifier::Optional, _)) => {
            let skip = modifiers
                .iter()
                .take_while(|m| **m == Modifier::Optional)
                .count();
            (true, &modifiers[skip..])
        }
        _ => (false, modifiers),
    };

    match rest.split_first() {
        None => f.write_str(name)?,
        Some((Modifier::List, inner)) => {
            f.write_str("[")?;
            write_notation(f, name, inner)?;
            f.write_str("]")?;
        }
        Some((Modifier::Optional, _)) => unreachable!("optional layers are collapsed above"),
    }

    if !nullable {
        f.write_str("!")?;
    }
    Ok(())
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_notation(f, &self.name, &self.modifiers)
    }
}

/// Native types that know their schema type descriptor
///
/// Terminal types return a descriptor with an empty modifier stack; wrapper
/// types delegate to their inner type and prepend their own layer.
pub trait GraphQLType {
    fn type_descriptor() -> TypeDescriptor;
}

/// Strip every wrapper layer from `T`, recording each one
///
/// `unwrap::<Vec<Option<i32>>>()` yields `Int` with modifiers `[List, Optional]`.
pub fn unwrap<T: GraphQLType + ?Sized>() -> TypeDescriptor {
    T::type_descriptor()
}

impl<T: GraphQLType> GraphQLType for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor().wrap(Modifier::Optional)
    }
}

impl<T: GraphQLType> GraphQLType for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor().wrap(Modifier::List)
    }
}

impl<T: GraphQLType + ?Sized> GraphQLType for Box<T> {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

impl<T: GraphQLType + ?Sized> GraphQLType for Arc<T> {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

macro_rules! builtin_scalar {
    ($name:literal => $($type:ty),+) => {
        $(
            impl GraphQLType for $type {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::scalar($name)
                }
            }
        )+
    };
}

builtin_scalar!("String" => String, str);
builtin_scalar!("Int" => i8, i16, i32, i64, u8, u16, u32, u64);
builtin_scalar!("Float" => f32, f64);
builtin_scalar!("Boolean" => bool);
builtin_scalar!("ID" => ID);
