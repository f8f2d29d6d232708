//! Named type declarations contributed by fragments
//!
//! Typed builders ([`Object`], [`Interface`], [`Union`], [`Enum`], [`Scalar`],
//! [`InputObject`]) convert into an erased [`TypeDefinition`], which is what
//! fragments store and the merger consumes. References to other types are
//! kept by name only; they are resolved when fragments are merged.

use super::error::BuildError;
use super::field::{Argument, Field, FieldDescriptor, FieldSignature};
use super::types::{BUILTIN_SCALARS, Position, TypeKind};
use async_graphql::dynamic::{self, EnumItem};
use indexmap::IndexSet;
use std::collections::HashSet;

/// A named, kind-tagged type declaration
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    name: String,
    description: Option<String>,
    body: TypeBody,
}

#[derive(Debug, Clone)]
enum TypeBody {
    Object {
        interfaces: IndexSet<String>,
        fields: Vec<FieldDescriptor>,
    },
    Interface {
        fields: Vec<FieldSignature>,
    },
    Union {
        members: IndexSet<String>,
    },
    Enum {
        values: Vec<EnumValue>,
    },
    Scalar,
    Input {
        fields: Vec<Argument>,
    },
}

/// A by-name reference from one declaration to another type
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reference {
    /// Type or `Type.field` holding the reference
    pub(crate) referencing: String,
    pub(crate) name: String,
    pub(crate) expected: TypeKind,
    /// Set for field, argument and input field types
    pub(crate) position: Option<Position>,
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        match &self.body {
            TypeBody::Object { .. } => TypeKind::Object,
            TypeBody::Interface { .. } => TypeKind::Interface,
            TypeBody::Union { .. } => TypeKind::Union,
            TypeBody::Enum { .. } => TypeKind::Enum,
            TypeBody::Scalar => TypeKind::Scalar,
            TypeBody::Input { .. } => TypeKind::Input,
        }
    }

    /// Signatures of the output fields of an object or interface
    pub fn fields(&self) -> Vec<&FieldSignature> {
        match &self.body {
            TypeBody::Object { fields, .. } => fields.iter().map(|f| f.signature()).collect(),
            TypeBody::Interface { fields } => fields.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Fields of an input object
    pub fn input_fields(&self) -> &[Argument] {
        match &self.body {
            TypeBody::Input { fields } => fields,
            _ => &[],
        }
    }

    /// Interfaces an object declares it implements
    pub fn interfaces(&self) -> Vec<&str> {
        match &self.body {
            TypeBody::Object { interfaces, .. } => interfaces.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Member object names of a union
    pub fn members(&self) -> Vec<&str> {
        match &self.body {
            TypeBody::Union { members } => members.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Values of an enum
    pub fn values(&self) -> &[EnumValue] {
        match &self.body {
            TypeBody::Enum { values } => values,
            _ => &[],
        }
    }

    /// Every type this declaration names, with the kind it must have
    ///
    /// Built-in scalars are always present and are left out.
    pub(crate) fn references(&self) -> Vec<Reference> {
        let mut references = References::default();

        match &self.body {
            TypeBody::Object { interfaces, fields } => {
                for interface in interfaces {
                    references.push(self.name.clone(), interface, TypeKind::Interface, None);
                }
                for field in fields {
                    references.signature(&self.name, field.signature());
                }
            }
            TypeBody::Interface { fields } => {
                for field in fields {
                    references.signature(&self.name, field);
                }
            }
            TypeBody::Union { members } => {
                for member in members {
                    references.push(self.name.clone(), member, TypeKind::Object, None);
                }
            }
            TypeBody::Input { fields } => {
                for field in fields {
                    let referencing = format!("{}.{}", self.name, field.name());
                    references.push(
                        referencing,
                        field.ty().name(),
                        field.ty().kind(),
                        Some(Position::Input),
                    );
                }
            }
            TypeBody::Enum { .. } | TypeBody::Scalar => {}
        }

        references.into_vec()
    }

    /// Local well-formedness: unique field and argument names
    pub(crate) fn validate(&self, fragment: &str) -> Vec<BuildError> {
        let mut errors = Vec::new();
        let names: Vec<&str> = match &self.body {
            TypeBody::Object { fields, .. } => fields.iter().map(|f| f.name()).collect(),
            TypeBody::Interface { fields } => fields.iter().map(|f| f.name()).collect(),
            TypeBody::Input { fields } => fields.iter().map(|f| f.name()).collect(),
            TypeBody::Enum { values } => values.iter().map(|v| v.name()).collect(),
            TypeBody::Union { .. } | TypeBody::Scalar => Vec::new(),
        };

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for name in names {
            if !seen.insert(name) && reported.insert(name) {
                errors.push(BuildError::DuplicateFieldName {
                    owner: self.name.clone(),
                    name: name.to_string(),
                    fragments: vec![fragment.to_string()],
                });
            }
        }

        for signature in self.fields() {
            if let Err(e) = signature.check_arguments(&self.name) {
                errors.push(e);
            }
        }

        errors
    }

    /// Render for the execution engine
    pub(crate) fn to_dynamic(&self) -> dynamic::Type {
        match &self.body {
            TypeBody::Object { interfaces, fields } => {
                let mut object = dynamic::Object::new(self.name.clone());
                if let Some(description) = &self.description {
                    object = object.description(description.clone());
                }
                for interface in interfaces {
                    object = object.implement(interface.clone());
                }
                for field in fields {
                    object = object.field(field.to_dynamic());
                }
                dynamic::Type::Object(object)
            }
            TypeBody::Interface { fields } => {
                let mut interface = dynamic::Interface::new(self.name.clone());
                if let Some(description) = &self.description {
                    interface = interface.description(description.clone());
                }
                for field in fields {
                    interface = interface.field(field.to_interface_field());
                }
                dynamic::Type::Interface(interface)
            }
            TypeBody::Union { members } => {
                let mut union = dynamic::Union::new(self.name.clone());
                if let Some(description) = &self.description {
                    union = union.description(description.clone());
                }
                for member in members {
                    union = union.possible_type(member.clone());
                }
                dynamic::Type::Union(union)
            }
            TypeBody::Enum { values } => {
                let mut enumeration = dynamic::Enum::new(self.name.clone());
                if let Some(description) = &self.description {
                    enumeration = enumeration.description(description.clone());
                }
                for value in values {
                    enumeration = enumeration.item(value.to_item());
                }
                dynamic::Type::Enum(enumeration)
            }
            TypeBody::Scalar => {
                let mut scalar = dynamic::Scalar::new(self.name.clone());
                if let Some(description) = &self.description {
                    scalar = scalar.description(description.clone());
                }
                dynamic::Type::Scalar(scalar)
            }
            TypeBody::Input { fields } => {
                let mut input = dynamic::InputObject::new(self.name.clone());
                if let Some(description) = &self.description {
                    input = input.description(description.clone());
                }
                for field in fields {
                    input = input.field(field.to_input_value());
                }
                dynamic::Type::InputObject(input)
            }
        }
    }
}

/// Collects by-name references, skipping built-in scalars
#[derive(Debug, Default)]
pub(crate) struct References(Vec<Reference>);

impl References {
    fn push(
        &mut self,
        referencing: String,
        name: &str,
        expected: TypeKind,
        position: Option<Position>,
    ) {
        let builtin = BUILTIN_SCALARS.iter().any(|scalar| *scalar == name);
        if expected == TypeKind::Scalar && builtin {
            return;
        }
        self.0.push(Reference {
            referencing,
            name: name.to_string(),
            expected,
            position,
        });
    }

    /// Return type and argument types of one field
    pub(crate) fn signature(&mut self, owner: &str, signature: &FieldSignature) {
        let referencing = format!("{}.{}", owner, signature.name());
        for argument in signature.arguments() {
            self.push(
                format!("{}({}:)", referencing, argument.name()),
                argument.ty().name(),
                argument.ty().kind(),
                Some(Position::Input),
            );
        }
        self.push(
            referencing,
            signature.ty().name(),
            signature.ty().kind(),
            Some(Position::Output),
        );
    }

    pub(crate) fn into_vec(self) -> Vec<Reference> {
        self.0
    }
}

/// Object type builder; `S` is the native value its fields read from
pub struct Object<S, C> {
    name: String,
    description: Option<String>,
    interfaces: IndexSet<String>,
    fields: Vec<FieldDescriptor>,
    _marker: std::marker::PhantomData<fn(&S, &C)>,
}

impl<S, C> Object<S, C>
where
    S: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            interfaces: IndexSet::new(),
            fields: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare an implemented interface, possibly owned by another fragment
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.insert(interface.into());
        self
    }

    pub fn field(mut self, field: Field<S, C>) -> Self {
        let descriptor = field.into_member(&self.name);
        self.fields.push(descriptor);
        self
    }
}

impl<S, C> From<Object<S, C>> for TypeDefinition {
    fn from(object: Object<S, C>) -> Self {
        TypeDefinition {
            name: object.name,
            description: object.description,
            body: TypeBody::Object {
                interfaces: object.interfaces,
                fields: object.fields,
            },
        }
    }
}

/// Interface type builder
#[derive(Debug, Clone)]
pub struct Interface {
    name: String,
    description: Option<String>,
    fields: Vec<FieldSignature>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldSignature) -> Self {
        self.fields.push(field);
        self
    }
}

impl From<Interface> for TypeDefinition {
    fn from(interface: Interface) -> Self {
        TypeDefinition {
            name: interface.name,
            description: interface.description,
            body: TypeBody::Interface {
                fields: interface.fields,
            },
        }
    }
}

/// Union type builder
#[derive(Debug, Clone)]
pub struct Union {
    name: String,
    description: Option<String>,
    members: IndexSet<String>,
}

impl Union {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            members: IndexSet::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.insert(name.into());
        self
    }

    pub fn members<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.members.extend(names.into_iter().map(Into::into));
        self
    }
}

impl From<Union> for TypeDefinition {
    fn from(union: Union) -> Self {
        TypeDefinition {
            name: union.name,
            description: union.description,
            body: TypeBody::Union {
                members: union.members,
            },
        }
    }
}

/// One value of an enum type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    name: String,
    description: Option<String>,
    deprecation: Option<String>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation = Some(reason.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn deprecation(&self) -> Option<&str> {
        self.deprecation.as_deref()
    }

    fn to_item(&self) -> EnumItem {
        let mut item = EnumItem::new(self.name.clone());
        if let Some(description) = &self.description {
            item = item.description(description.clone());
        }
        match &self.deprecation {
            Some(reason) => item.deprecation(Some(reason.as_str())),
            None => item,
        }
    }
}

/// Enum type builder
#[derive(Debug, Clone)]
pub struct Enum {
    name: String,
    description: Option<String>,
    values: Vec<EnumValue>,
}

impl Enum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn value(mut self, value: EnumValue) -> Self {
        self.values.push(value);
        self
    }
}

impl From<Enum> for TypeDefinition {
    fn from(enumeration: Enum) -> Self {
        TypeDefinition {
            name: enumeration.name,
            description: enumeration.description,
            body: TypeBody::Enum {
                values: enumeration.values,
            },
        }
    }
}

/// Custom scalar builder; values pass through the engine unchanged
#[derive(Debug, Clone)]
pub struct Scalar {
    name: String,
    description: Option<String>,
}

impl Scalar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<Scalar> for TypeDefinition {
    fn from(scalar: Scalar) -> Self {
        TypeDefinition {
            name: scalar.name,
            description: scalar.description,
            body: TypeBody::Scalar,
        }
    }
}

/// Input object builder; its fields are declared like arguments
#[derive(Debug, Clone)]
pub struct InputObject {
    name: String,
    description: Option<String>,
    fields: Vec<Argument>,
}

impl InputObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: Argument) -> Self {
        self.fields.push(field);
        self
    }
}

impl From<InputObject> for TypeDefinition {
    fn from(input: InputObject) -> Self {
        TypeDefinition {
            name: input.name,
            description: input.description,
            body: TypeBody::Input {
                fields: input.fields,
            },
        }
    }
}
