//! Schema fragments
//!
//! A fragment is one independently authored slice of a schema: named type
//! declarations plus root fields for each operation. Fragments are written
//! either with [`FragmentBuilder`] or by implementing [`PartialSchema`]; both
//! produce the same immutable [`Fragment`].

use super::definition::TypeDefinition;
use super::error::{BuildError, Result};
use super::field::{Field, FieldDescriptor, FieldSignature, SubscriptionDescriptor, SubscriptionField};
use std::fmt;
use std::marker::PhantomData;

/// Root operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Query,
    Mutation,
    Subscription,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::Query,
        Operation::Mutation,
        Operation::Subscription,
    ];

    /// Name of the root type holding this operation's fields
    pub fn type_name(&self) -> &'static str {
        match self {
            Operation::Query => "Query",
            Operation::Mutation => "Mutation",
            Operation::Subscription => "Subscription",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// An immutable, locally well-formed piece of a schema
///
/// `R` is the resolver (root value) root fields read from, `C` the
/// per-request context.
pub struct Fragment<R, C> {
    name: String,
    types: Vec<TypeDefinition>,
    query: Vec<FieldDescriptor>,
    mutation: Vec<FieldDescriptor>,
    subscription: Vec<SubscriptionDescriptor>,
    _marker: PhantomData<fn(&R, &C)>,
}

pub(crate) struct FragmentParts {
    pub(crate) name: String,
    pub(crate) types: Vec<TypeDefinition>,
    pub(crate) query: Vec<FieldDescriptor>,
    pub(crate) mutation: Vec<FieldDescriptor>,
    pub(crate) subscription: Vec<SubscriptionDescriptor>,
}

impl<R, C> Fragment<R, C>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Start a builder-style fragment
    pub fn builder(name: impl Into<String>) -> FragmentBuilder<R, C> {
        FragmentBuilder::new(name)
    }

    /// Build a fragment from a declarative [`PartialSchema`]
    ///
    /// Each declaration routine of `partial` runs exactly once.
    pub fn from_partial<P>(partial: &P) -> Result<Self>
    where
        P: PartialSchema<R, C> + ?Sized,
    {
        let mut builder = FragmentBuilder::new(partial.name());
        for definition in partial.types() {
            builder = builder.add_type(definition);
        }
        for field in partial.query() {
            builder = builder.add_query(field);
        }
        for field in partial.mutation() {
            builder = builder.add_mutation(field);
        }
        for field in partial.subscription() {
            builder = builder.add_subscription(field);
        }
        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[TypeDefinition] {
        &self.types
    }

    /// Signatures of this fragment's root fields for `operation`
    pub fn root_fields(&self, operation: Operation) -> Vec<&FieldSignature> {
        match operation {
            Operation::Query => self.query.iter().map(|f| f.signature()).collect(),
            Operation::Mutation => self.mutation.iter().map(|f| f.signature()).collect(),
            Operation::Subscription => self.subscription.iter().map(|f| f.signature()).collect(),
        }
    }

    pub(crate) fn into_parts(self) -> FragmentParts {
        FragmentParts {
            name: self.name,
            types: self.types,
            query: self.query,
            mutation: self.mutation,
            subscription: self.subscription,
        }
    }
}

impl<R, C> fmt::Debug for Fragment<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("name", &self.name)
            .field("types", &self.types.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("query", &self.query.iter().map(|q| q.name()).collect::<Vec<_>>())
            .field("mutation", &self.mutation.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field(
                "subscription",
                &self.subscription.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`Fragment`]
///
/// # Example
///
/// ```ignore
/// let search = Fragment::builder("search")
///     .add_type(Union::new("SearchResult").members(["Planet", "Human", "Droid"]))
///     .add_query(
///         Field::sync("search", |r: &StarWars, _: &Ctx, args: SearchArgs| r.search(&args.query))
///             .argument(Argument::new::<String>("query").default_value("R2-D2")),
///     )
///     .build()?;
/// ```
pub struct FragmentBuilder<R, C> {
    name: String,
    types: Vec<TypeDefinition>,
    query: Vec<FieldDescriptor>,
    mutation: Vec<FieldDescriptor>,
    subscription: Vec<SubscriptionDescriptor>,
    _marker: PhantomData<fn(&R, &C)>,
}

impl<R, C> FragmentBuilder<R, C>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            query: Vec::new(),
            mutation: Vec::new(),
            subscription: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a named type
    pub fn add_type(mut self, definition: impl Into<TypeDefinition>) -> Self {
        self.types.push(definition.into());
        self
    }

    pub fn add_query(mut self, field: Field<R, C>) -> Self {
        self.query
            .push(field.into_root(Operation::Query.type_name()));
        self
    }

    pub fn add_mutation(mut self, field: Field<R, C>) -> Self {
        self.mutation
            .push(field.into_root(Operation::Mutation.type_name()));
        self
    }

    pub fn add_subscription(mut self, field: SubscriptionField<R, C>) -> Self {
        self.subscription
            .push(field.into_root(Operation::Subscription.type_name()));
        self
    }

    /// Check local well-formedness and freeze the fragment
    ///
    /// Only repeated field names within one declared type and repeated
    /// argument names within one field are rejected here. Cross-fragment
    /// conflicts and references are left to the merger.
    pub fn build(self) -> Result<Fragment<R, C>> {
        let mut errors: Vec<BuildError> = self
            .types
            .iter()
            .flat_map(|definition| definition.validate(&self.name))
            .collect();

        let roots = [
            (Operation::Query, self.query.iter().map(|f| f.signature()).collect::<Vec<_>>()),
            (
                Operation::Mutation,
                self.mutation.iter().map(|f| f.signature()).collect(),
            ),
            (
                Operation::Subscription,
                self.subscription.iter().map(|f| f.signature()).collect(),
            ),
        ];
        for (operation, signatures) in &roots {
            for signature in signatures {
                if let Err(e) = signature.check_arguments(operation.type_name()) {
                    errors.push(e);
                }
            }
        }

        errors.sort_by_key(|e| e.to_string());
        if let Some(error) = errors.into_iter().next() {
            tracing::debug!(fragment = %self.name, error = %error, "Fragment rejected");
            return Err(error);
        }

        tracing::trace!(
            fragment = %self.name,
            types = self.types.len(),
            queries = self.query.len(),
            mutations = self.mutation.len(),
            subscriptions = self.subscription.len(),
            "Fragment built"
        );

        Ok(Fragment {
            name: self.name,
            types: self.types,
            query: self.query,
            mutation: self.mutation,
            subscription: self.subscription,
            _marker: PhantomData,
        })
    }
}

/// Declarative fragment
///
/// Implement the routines that apply; each defaults to declaring nothing.
/// Pass the implementation to [`Fragment::from_partial`] or straight to the
/// schema builder.
///
/// # Example
///
/// ```ignore
/// struct BaseSchema;
///
/// impl PartialSchema<StarWars, Ctx> for BaseSchema {
///     fn types(&self) -> Vec<TypeDefinition> {
///         vec![Enum::new("Episode").value(EnumValue::new("NEWHOPE")).into()]
///     }
///
///     fn query(&self) -> Vec<Field<StarWars, Ctx>> {
///         vec![Field::sync("hero", |r: &StarWars, _: &Ctx, args: HeroArgs| r.hero(args.episode))]
///     }
/// }
/// ```
pub trait PartialSchema<R, C>: Send + Sync {
    /// Name reported in conflict errors
    ///
    /// Defaults to the implementing type's name.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }

    fn types(&self) -> Vec<TypeDefinition> {
        Vec::new()
    }

    fn query(&self) -> Vec<Field<R, C>> {
        Vec::new()
    }

    fn mutation(&self) -> Vec<Field<R, C>> {
        Vec::new()
    }

    fn subscription(&self) -> Vec<SubscriptionField<R, C>> {
        Vec::new()
    }
}
