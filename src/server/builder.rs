//! SchemaBuilder for merging fragments into one executable schema

use super::schema::{Schema, SchemaInner};
use crate::config::SchemaConfig;
use crate::core::definition::{Reference, References, TypeDefinition};
use crate::core::error::{BuildError, Result};
use crate::core::field::{FieldDescriptor, SubscriptionDescriptor};
use crate::core::fragment::{Fragment, FragmentParts, Operation, PartialSchema};
use crate::core::types::BUILTIN_SCALARS;
use async_graphql::dynamic;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Owner recorded for names every schema already provides
const BUILTIN_OWNER: &str = "(built-in)";

/// Builder merging fragments into a [`Schema`]
///
/// Fragments may be supplied in any order; the result (or the error) is the
/// same for every permutation.
///
/// # Example
///
/// ```ignore
/// let schema = SchemaBuilder::new()
///     .with_config(SchemaConfig::from_yaml_file("schema.yaml")?)
///     .use_partial(&SearchSchema)?
///     .use_partial(&BaseSchema)?
///     .build()?;
/// ```
pub struct SchemaBuilder<R, C> {
    config: SchemaConfig,
    fragments: Vec<Fragment<R, C>>,
}

impl<R, C> Default for SchemaBuilder<R, C>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C> SchemaBuilder<R, C>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Create a new SchemaBuilder
    pub fn new() -> Self {
        Self {
            config: SchemaConfig::default(),
            fragments: Vec::new(),
        }
    }

    /// Apply limits and switches to the built schema
    pub fn with_config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a built fragment
    pub fn use_fragment(mut self, fragment: Fragment<R, C>) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Add several built fragments
    pub fn use_fragments(mut self, fragments: impl IntoIterator<Item = Fragment<R, C>>) -> Self {
        self.fragments.extend(fragments);
        self
    }

    /// Build a declarative fragment and add it
    ///
    /// Fails when the fragment itself is malformed (repeated argument or
    /// field names).
    pub fn use_partial<P>(self, partial: &P) -> Result<Self>
    where
        P: PartialSchema<R, C> + ?Sized,
    {
        let fragment = Fragment::from_partial(partial)?;
        Ok(self.use_fragment(fragment))
    }

    /// Merge every fragment
    ///
    /// This will:
    /// 1. Register every type name and root field with the fragments declaring it
    /// 2. Reject names declared more than once
    /// 3. Resolve every by-name reference against the merged type set
    /// 4. Require at least one query field
    /// 5. Hand the result to the execution engine
    pub fn build(self) -> Result<Schema<R, C>> {
        let parts: Vec<FragmentParts> = self
            .fragments
            .into_iter()
            .map(Fragment::into_parts)
            .collect();

        tracing::debug!(fragments = parts.len(), "Merging schema fragments");

        // ── Phase 1: registration ─────────────────────────────────────

        check_conflicts(&parts)?;

        let mut fragment_names: Vec<String> = parts.iter().map(|p| p.name.clone()).collect();
        fragment_names.sort();

        let mut types = BTreeMap::new();
        let mut query = BTreeMap::new();
        let mut mutation = BTreeMap::new();
        let mut subscription = BTreeMap::new();

        for part in parts {
            for definition in part.types {
                tracing::trace!(
                    fragment = %part.name,
                    type_name = %definition.name(),
                    kind = %definition.kind(),
                    "Registered type"
                );
                types.insert(definition.name().to_string(), definition);
            }
            register_fields(&part.name, Operation::Query, part.query, &mut query);
            register_fields(&part.name, Operation::Mutation, part.mutation, &mut mutation);
            for field in part.subscription {
                tracing::trace!(
                    fragment = %part.name,
                    operation = %Operation::Subscription,
                    field = %field.name(),
                    "Registered root field"
                );
                subscription.insert(field.name().to_string(), field);
            }
        }

        // ── Phase 2: resolution ───────────────────────────────────────

        resolve_references(&types, &query, &mutation, &subscription)?;
        if query.is_empty() {
            return Err(BuildError::MissingQueryRoot);
        }
        let implementers = collect_implementers(&types);

        let executable = build_executable(&self.config, &types, &query, &mutation, &subscription)?;

        tracing::debug!(
            types = types.len(),
            queries = query.len(),
            mutations = mutation.len(),
            subscriptions = subscription.len(),
            "Schema merged"
        );

        Ok(Schema::from_inner(Arc::new(SchemaInner {
            types,
            query,
            mutation,
            subscription,
            implementers,
            fragments: fragment_names,
            executable,
        })))
    }
}

/// Merge `fragments` with the default configuration
pub fn build_schema<R, C>(fragments: impl IntoIterator<Item = Fragment<R, C>>) -> Result<Schema<R, C>>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    SchemaBuilder::new().use_fragments(fragments).build()
}

fn register_fields(
    fragment: &str,
    operation: Operation,
    fields: Vec<FieldDescriptor>,
    into: &mut BTreeMap<String, FieldDescriptor>,
) {
    for field in fields {
        tracing::trace!(
            fragment = %fragment,
            operation = %operation,
            field = %field.name(),
            "Registered root field"
        );
        into.insert(field.name().to_string(), field);
    }
}

/// Reject any type or root field name declared more than once
///
/// The whole registration is gathered first and the lexicographically first
/// conflict reported, with its fragments sorted, so the outcome does not
/// depend on fragment order.
fn check_conflicts(parts: &[FragmentParts]) -> Result<()> {
    let mut type_owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for name in BUILTIN_SCALARS {
        type_owners.insert(name, vec![BUILTIN_OWNER]);
    }
    for operation in Operation::ALL {
        type_owners.insert(operation.type_name(), vec![BUILTIN_OWNER]);
    }

    let mut field_owners: BTreeMap<(Operation, &str), Vec<&str>> = BTreeMap::new();

    for part in parts {
        for definition in &part.types {
            type_owners
                .entry(definition.name())
                .or_default()
                .push(&part.name);
        }
        let roots = [
            (Operation::Query, part.query.iter().map(|f| f.name()).collect::<Vec<_>>()),
            (Operation::Mutation, part.mutation.iter().map(|f| f.name()).collect()),
            (
                Operation::Subscription,
                part.subscription.iter().map(SubscriptionDescriptor::name).collect(),
            ),
        ];
        for (operation, names) in roots {
            for name in names {
                field_owners
                    .entry((operation, name))
                    .or_default()
                    .push(&part.name);
            }
        }
    }

    if let Some((name, owners)) = type_owners.iter().find(|(_, owners)| owners.len() > 1) {
        return Err(BuildError::DuplicateTypeName {
            name: name.to_string(),
            fragments: sorted(owners),
        });
    }

    if let Some(((operation, name), owners)) =
        field_owners.iter().find(|(_, owners)| owners.len() > 1)
    {
        return Err(BuildError::DuplicateFieldName {
            owner: operation.type_name().to_string(),
            name: name.to_string(),
            fragments: sorted(owners),
        });
    }

    Ok(())
}

fn sorted(owners: &[&str]) -> Vec<String> {
    let mut owners: Vec<String> = owners.iter().map(|o| o.to_string()).collect();
    owners.sort();
    owners
}

/// Check every by-name reference, types first (sorted), then root fields
///
/// A reference must name a declared type of the expected kind, and that kind
/// must be allowed where the reference sits (input or output).
fn resolve_references(
    types: &BTreeMap<String, TypeDefinition>,
    query: &BTreeMap<String, FieldDescriptor>,
    mutation: &BTreeMap<String, FieldDescriptor>,
    subscription: &BTreeMap<String, SubscriptionDescriptor>,
) -> Result<()> {
    let mut references: Vec<Reference> = types
        .values()
        .flat_map(TypeDefinition::references)
        .collect();

    let mut roots = References::default();
    for field in query.values() {
        roots.signature(Operation::Query.type_name(), field.signature());
    }
    for field in mutation.values() {
        roots.signature(Operation::Mutation.type_name(), field.signature());
    }
    for field in subscription.values() {
        roots.signature(Operation::Subscription.type_name(), field.signature());
    }
    references.extend(roots.into_vec());

    for reference in references {
        match types.get(&reference.name) {
            None => {
                return Err(BuildError::UnresolvedReference {
                    referencing: reference.referencing,
                    name: reference.name,
                });
            }
            Some(definition) if definition.kind() != reference.expected => {
                return Err(BuildError::KindMismatch {
                    referencing: reference.referencing,
                    name: reference.name,
                    expected: reference.expected,
                    found: definition.kind(),
                });
            }
            Some(definition) => match reference.position {
                Some(position) if !position.accepts(definition.kind()) => {
                    return Err(BuildError::MisplacedType {
                        referencing: reference.referencing,
                        name: reference.name,
                        kind: definition.kind(),
                        position,
                    });
                }
                _ => {}
            },
        }
    }

    Ok(())
}

/// Interface name -> sorted names of the objects declaring it
fn collect_implementers(types: &BTreeMap<String, TypeDefinition>) -> BTreeMap<String, Vec<String>> {
    let mut implementers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    // Objects are visited in sorted order, so each list ends up sorted.
    for definition in types.values() {
        for interface in definition.interfaces() {
            implementers
                .entry(interface.to_string())
                .or_default()
                .push(definition.name().to_string());
        }
    }
    implementers
}

fn build_executable(
    config: &SchemaConfig,
    types: &BTreeMap<String, TypeDefinition>,
    query: &BTreeMap<String, FieldDescriptor>,
    mutation: &BTreeMap<String, FieldDescriptor>,
    subscription: &BTreeMap<String, SubscriptionDescriptor>,
) -> Result<dynamic::Schema> {
    let mutation_name = (!mutation.is_empty()).then_some(Operation::Mutation.type_name());
    let subscription_name =
        (!subscription.is_empty()).then_some(Operation::Subscription.type_name());

    let mut builder = dynamic::Schema::build(
        Operation::Query.type_name(),
        mutation_name,
        subscription_name,
    );

    let mut query_root = dynamic::Object::new(Operation::Query.type_name());
    for field in query.values() {
        query_root = query_root.field(field.to_dynamic());
    }
    builder = builder.register(query_root);

    if mutation_name.is_some() {
        let mut mutation_root = dynamic::Object::new(Operation::Mutation.type_name());
        for field in mutation.values() {
            mutation_root = mutation_root.field(field.to_dynamic());
        }
        builder = builder.register(mutation_root);
    }

    if subscription_name.is_some() {
        let mut subscription_root = dynamic::Subscription::new(Operation::Subscription.type_name());
        for field in subscription.values() {
            subscription_root = subscription_root.field(field.to_dynamic());
        }
        builder = builder.register(subscription_root);
    }

    for definition in types.values() {
        builder = builder.register(definition.to_dynamic());
    }

    if let Some(depth) = config.max_depth {
        builder = builder.limit_depth(depth);
    }
    if let Some(complexity) = config.max_complexity {
        builder = builder.limit_complexity(complexity);
    }
    if let Some(depth) = config.max_recursive_depth {
        builder = builder.limit_recursive_depth(depth);
    }
    if !config.introspection {
        builder = builder.disable_introspection();
    }

    builder.finish().map_err(|e| {
        tracing::warn!(error = %e, "Execution engine rejected merged schema");
        BuildError::Engine(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::{Interface, Object, Union};
    use crate::core::field::{Field, FieldSignature};
    use crate::core::types::{GraphQLType, TypeDescriptor, TypeKind};
    use crate::core::value::{NoArguments, OutputType};
    use async_graphql::dynamic::FieldValue;

    struct Root;

    struct Ship {
        name: String,
    }

    impl GraphQLType for Ship {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::object("Ship")
        }
    }

    impl OutputType for Ship {
        fn into_field_value(self) -> FieldValue<'static> {
            FieldValue::owned_any(self)
        }
    }

    // ── Test fragments ────────────────────────────────────────────────

    fn ships() -> Fragment<Root, ()> {
        Fragment::builder("ships")
            .add_type(
                Object::<Ship, ()>::new("Ship")
                    .implements("Named")
                    .field(Field::at("name", |s: &Ship| s.name.clone())),
            )
            .add_query(Field::sync("flagship", |_: &Root, _: &(), _: NoArguments| Ship {
                name: "Home One".to_string(),
            }))
            .build()
            .unwrap()
    }

    fn named() -> Fragment<Root, ()> {
        Fragment::builder("named")
            .add_type(Interface::new("Named").field(FieldSignature::new::<String>("name")))
            .build()
            .unwrap()
    }

    fn fleet(name: &str) -> Fragment<Root, ()> {
        Fragment::builder(name)
            .add_type(Union::new("Fleet").member("Ship"))
            .build()
            .unwrap()
    }

    // ── Tests ─────────────────────────────────────────────────────────

    #[test]
    fn test_merge_is_order_independent() {
        let forward = build_schema(vec![ships(), named()]).unwrap();
        let backward = build_schema(vec![named(), ships()]).unwrap();

        assert_eq!(forward.type_names(), vec!["Named", "Ship"]);
        assert_eq!(forward.type_names(), backward.type_names());
        assert_eq!(forward.sdl(), backward.sdl());
        assert_eq!(forward.implementers("Named"), &["Ship".to_string()]);
    }

    #[test]
    fn test_duplicate_type_is_rejected_in_every_order() {
        let expected = BuildError::DuplicateTypeName {
            name: "Fleet".to_string(),
            fragments: vec!["alpha".to_string(), "beta".to_string()],
        };

        let first = build_schema(vec![ships(), named(), fleet("alpha"), fleet("beta")]);
        let second = build_schema(vec![fleet("beta"), named(), fleet("alpha"), ships()]);

        assert_eq!(first.unwrap_err(), expected);
        assert_eq!(second.unwrap_err(), expected);
    }

    #[test]
    fn test_builtin_names_are_reserved() {
        let shadow = Fragment::<Root, ()>::builder("shadow")
            .add_type(Union::new("Query").member("Ship"))
            .build()
            .unwrap();

        let err = build_schema(vec![ships(), named(), shadow]).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateTypeName {
                name: "Query".to_string(),
                fragments: vec![BUILTIN_OWNER.to_string(), "shadow".to_string()],
            }
        );
    }

    #[test]
    fn test_duplicate_root_field_is_rejected() {
        let again = Fragment::<Root, ()>::builder("again")
            .add_query(Field::sync("flagship", |_: &Root, _: &(), _: NoArguments| 1_i32))
            .build()
            .unwrap();

        let err = build_schema(vec![again, ships(), named()]).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateFieldName {
                owner: "Query".to_string(),
                name: "flagship".to_string(),
                fragments: vec!["again".to_string(), "ships".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_interface_is_unresolved() {
        let err = build_schema(vec![ships()]).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnresolvedReference {
                referencing: "Ship".to_string(),
                name: "Named".to_string(),
            }
        );
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let not_an_interface = Fragment::<Root, ()>::builder("named")
            .add_type(Union::new("Named").member("Ship"))
            .build()
            .unwrap();

        let err = build_schema(vec![ships(), not_an_interface]).unwrap_err();
        assert_eq!(
            err,
            BuildError::KindMismatch {
                referencing: "Ship".to_string(),
                name: "Named".to_string(),
                expected: TypeKind::Interface,
                found: TypeKind::Union,
            }
        );
    }

    #[test]
    fn test_schema_without_query_fields_is_rejected() {
        let err = build_schema(vec![named()]).unwrap_err();
        assert_eq!(err, BuildError::MissingQueryRoot);
    }

    #[test]
    fn test_type_declared_twice_in_one_fragment_lists_it_twice() {
        let twice = Fragment::<Root, ()>::builder("twice")
            .add_type(Union::new("Fleet").member("Ship"))
            .add_type(Union::new("Fleet").member("Ship"))
            .build()
            .unwrap();

        let err = build_schema(vec![ships(), named(), twice]).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateTypeName {
                name: "Fleet".to_string(),
                fragments: vec!["twice".to_string(), "twice".to_string()],
            }
        );
    }

    #[test]
    fn test_config_is_applied() {
        let schema = SchemaBuilder::new()
            .with_config(SchemaConfig {
                introspection: false,
                ..SchemaConfig::default()
            })
            .use_fragments(vec![named(), ships()])
            .build()
            .unwrap();

        assert_eq!(schema.fragment_names(), &["named".to_string(), "ships".to_string()]);
    }
}
