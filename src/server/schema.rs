//! The merged, immutable schema

use super::builder::build_schema;
use crate::core::definition::TypeDefinition;
use crate::core::error::Result;
use crate::core::field::{FieldDescriptor, FieldSignature, SubscriptionDescriptor};
use crate::core::fragment::{Fragment, Operation};
use crate::core::value::RootValue;
use async_graphql::dynamic;
use async_graphql::{Request, Response};
use futures::stream::{BoxStream, StreamExt};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) struct SchemaInner {
    pub(crate) types: BTreeMap<String, TypeDefinition>,
    pub(crate) query: BTreeMap<String, FieldDescriptor>,
    pub(crate) mutation: BTreeMap<String, FieldDescriptor>,
    pub(crate) subscription: BTreeMap<String, SubscriptionDescriptor>,
    pub(crate) implementers: BTreeMap<String, Vec<String>>,
    pub(crate) fragments: Vec<String>,
    pub(crate) executable: dynamic::Schema,
}

/// The result of merging fragments
///
/// Read-only after construction and cheap to clone; share it freely across
/// requests and threads. `R` is the resolver root fields read from, `C` the
/// per-request context.
pub struct Schema<R, C> {
    inner: Arc<SchemaInner>,
    _marker: PhantomData<fn() -> (R, C)>,
}

impl<R, C> Clone for Schema<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R, C> std::fmt::Debug for Schema<R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("fragments", &self.inner.fragments)
            .field("types", &self.inner.types.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<R, C> Schema<R, C>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Merge `fragments` into a schema
    pub fn create(fragments: impl IntoIterator<Item = Fragment<R, C>>) -> Result<Self> {
        build_schema(fragments)
    }

    pub(crate) fn from_inner(inner: Arc<SchemaInner>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Names of the declared types, sorted
    pub fn type_names(&self) -> Vec<&str> {
        self.inner.types.keys().map(String::as_str).collect()
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.inner.types.get(name)
    }

    /// Root field signatures of `operation`, sorted by name
    pub fn root_fields(&self, operation: Operation) -> Vec<&FieldSignature> {
        match operation {
            Operation::Query => self.inner.query.values().map(|f| f.signature()).collect(),
            Operation::Mutation => self.inner.mutation.values().map(|f| f.signature()).collect(),
            Operation::Subscription => self
                .inner
                .subscription
                .values()
                .map(|f| f.signature())
                .collect(),
        }
    }

    /// Root field names of `operation`, sorted
    pub fn root_field_names(&self, operation: Operation) -> Vec<&str> {
        self.root_fields(operation)
            .into_iter()
            .map(FieldSignature::name)
            .collect()
    }

    /// Objects implementing `interface`, sorted
    pub fn implementers(&self, interface: &str) -> &[String] {
        self.inner
            .implementers
            .get(interface)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Names of the merged fragments, sorted
    pub fn fragment_names(&self) -> &[String] {
        &self.inner.fragments
    }

    /// Export the schema in SDL
    pub fn sdl(&self) -> String {
        self.inner.executable.sdl()
    }

    /// The engine's executable schema
    pub fn executable(&self) -> &dynamic::Schema {
        &self.inner.executable
    }

    /// Execute one request against `resolver`
    ///
    /// Accessor failures are reported in the response's `errors`; the
    /// affected field is null.
    pub async fn execute(&self, request: Request, resolver: Arc<R>, context: C) -> Response {
        tracing::debug!(
            operation = ?request.operation_name,
            "Executing GraphQL request"
        );

        let response = self
            .inner
            .executable
            .execute(request.data(RootValue(resolver)).data(context))
            .await;

        if !response.errors.is_empty() {
            tracing::debug!(errors = response.errors.len(), "GraphQL request produced errors");
        }
        response
    }

    /// Open a subscription against `resolver`
    ///
    /// The stream is lazy: nothing runs until it is polled. Dropping it
    /// cancels the subscription.
    pub fn subscribe(
        &self,
        request: Request,
        resolver: Arc<R>,
        context: C,
    ) -> BoxStream<'static, Response> {
        tracing::debug!(
            operation = ?request.operation_name,
            "Opening GraphQL subscription"
        );

        self.inner
            .executable
            .execute_stream(request.data(RootValue(resolver)).data(context))
            .boxed()
    }
}
