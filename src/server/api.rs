//! API façade: execute and subscribe against a merged schema
//!
//! Every entry point comes in two forms:
//! - future-based (`execute`, `subscribe`, ...): the work is spawned on the
//!   caller-supplied executor and a boxed future of the outcome is returned;
//! - suspend-based (`execute_async`, `subscribe_async`, ...): the same work on
//!   the same executor, awaited by the caller.
//!
//! Query and accessor failures never surface as `Err` here; they are part of
//! the engine's response. `Err` only means the spawned task itself failed.

use super::schema::Schema;
use crate::core::error::ApiError;
use async_graphql::{Request, Response, Variables};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Variable values of a request, keyed by variable name
pub type VariableValues = HashMap<String, serde_json::Value>;

/// Outcome of one query or mutation
pub type ExecutionResult = Response;

/// Lazy, non-restartable sequence of subscription events
pub type SubscriptionResult = BoxStream<'static, ExecutionResult>;

pub type ExecutionFuture = BoxFuture<'static, Result<ExecutionResult, ApiError>>;

pub type SubscriptionFuture = BoxFuture<'static, Result<SubscriptionResult, ApiError>>;

/// A bundled request: query text, variables and operation name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,

    #[serde(default)]
    pub variables: VariableValues,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: VariableValues::new(),
            operation_name: None,
        }
    }

    pub fn with_variables(mut self, variables: VariableValues) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }

    /// Convert into the engine's request type
    pub fn into_engine_request(self) -> Request {
        let variables = serde_json::Value::Object(self.variables.into_iter().collect());
        let request = Request::new(self.query).variables(Variables::from_json(variables));
        match self.operation_name {
            Some(name) => request.operation_name(name),
            None => request,
        }
    }
}

/// Entry points for running requests against a resolver
///
/// Implementors supply the resolver and the merged schema; every entry point
/// is provided.
///
/// # Example
///
/// ```rust,ignore
/// let api = GraphQLApi::new(StarWars::default(), schema);
///
/// let result = api
///     .execute("{ hero { name } }", context, &Handle::current(), VariableValues::new(), None)
///     .await?;
/// ```
#[async_trait]
pub trait Api: Send + Sync {
    type Resolver: Send + Sync + 'static;
    type Context: Send + Sync + 'static;

    fn resolver(&self) -> &Arc<Self::Resolver>;

    fn schema(&self) -> &Schema<Self::Resolver, Self::Context>;

    // ── Future-based ──────────────────────────────────────────────────

    /// Execute a query or mutation on `executor`
    fn execute(
        &self,
        query: &str,
        context: Self::Context,
        executor: &Handle,
        variables: VariableValues,
        operation_name: Option<&str>,
    ) -> ExecutionFuture {
        self.execute_request(bundle(query, variables, operation_name), context, executor)
    }

    /// Execute a bundled request on `executor`
    fn execute_request(
        &self,
        request: GraphQLRequest,
        context: Self::Context,
        executor: &Handle,
    ) -> ExecutionFuture {
        let schema = self.schema().clone();
        let resolver = self.resolver().clone();
        let task = executor.spawn(async move {
            schema
                .execute(request.into_engine_request(), resolver, context)
                .await
        });
        async move { task.await.map_err(ApiError::from) }.boxed()
    }

    /// Open a subscription on `executor`
    fn subscribe(
        &self,
        query: &str,
        context: Self::Context,
        executor: &Handle,
        variables: VariableValues,
        operation_name: Option<&str>,
    ) -> SubscriptionFuture {
        self.subscribe_request(bundle(query, variables, operation_name), context, executor)
    }

    /// Open a subscription for a bundled request on `executor`
    fn subscribe_request(
        &self,
        request: GraphQLRequest,
        context: Self::Context,
        executor: &Handle,
    ) -> SubscriptionFuture {
        let schema = self.schema().clone();
        let resolver = self.resolver().clone();
        let task = executor.spawn(async move {
            schema.subscribe(request.into_engine_request(), resolver, context)
        });
        async move { task.await.map_err(ApiError::from) }.boxed()
    }

    // ── Suspend-based ─────────────────────────────────────────────────

    /// Execute a query or mutation on `executor` and wait for the outcome
    async fn execute_async(
        &self,
        query: &str,
        context: Self::Context,
        executor: &Handle,
        variables: VariableValues,
        operation_name: Option<&str>,
    ) -> Result<ExecutionResult, ApiError> {
        self.execute(query, context, executor, variables, operation_name)
            .await
    }

    /// Execute a bundled request on `executor` and wait for the outcome
    async fn execute_request_async(
        &self,
        request: GraphQLRequest,
        context: Self::Context,
        executor: &Handle,
    ) -> Result<ExecutionResult, ApiError> {
        self.execute_request(request, context, executor).await
    }

    /// Open a subscription on `executor` and wait for the stream
    async fn subscribe_async(
        &self,
        query: &str,
        context: Self::Context,
        executor: &Handle,
        variables: VariableValues,
        operation_name: Option<&str>,
    ) -> Result<SubscriptionResult, ApiError> {
        self.subscribe(query, context, executor, variables, operation_name)
            .await
    }

    /// Open a subscription for a bundled request on `executor` and wait for the stream
    async fn subscribe_request_async(
        &self,
        request: GraphQLRequest,
        context: Self::Context,
        executor: &Handle,
    ) -> Result<SubscriptionResult, ApiError> {
        self.subscribe_request(request, context, executor).await
    }
}

fn bundle(query: &str, variables: VariableValues, operation_name: Option<&str>) -> GraphQLRequest {
    GraphQLRequest {
        query: query.to_string(),
        variables,
        operation_name: operation_name.map(str::to_string),
    }
}

/// Ready-made [`Api`] pairing a resolver with a merged schema
pub struct GraphQLApi<R, C> {
    resolver: Arc<R>,
    schema: Schema<R, C>,
}

impl<R, C> GraphQLApi<R, C>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    pub fn new(resolver: R, schema: Schema<R, C>) -> Self {
        Self::from_shared(Arc::new(resolver), schema)
    }

    pub fn from_shared(resolver: Arc<R>, schema: Schema<R, C>) -> Self {
        Self { resolver, schema }
    }
}

impl<R, C> Clone for GraphQLApi<R, C> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            schema: self.schema.clone(),
        }
    }
}

impl<R, C> Api for GraphQLApi<R, C>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    type Resolver = R;
    type Context = C;

    fn resolver(&self) -> &Arc<R> {
        &self.resolver
    }

    fn schema(&self) -> &Schema<R, C> {
        &self.schema
    }
}
