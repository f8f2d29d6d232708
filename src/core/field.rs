//! Field & argument binder
//!
//! Every accessor shape (property path, plain value, fallible, future,
//! fallible future) is normalized once, at declaration time, into a single
//! [`Accessor`] returning a boxed future. The engine only ever sees that form.
//!
//! The binder never calls accessors itself. It only wraps them so that
//! argument decoding failures, accessor errors and panics all end up as an
//! `Err` in the returned future.

use super::error::BuildError;
use super::types::{GraphQLType, TypeDescriptor};
use super::value::{Arguments, OutputType, Resolved, RootValue};
use async_graphql::Value;
use async_graphql::dynamic::{
    self, FieldFuture, InputValue, ResolverContext, SubscriptionFieldFuture,
};
use futures::future::{self, BoxFuture};
use futures::stream::{BoxStream, Stream, StreamExt};
use futures::{FutureExt, TryFutureExt};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Result of one field resolution
pub type ResolveResult = Result<Resolved, async_graphql::Error>;

/// Normalized accessor output
pub type ResolveFuture = BoxFuture<'static, ResolveResult>;

/// Normalized subscription accessor output
pub type SubscribeFuture =
    BoxFuture<'static, Result<BoxStream<'static, ResolveResult>, async_graphql::Error>>;

/// Execution metadata handed to raw accessors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInfo {
    /// Type owning the field (`Query` for root query fields)
    pub parent_type: String,
    pub field_name: String,
    /// Response path, e.g. `["search", "0", "name"]`
    pub path: Vec<String>,
}

impl ResolveInfo {
    pub fn new(parent_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            parent_type: parent_type.into(),
            field_name: field_name.into(),
            path: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }
}

/// The one accessor form every field resolves through
pub struct Accessor<S, C>(
    Arc<dyn Fn(&S, &C, &Arguments, &ResolveInfo) -> ResolveFuture + Send + Sync>,
);

impl<S, C> Accessor<S, C> {
    pub fn new<F>(accessor: F) -> Self
    where
        F: Fn(&S, &C, &Arguments, &ResolveInfo) -> ResolveFuture + Send + Sync + 'static,
    {
        Self(Arc::new(accessor))
    }

    /// Invoke the accessor, capturing a panic raised before the future exists
    pub fn call(
        &self,
        source: &S,
        context: &C,
        arguments: &Arguments,
        info: &ResolveInfo,
    ) -> ResolveFuture {
        match std::panic::catch_unwind(AssertUnwindSafe(|| {
            (self.0)(source, context, arguments, info)
        })) {
            Ok(future) => future,
            Err(payload) => future::ready(Err(panic_error(info, payload))).boxed(),
        }
    }
}

impl<S, C> Clone for Accessor<S, C> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

fn panic_error(info: &ResolveInfo, payload: Box<dyn Any + Send>) -> async_graphql::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    tracing::error!(
        parent_type = %info.parent_type,
        field = %info.field_name,
        panic = %message,
        "Field accessor panicked"
    );

    async_graphql::Error::new(format!(
        "Accessor for '{}.{}' panicked: {}",
        info.parent_type, info.field_name, message
    ))
}

/// Await an accessor future, turning a panic into an error
async fn guarded<T, F>(info: ResolveInfo, future: F) -> Result<T, async_graphql::Error>
where
    F: Future<Output = Result<T, async_graphql::Error>> + Send,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(panic_error(&info, payload)),
    }
}

/// A declared argument of a field
#[derive(Debug, Clone)]
pub struct Argument {
    name: String,
    ty: TypeDescriptor,
    default: Option<Value>,
    description: Option<String>,
}

impl Argument {
    /// Declare an argument whose type is derived from `T`
    pub fn new<T: GraphQLType + ?Sized>(name: impl Into<String>) -> Self {
        Self::with_type(name, T::type_descriptor())
    }

    pub fn with_type(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            description: None,
        }
    }

    /// Value used when the request omits the argument
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn to_input_value(&self) -> InputValue {
        let mut input = InputValue::new(self.name.clone(), self.ty.to_type_ref());
        if let Some(default) = &self.default {
            input = input.default_value(default.clone());
        }
        if let Some(description) = &self.description {
            input = input.description(description.clone());
        }
        input
    }
}

/// Name, return type, arguments and documentation of a field
///
/// Interface fields are plain signatures; object and root fields pair one
/// with an accessor.
#[derive(Debug, Clone)]
pub struct FieldSignature {
    name: String,
    ty: TypeDescriptor,
    arguments: Vec<Argument>,
    description: Option<String>,
    deprecation: Option<String>,
}

impl FieldSignature {
    /// Declare a field returning `T`
    pub fn new<T: GraphQLType + ?Sized>(name: impl Into<String>) -> Self {
        Self::with_type(name, T::type_descriptor())
    }

    pub fn with_type(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: Vec::new(),
            description: None,
            deprecation: None,
        }
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
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

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn doc(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn deprecation(&self) -> Option<&str> {
        self.deprecation.as_deref()
    }

    /// Reject repeated argument names
    pub(crate) fn check_arguments(&self, owner: &str) -> Result<(), BuildError> {
        for (index, argument) in self.arguments.iter().enumerate() {
            if self.arguments[..index]
                .iter()
                .any(|earlier| earlier.name == argument.name)
            {
                return Err(BuildError::DuplicateArgumentName {
                    field: format!("{}.{}", owner, self.name),
                    name: argument.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn to_interface_field(&self) -> dynamic::InterfaceField {
        let mut field = dynamic::InterfaceField::new(self.name.clone(), self.ty.to_type_ref());
        for argument in &self.arguments {
            field = field.argument(argument.to_input_value());
        }
        if let Some(description) = &self.description {
            field = field.description(description.clone());
        }
        if let Some(reason) = &self.deprecation {
            field = field.deprecation(Some(reason.as_str()));
        }
        field
    }
}

/// A field declared on source type `S`, resolved with context `C`
pub struct Field<S, C> {
    signature: FieldSignature,
    accessor: Accessor<S, C>,
}

impl<S, C> Field<S, C>
where
    S: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Field with a pre-built accessor and an explicit return type
    pub fn raw(name: impl Into<String>, ty: TypeDescriptor, accessor: Accessor<S, C>) -> Self {
        Self {
            signature: FieldSignature::with_type(name, ty),
            accessor,
        }
    }

    /// Property-path field: reads a value straight off the source
    pub fn at<T, F>(name: impl Into<String>, path: F) -> Self
    where
        T: OutputType,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self::raw(
            name,
            T::type_descriptor(),
            Accessor::new(move |source, _context, _arguments, _info| {
                future::ready(Ok(Resolved::from_output(path(source)))).boxed()
            }),
        )
    }

    /// Field computed synchronously from source, context and arguments
    pub fn sync<A, T, F>(name: impl Into<String>, accessor: F) -> Self
    where
        A: DeserializeOwned,
        T: OutputType,
        F: Fn(&S, &C, A) -> T + Send + Sync + 'static,
    {
        Self::raw(
            name,
            T::type_descriptor(),
            Accessor::new(move |source, context, arguments, _info| {
                let result = arguments
                    .parse::<A>()
                    .map(|args| Resolved::from_output(accessor(source, context, args)));
                future::ready(result).boxed()
            }),
        )
    }

    /// Synchronous field that may fail
    pub fn fallible<A, T, E, F>(name: impl Into<String>, accessor: F) -> Self
    where
        A: DeserializeOwned,
        T: OutputType,
        E: Into<async_graphql::Error> + Send + 'static,
        F: Fn(&S, &C, A) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::raw(
            name,
            T::type_descriptor(),
            Accessor::new(move |source, context, arguments, _info| {
                let result = arguments.parse::<A>().and_then(|args| {
                    accessor(source, context, args)
                        .map(Resolved::from_output)
                        .map_err(Into::into)
                });
                future::ready(result).boxed()
            }),
        )
    }

    /// Field producing its value asynchronously
    ///
    /// The returned future must own what it needs; clone out of the source
    /// before the `async` block.
    pub fn future<A, T, Fut, F>(name: impl Into<String>, accessor: F) -> Self
    where
        A: DeserializeOwned,
        T: OutputType,
        Fut: Future<Output = T> + Send + 'static,
        F: Fn(&S, &C, A) -> Fut + Send + Sync + 'static,
    {
        Self::raw(
            name,
            T::type_descriptor(),
            Accessor::new(move |source, context, arguments, info| {
                match arguments.parse::<A>() {
                    Ok(args) => {
                        let pending = accessor(source, context, args);
                        guarded(info.clone(), pending.map(|value| Ok(Resolved::from_output(value))))
                            .boxed()
                    }
                    Err(e) => future::ready(Err(e)).boxed(),
                }
            }),
        )
    }

    /// Asynchronous field that may fail
    pub fn fallible_future<A, T, E, Fut, F>(name: impl Into<String>, accessor: F) -> Self
    where
        A: DeserializeOwned,
        T: OutputType,
        E: Into<async_graphql::Error> + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        F: Fn(&S, &C, A) -> Fut + Send + Sync + 'static,
    {
        Self::raw(
            name,
            T::type_descriptor(),
            Accessor::new(move |source, context, arguments, info| {
                match arguments.parse::<A>() {
                    Ok(args) => {
                        let pending = accessor(source, context, args)
                            .map_ok(Resolved::from_output)
                            .map_err(Into::into);
                        guarded(info.clone(), pending).boxed()
                    }
                    Err(e) => future::ready(Err(e)).boxed(),
                }
            }),
        )
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.signature = self.signature.argument(argument);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.signature = self.signature.description(description);
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.signature = self.signature.deprecated(reason);
        self
    }

    pub fn signature(&self) -> &FieldSignature {
        &self.signature
    }

    pub fn accessor(&self) -> &Accessor<S, C> {
        &self.accessor
    }

    /// Erase a field whose source is the parent value of the engine
    pub(crate) fn into_member(self, owner: &str) -> FieldDescriptor {
        self.erase(owner, Origin::Parent)
    }

    /// Erase a root operation field whose source is the resolver
    pub(crate) fn into_root(self, owner: &str) -> FieldDescriptor {
        self.erase(owner, Origin::Root)
    }

    fn erase(self, owner: &str, origin: Origin) -> FieldDescriptor {
        let accessor = self.accessor;
        let declared: Arc<[Argument]> = self.signature.arguments.clone().into();
        let parent_type = owner.to_string();
        let field_name = self.signature.name.clone();

        let resolver = erased_resolver(move |ctx| {
            let info = resolve_info(&ctx, &parent_type, &field_name);
            let pending = source_and_context::<S, C>(&ctx, origin).map(|(source, context)| {
                let arguments = Arguments::collect(&ctx, &declared);
                accessor.call(source, context, &arguments, &info)
            });
            FieldFuture::new(async move {
                let value = pending?.await?;
                Ok::<_, async_graphql::Error>(value.into_non_null())
            })
        });

        FieldDescriptor {
            signature: self.signature,
            resolver,
        }
    }
}

/// Where a field finds its source value
#[derive(Debug, Clone, Copy)]
enum Origin {
    /// The value returned by the parent field
    Parent,
    /// The resolver attached to the request
    Root,
}

fn source_and_context<'a, S, C>(
    ctx: &ResolverContext<'a>,
    origin: Origin,
) -> Result<(&'a S, &'a C), async_graphql::Error>
where
    S: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    let source: &'a S = match origin {
        Origin::Parent => ctx.parent_value.try_downcast_ref::<S>()?,
        Origin::Root => ctx.ctx.data::<RootValue<S>>()?.0.as_ref(),
    };
    let context: &'a C = ctx.ctx.data::<C>()?;
    Ok((source, context))
}

fn resolve_info(ctx: &ResolverContext<'_>, parent_type: &str, field_name: &str) -> ResolveInfo {
    let path = ctx
        .ctx
        .path_node
        .map(|node| node.to_string_vec())
        .unwrap_or_default();
    ResolveInfo::new(parent_type, field_name).with_path(path)
}

type ErasedResolver =
    Arc<dyn for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static>;

type ErasedSubscriber =
    Arc<dyn for<'a> Fn(ResolverContext<'a>) -> SubscriptionFieldFuture<'a> + Send + Sync + 'static>;

fn erased_resolver<F>(resolver: F) -> ErasedResolver
where
    F: for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static,
{
    Arc::new(resolver)
}

fn erased_subscriber<F>(subscriber: F) -> ErasedSubscriber
where
    F: for<'a> Fn(ResolverContext<'a>) -> SubscriptionFieldFuture<'a> + Send + Sync + 'static,
{
    Arc::new(subscriber)
}

/// A field with its accessor erased, ready to be rendered for the engine
#[derive(Clone)]
pub struct FieldDescriptor {
    signature: FieldSignature,
    resolver: ErasedResolver,
}

impl FieldDescriptor {
    pub fn signature(&self) -> &FieldSignature {
        &self.signature
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub(crate) fn to_dynamic(&self) -> dynamic::Field {
        let resolver = self.resolver.clone();
        let mut field = dynamic::Field::new(
            self.signature.name.clone(),
            self.signature.ty.to_type_ref(),
            move |ctx| resolver(ctx),
        );
        for argument in &self.signature.arguments {
            field = field.argument(argument.to_input_value());
        }
        if let Some(description) = &self.signature.description {
            field = field.description(description.clone());
        }
        if let Some(reason) = &self.signature.deprecation {
            field = field.deprecation(Some(reason.as_str()));
        }
        field
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A root subscription field on resolver `R`, resolved with context `C`
pub struct SubscriptionField<R, C> {
    signature: FieldSignature,
    subscriber: Arc<dyn Fn(&R, &C, &Arguments, &ResolveInfo) -> SubscribeFuture + Send + Sync>,
}

impl<R, C> SubscriptionField<R, C>
where
    R: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Subscription whose accessor returns a stream of values
    pub fn stream<A, T, St, F>(name: impl Into<String>, accessor: F) -> Self
    where
        A: DeserializeOwned,
        T: OutputType,
        St: Stream<Item = T> + Send + 'static,
        F: Fn(&R, &C, A) -> St + Send + Sync + 'static,
    {
        Self {
            signature: FieldSignature::new::<T>(name),
            subscriber: Arc::new(move |resolver, context, arguments, _info| {
                let result = arguments.parse::<A>().map(|args| {
                    accessor(resolver, context, args)
                        .map(|value| Ok(Resolved::from_output(value)))
                        .boxed()
                });
                future::ready(result).boxed()
            }),
        }
    }

    /// Subscription whose accessor asynchronously opens a stream, or fails
    pub fn fallible_stream<A, T, E, St, Fut, F>(name: impl Into<String>, accessor: F) -> Self
    where
        A: DeserializeOwned,
        T: OutputType,
        E: Into<async_graphql::Error> + Send + 'static,
        St: Stream<Item = T> + Send + 'static,
        Fut: Future<Output = Result<St, E>> + Send + 'static,
        F: Fn(&R, &C, A) -> Fut + Send + Sync + 'static,
    {
        Self {
            signature: FieldSignature::new::<T>(name),
            subscriber: Arc::new(move |resolver, context, arguments, info| {
                match arguments.parse::<A>() {
                    Ok(args) => {
                        let opening = accessor(resolver, context, args)
                            .map_ok(|stream| {
                                stream.map(|value| Ok(Resolved::from_output(value))).boxed()
                            })
                            .map_err(Into::into);
                        guarded(info.clone(), opening).boxed()
                    }
                    Err(e) => future::ready(Err(e)).boxed(),
                }
            }),
        }
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.signature = self.signature.argument(argument);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.signature = self.signature.description(description);
        self
    }

    pub fn signature(&self) -> &FieldSignature {
        &self.signature
    }

    pub(crate) fn into_root(self, owner: &str) -> SubscriptionDescriptor {
        let subscriber = self.subscriber;
        let declared: Arc<[Argument]> = self.signature.arguments.clone().into();
        let parent_type = owner.to_string();
        let field_name = self.signature.name.clone();

        let resolver = erased_subscriber(move |ctx| {
            let info = resolve_info(&ctx, &parent_type, &field_name);
            let opening = source_and_context::<R, C>(&ctx, Origin::Root).map(|(root, context)| {
                let arguments = Arguments::collect(&ctx, &declared);
                match std::panic::catch_unwind(AssertUnwindSafe(|| {
                    subscriber(root, context, &arguments, &info)
                })) {
                    Ok(opening) => opening,
                    Err(payload) => future::ready(Err(panic_error(&info, payload))).boxed(),
                }
            });
            SubscriptionFieldFuture::new(async move { opening?.await })
        });

        SubscriptionDescriptor {
            signature: self.signature,
            resolver,
        }
    }
}

/// A subscription field with its accessor erased
#[derive(Clone)]
pub struct SubscriptionDescriptor {
    signature: FieldSignature,
    resolver: ErasedSubscriber,
}

impl SubscriptionDescriptor {
    pub fn signature(&self) -> &FieldSignature {
        &self.signature
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub(crate) fn to_dynamic(&self) -> dynamic::SubscriptionField {
        let resolver = self.resolver.clone();
        let mut field = dynamic::SubscriptionField::new(
            self.signature.name.clone(),
            self.signature.ty.to_type_ref(),
            move |ctx| resolver(ctx),
        );
        for argument in &self.signature.arguments {
            field = field.argument(argument.to_input_value());
        }
        if let Some(description) = &self.signature.description {
            field = field.description(description.clone());
        }
        if let Some(reason) = &self.signature.deprecation {
            field = field.deprecation(Some(reason.as_str()));
        }
        field
    }
}

impl std::fmt::Debug for SubscriptionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionDescriptor")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
