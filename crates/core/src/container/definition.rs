//! Definitions: structured recipes for one registered entry.
//!
//! A [`Definition`] names a target type from the container's type catalog,
//! an ordered list of constructor arguments and an ordered list of method
//! calls made on the fresh object before it is handed out.

use crate::container::container::Container;
use crate::container::resolver::ResolutionPath;
use crate::container::value::{Arguments, Instance, Literal, Value};
use crate::errors::ContainerError;
use std::sync::{Arc, PoisonError, RwLock};

/// A constructor or positional method argument
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Plain data; a string naming a known type or registered alias is
    /// resolved through the container instead of being passed as text
    Value(Literal),
    /// Always resolved through the container
    Alias(String),
    /// Always passed through unchanged
    Literal(Literal),
}

impl Argument {
    pub fn alias(alias: impl Into<String>) -> Self {
        Argument::Alias(alias.into())
    }

    pub fn literal(value: impl Into<Literal>) -> Self {
        Argument::Literal(value.into())
    }
}

impl From<Literal> for Argument {
    fn from(value: Literal) -> Self {
        Argument::Value(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Value(Literal::from(value))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Value(Literal::from(value))
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Value(Literal::from(value))
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Value(Literal::from(value))
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Argument::Value(Literal::from(value))
    }
}

/// Argument of a post-construction method call
#[derive(Debug, Clone, PartialEq)]
pub enum MethodArgument {
    Positional(Argument),
    /// Legacy keyed form: when `key` is a registered alias the argument is
    /// `resolve(key, value)` with `value` spread as call-time parameters,
    /// otherwise `value` is passed through as a literal
    Keyed { key: String, value: Literal },
}

impl MethodArgument {
    pub fn keyed(key: impl Into<String>, value: impl Into<Literal>) -> Self {
        MethodArgument::Keyed {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<Argument> for MethodArgument {
    fn from(argument: Argument) -> Self {
        MethodArgument::Positional(argument)
    }
}

impl From<Literal> for MethodArgument {
    fn from(value: Literal) -> Self {
        MethodArgument::Positional(Argument::from(value))
    }
}

impl From<&str> for MethodArgument {
    fn from(value: &str) -> Self {
        MethodArgument::Positional(Argument::from(value))
    }
}

impl From<String> for MethodArgument {
    fn from(value: String) -> Self {
        MethodArgument::Positional(Argument::from(value))
    }
}

impl From<i64> for MethodArgument {
    fn from(value: i64) -> Self {
        MethodArgument::Positional(Argument::from(value))
    }
}

impl From<f64> for MethodArgument {
    fn from(value: f64) -> Self {
        MethodArgument::Positional(Argument::from(value))
    }
}

impl From<bool> for MethodArgument {
    fn from(value: bool) -> Self {
        MethodArgument::Positional(Argument::from(value))
    }
}

/// One method invocation recorded on a definition
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Vec<MethodArgument>,
}

/// Recipe describing how to build and configure one object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    class: Option<String>,
    arguments: Vec<Argument>,
    methods: Vec<MethodCall>,
    auto: bool,
}

impl Definition {
    /// Definition targeting `class`, constructed without auto-wiring
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Self::default()
        }
    }

    /// Switch auto-wiring on or off for argument-less construction
    pub fn auto_resolve(mut self, auto: bool) -> Self {
        self.auto = auto;
        self
    }

    pub fn with_argument(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn with_arguments<I, A>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    pub fn with_method_call<I, A>(mut self, method: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<MethodArgument>,
    {
        self.methods.push(MethodCall {
            method: method.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_method_calls<I, S>(mut self, calls: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<MethodArgument>)>,
        S: Into<String>,
    {
        for (method, arguments) in calls {
            self = self.with_method_call(method, arguments);
        }
        self
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn method_calls(&self) -> &[MethodCall] {
        &self.methods
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    pub fn has_class(&self) -> bool {
        self.class.is_some()
    }

    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }

    pub fn has_method_calls(&self) -> bool {
        !self.methods.is_empty()
    }

    /// Build the object: constructor injection, then method calls
    pub fn invoke(&self, container: &Container) -> Result<Instance, ContainerError> {
        self.invoke_in(container, &mut ResolutionPath::new())
    }

    pub(crate) fn invoke_in(
        &self,
        container: &Container,
        path: &mut ResolutionPath,
    ) -> Result<Instance, ContainerError> {
        let class = self.class.as_deref().ok_or_else(|| {
            ContainerError::configuration("The definition has no class associated with it")
        })?;

        let descriptor = container.type_descriptor(class)?;

        let mut object = if self.has_arguments() {
            let mut values = Vec::with_capacity(self.arguments.len());
            for argument in &self.arguments {
                values.push(resolve_constructor_argument(container, argument, path)?);
            }
            descriptor.construct(&Arguments::new(class, values))?
        } else if self.auto {
            container.construct_in(class, path)?
        } else {
            descriptor.construct(&Arguments::empty(class))?
        };

        for call in &self.methods {
            let mut values = Vec::with_capacity(call.arguments.len());
            for argument in &call.arguments {
                values.push(resolve_method_argument(container, argument, path)?);
            }
            tracing::trace!("Calling {}::{} during resolution", class, call.method);
            descriptor.invoke_method(
                object.as_mut(),
                &call.method,
                &Arguments::new(format!("{}::{}", class, call.method), values),
            )?;
        }

        Ok(Instance::from_boxed(class, object))
    }
}

fn resolve_constructor_argument(
    container: &Container,
    argument: &Argument,
    path: &mut ResolutionPath,
) -> Result<Value, ContainerError> {
    match argument {
        Argument::Value(Literal::String(name))
            if container.is_constructible(name) || container.registered(name) =>
        {
            container.resolve_in(name, Vec::new(), path)
        }
        Argument::Value(literal) | Argument::Literal(literal) => Ok(Value::Literal(literal.clone())),
        Argument::Alias(alias) => container.resolve_in(alias, Vec::new(), path),
    }
}

// Method arguments only consult registered aliases, not the type catalog.
fn resolve_method_argument(
    container: &Container,
    argument: &MethodArgument,
    path: &mut ResolutionPath,
) -> Result<Value, ContainerError> {
    match argument {
        MethodArgument::Keyed { key, value } if container.registered(key) => {
            container.resolve_in(key, spread_parameters(value), path)
        }
        MethodArgument::Keyed { value, .. } => Ok(Value::Literal(value.clone())),
        MethodArgument::Positional(Argument::Value(Literal::String(name)))
            if container.registered(name) =>
        {
            container.resolve_in(name, Vec::new(), path)
        }
        MethodArgument::Positional(Argument::Value(literal))
        | MethodArgument::Positional(Argument::Literal(literal)) => {
            Ok(Value::Literal(literal.clone()))
        }
        MethodArgument::Positional(Argument::Alias(alias)) => {
            container.resolve_in(alias, Vec::new(), path)
        }
    }
}

/// Call-time parameters carried by a keyed method argument
fn spread_parameters(value: &Literal) -> Vec<Value> {
    match value {
        Literal::Null => Vec::new(),
        Literal::Array(items) => items.iter().cloned().map(Value::Literal).collect(),
        Literal::Object(map) => map.values().cloned().map(Value::Literal).collect(),
        other => vec![Value::Literal(other.clone())],
    }
}

/// Shared handle to a registered definition, for fluent configuration
///
/// Changes made through the handle apply to every later resolution of the
/// alias; instances already cached as shared are left as they are.
#[derive(Debug, Clone)]
pub struct DefinitionHandle {
    inner: Arc<RwLock<Definition>>,
}

impl DefinitionHandle {
    pub fn new(definition: Definition) -> Self {
        Self {
            inner: Arc::new(RwLock::new(definition)),
        }
    }

    fn update(&self, apply: impl FnOnce(Definition) -> Definition) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let current = std::mem::take(&mut *guard);
        *guard = apply(current);
    }

    /// Copy of the current definition
    pub fn snapshot(&self) -> Definition {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn with_argument(self, argument: impl Into<Argument>) -> Self {
        let argument = argument.into();
        self.update(|definition| definition.with_argument(argument));
        self
    }

    pub fn with_arguments<I, A>(self, arguments: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        let arguments: Vec<Argument> = arguments.into_iter().map(Into::into).collect();
        self.update(|definition| definition.with_arguments(arguments));
        self
    }

    pub fn with_method_call<I, A>(self, method: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<MethodArgument>,
    {
        let method = method.into();
        let arguments: Vec<MethodArgument> = arguments.into_iter().map(Into::into).collect();
        self.update(|definition| definition.with_method_call(method, arguments));
        self
    }

    pub fn with_method_calls<I, S>(self, calls: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<MethodArgument>)>,
        S: Into<String>,
    {
        let calls: Vec<(String, Vec<MethodArgument>)> = calls
            .into_iter()
            .map(|(method, arguments)| (method.into(), arguments))
            .collect();
        self.update(|definition| definition.with_method_calls(calls));
        self
    }

    pub fn has_class(&self) -> bool {
        self.snapshot().has_class()
    }

    pub fn has_arguments(&self) -> bool {
        self.snapshot().has_arguments()
    }

    pub fn has_method_calls(&self) -> bool {
        self.snapshot().has_method_calls()
    }

    /// Build from the definition as it is right now
    pub fn invoke(&self, container: &Container) -> Result<Instance, ContainerError> {
        self.snapshot().invoke(container)
    }

    pub(crate) fn invoke_in(
        &self,
        container: &Container,
        path: &mut ResolutionPath,
    ) -> Result<Instance, ContainerError> {
        self.snapshot().invoke_in(container, path)
    }
}
