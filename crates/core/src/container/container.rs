use crate::config::schema::{ContainerConfig, EntryConfig};
use crate::container::autowiring::Injectable;
use crate::container::catalog::TypeCatalog;
use crate::container::definition::{Definition, DefinitionHandle};
use crate::container::descriptor::{TypeBinding, TypeDescriptor};
use crate::container::registry::{Recipe, RecipeSource, ServiceEntry, ServiceRegistry};
use crate::container::resolver::ResolutionPath;
use crate::container::scope::ServiceScope;
use crate::container::value::{Arguments, Instance, Value};
use crate::errors::ContainerError;
use std::any::Any;
use std::sync::{Arc, RwLock};

/// Dependency injection container resolving string aliases to values
///
/// Aliases map to a [`Recipe`]: a pre-built value, a factory function or a
/// [`Definition`]. Types a definition can build live in the container's
/// [`TypeCatalog`]. Resolving an alias that was never registered registers it
/// on the fly as a transient, auto-wired definition of the type with the
/// same name.
#[derive(Debug, Default)]
pub struct Container {
    registry: ServiceRegistry,
    catalog: RwLock<TypeCatalog>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container and apply a declarative configuration to it
    pub fn with_config(config: &ContainerConfig) -> Result<Self, ContainerError> {
        let container = Self::new();
        container.apply_config(config)?;
        Ok(container)
    }

    /// Add a constructible type to the catalog
    pub fn define_type<T: Send + Sync + 'static>(
        &self,
        binding: TypeBinding<T>,
    ) -> Result<&Self, ContainerError> {
        self.install(binding.into_descriptor())?;
        Ok(self)
    }

    /// Add an `Injectable` type to the catalog
    pub fn define<T: Injectable>(&self) -> Result<&Self, ContainerError> {
        self.define_type(TypeBinding::<T>::injectable())
    }

    fn install(&self, descriptor: TypeDescriptor) -> Result<(), ContainerError> {
        let mut catalog = self
            .catalog
            .write()
            .map_err(|_| ContainerError::lock("type_catalog"))?;
        tracing::debug!("Defining type '{}'", descriptor.name());
        if catalog.insert(descriptor).is_some() {
            tracing::debug!("Replaced an existing type definition");
        }
        Ok(())
    }

    /// Check whether `type_name` is in the type catalog
    pub fn is_constructible(&self, type_name: &str) -> bool {
        self.catalog
            .read()
            .map(|catalog| catalog.contains(type_name))
            .unwrap_or(false)
    }

    pub(crate) fn type_descriptor(
        &self,
        type_name: &str,
    ) -> Result<Arc<TypeDescriptor>, ContainerError> {
        let catalog = self
            .catalog
            .read()
            .map_err(|_| ContainerError::lock("type_catalog"))?;
        catalog
            .get(type_name)
            .ok_or_else(|| ContainerError::type_not_found(type_name))
    }

    /// Register an alias
    ///
    /// Type names (and [`RecipeSource::SelfAlias`]) are wrapped in a new
    /// [`Definition`] whose handle is returned for further configuration;
    /// `auto` decides whether an argument-less definition is auto-wired.
    /// Re-registering an alias replaces the previous recipe but leaves any
    /// cached shared instance in place.
    pub fn register(
        &self,
        alias: impl Into<String>,
        source: RecipeSource,
        shared: bool,
        auto: bool,
    ) -> Result<Option<DefinitionHandle>, ContainerError> {
        let alias = alias.into();
        let (recipe, handle) = match source {
            RecipeSource::SelfAlias => {
                let handle = DefinitionHandle::new(Definition::new(alias.clone()).auto_resolve(auto));
                (Recipe::Definition(handle.clone()), Some(handle))
            }
            RecipeSource::Type(type_name) => {
                let handle = DefinitionHandle::new(Definition::new(type_name).auto_resolve(auto));
                (Recipe::Definition(handle.clone()), Some(handle))
            }
            RecipeSource::Definition(definition) => {
                let handle = DefinitionHandle::new(definition);
                (Recipe::Definition(handle.clone()), Some(handle))
            }
            RecipeSource::Factory(factory) => (Recipe::Factory(factory), None),
            RecipeSource::Value(value) => (Recipe::Literal(value), None),
        };

        let scope = ServiceScope::from_shared(shared);
        tracing::debug!(
            "Registering '{}' as {} ({})",
            alias,
            recipe.kind(),
            scope
        );

        let entry = ServiceEntry { recipe, scope };
        if self.registry.insert(alias.clone(), entry)?.is_some() {
            tracing::warn!("Alias '{}' was already registered; replacing it", alias);
        }

        Ok(handle)
    }

    /// Register `alias` as a definition of `type_name` without auto-wiring
    pub fn register_type(
        &self,
        alias: impl Into<String>,
        type_name: impl Into<String>,
        shared: bool,
    ) -> Result<DefinitionHandle, ContainerError> {
        let handle = self.register(alias, RecipeSource::Type(type_name.into()), shared, false)?;
        handle.ok_or_else(|| ContainerError::configuration("type registration produced no definition"))
    }

    /// Register a factory called with the arguments given to `resolve`
    pub fn register_factory<F>(
        &self,
        alias: impl Into<String>,
        shared: bool,
        factory: F,
    ) -> Result<(), ContainerError>
    where
        F: Fn(&Container, Arguments) -> Result<Value, ContainerError> + Send + Sync + 'static,
    {
        self.register(alias, RecipeSource::factory(factory), shared, false)?;
        Ok(())
    }

    /// Register a pre-built value
    pub fn register_value(
        &self,
        alias: impl Into<String>,
        value: impl Into<Value>,
        shared: bool,
    ) -> Result<(), ContainerError> {
        self.register(alias, RecipeSource::Value(value.into()), shared, false)?;
        Ok(())
    }

    /// Check if an alias is registered; never registers anything
    pub fn registered(&self, alias: &str) -> bool {
        self.registry.contains(alias)
    }

    /// Resolve an alias, passing `args` to factory recipes
    pub fn resolve(&self, alias: &str, args: Vec<Value>) -> Result<Value, ContainerError> {
        self.resolve_in(alias, args, &mut ResolutionPath::new())
    }

    pub(crate) fn resolve_in(
        &self,
        alias: &str,
        args: Vec<Value>,
        path: &mut ResolutionPath,
    ) -> Result<Value, ContainerError> {
        if !self.registry.contains(alias) {
            tracing::debug!("Auto-registering unknown alias '{}'", alias);
            self.register(alias, RecipeSource::SelfAlias, false, true)?;
        }

        if let Some(value) = self.registry.cached(alias)? {
            tracing::trace!("Resolved '{}' from the shared cache", alias);
            return Ok(value);
        }

        let entry = self
            .registry
            .get(alias)?
            .ok_or_else(|| ContainerError::service_not_found(alias))?;

        path.enter(alias)?;
        tracing::trace!("Resolving '{}' via {}", alias, entry.recipe.kind());
        let produced = match &entry.recipe {
            Recipe::Literal(value) => Ok(value.clone()),
            Recipe::Factory(factory) => factory(self, Arguments::new(alias, args)),
            Recipe::Definition(handle) => handle.invoke_in(self, path).map(Value::Object),
        };
        path.leave();
        let value = produced?;

        if entry.scope.is_singleton() {
            return self.registry.cache(alias, value);
        }
        Ok(value)
    }

    /// Resolve and downcast to `T`
    pub fn make<T: Send + Sync + 'static>(&self, alias: &str) -> Result<Arc<T>, ContainerError> {
        self.make_with(alias, Vec::new())
    }

    /// Resolve with call-time arguments and downcast to `T`
    pub fn make_with<T: Send + Sync + 'static>(
        &self,
        alias: &str,
        args: Vec<Value>,
    ) -> Result<Arc<T>, ContainerError> {
        self.resolve(alias, args)?
            .downcast::<T>()
            .ok_or_else(|| ContainerError::TypeMismatch {
                alias: alias.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// Auto-wire `type_name`: resolve each declared dependency and construct
    ///
    /// A dependency that is a registered alias or a known type is resolved;
    /// anything else is passed to the constructor as null.
    pub fn build(&self, type_name: &str) -> Result<Instance, ContainerError> {
        let object = self.construct_in(type_name, &mut ResolutionPath::new())?;
        Ok(Instance::from_boxed(type_name, object))
    }

    pub(crate) fn construct_in(
        &self,
        type_name: &str,
        path: &mut ResolutionPath,
    ) -> Result<Box<dyn Any + Send + Sync>, ContainerError> {
        let descriptor = self.type_descriptor(type_name)?;
        let values = self.dependencies_in(&descriptor, path)?;
        descriptor.construct(&Arguments::new(type_name, values))
    }

    fn dependencies_in(
        &self,
        descriptor: &TypeDescriptor,
        path: &mut ResolutionPath,
    ) -> Result<Vec<Value>, ContainerError> {
        let mut values = Vec::with_capacity(descriptor.dependencies().len());
        for dependency in descriptor.dependencies() {
            if self.registered(dependency) || self.is_constructible(dependency) {
                values.push(self.resolve_in(dependency, Vec::new(), path)?);
            } else {
                tracing::debug!(
                    "Skipping unresolvable dependency '{}' of '{}'",
                    dependency,
                    descriptor.name()
                );
                values.push(Value::null());
            }
        }
        Ok(values)
    }

    /// Apply a declarative configuration, entry by entry
    pub fn apply_config(&self, config: &ContainerConfig) -> Result<(), ContainerError> {
        config.validate()?;
        for (alias, entry) in config.entries() {
            self.apply_entry(alias, entry)?;
        }
        tracing::info!("Applied container configuration with {} entries", config.len());
        Ok(())
    }

    fn apply_entry(&self, alias: &str, entry: &EntryConfig) -> Result<(), ContainerError> {
        let source = RecipeSource::from(entry.object.clone());
        let handle = self
            .register(alias, source, entry.shared, entry.auto)?
            .ok_or_else(|| ContainerError::configuration("configured entry produced no definition"))?;

        handle
            .with_arguments(entry.arguments.iter().cloned())
            .with_method_calls(entry.method_calls());
        Ok(())
    }

    /// Index-style read: same as `resolve(alias, [])`
    pub fn get(&self, alias: &str) -> Result<Value, ContainerError> {
        self.resolve(alias, Vec::new())
    }

    /// Index-style write: register a transient recipe without auto-wiring
    pub fn insert(
        &self,
        alias: impl Into<String>,
        source: impl Into<RecipeSource>,
    ) -> Result<Option<DefinitionHandle>, ContainerError> {
        self.register(alias, source.into(), false, false)
    }

    /// Index-style existence check: same as `registered`
    pub fn contains(&self, alias: &str) -> bool {
        self.registered(alias)
    }

    /// Drop the registration for `alias`; a cached shared instance stays cached
    pub fn remove(&self, alias: &str) -> Result<bool, ContainerError> {
        Ok(self.registry.remove(alias)?.is_some())
    }

    /// Registered aliases, sorted
    pub fn aliases(&self) -> Vec<String> {
        self.registry.aliases()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Number of shared instances cached so far
    pub fn shared_count(&self) -> usize {
        self.registry.shared_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct ConsoleLogger;

    struct ServiceImpl {
        logger: Arc<ConsoleLogger>,
    }

    fn container() -> Container {
        let container = Container::new();
        container
            .define_type(TypeBinding::<ConsoleLogger>::with_default("ConsoleLogger"))
            .unwrap()
            .define_type(TypeBinding::new("ServiceImpl", |args: &Arguments| {
                Ok(ServiceImpl {
                    logger: args.object::<ConsoleLogger>(0)?,
                })
            }))
            .unwrap();
        container
    }

    #[test]
    fn test_unregistered_alias_is_auto_registered() {
        let container = container();
        assert!(!container.registered("ConsoleLogger"));

        let first = container.get("ConsoleLogger").unwrap();
        let second = container.get("ConsoleLogger").unwrap();

        assert!(container.registered("ConsoleLogger"));
        assert!(first.downcast::<ConsoleLogger>().is_some());
        assert!(!first.ptr_eq(&second));
        assert_eq!(container.shared_count(), 0);
    }

    #[test]
    fn test_shared_logger_injected_into_transient_services() {
        let container = container();
        container.register_type("Logger", "ConsoleLogger", true).unwrap();
        container
            .register_type("Service", "ServiceImpl", false)
            .unwrap()
            .with_argument("Logger");

        let a = container.make::<ServiceImpl>("Service").unwrap();
        let b = container.make::<ServiceImpl>("Service").unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a.logger, &b.logger));
    }

    #[test]
    fn test_factory_receives_call_time_arguments() {
        let container = Container::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        container
            .register_factory("sum", false, move |_, args| {
                counter.fetch_add(1, Ordering::SeqCst);
                let total = args.literal::<i64>(0)? + args.literal::<i64>(1)?;
                Ok(Value::from(total))
            })
            .unwrap();

        let value = container
            .resolve("sum", vec![Value::from(2i64), Value::from(40i64)])
            .unwrap();

        assert_eq!(value.as_literal(), Some(&serde_json::json!(42)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_definition_is_configuration_error() {
        let container = Container::new();
        container
            .register("broken", RecipeSource::Definition(Definition::default()), false, false)
            .unwrap();

        let error = container.get("broken").unwrap_err();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("no class associated"));
    }

    #[test]
    fn test_unknown_type_fails_resolution() {
        let container = Container::new();
        let error = container.get("Missing\\Type").unwrap_err();
        assert!(matches!(error, ContainerError::TypeNotFound { .. }));
        assert!(error.is_resolution());
    }

    #[test]
    fn test_make_type_mismatch() {
        let container = container();
        container.register_value("prefix", "avh_", false).unwrap();

        let error = container.make::<ConsoleLogger>("prefix").unwrap_err();
        assert!(matches!(error, ContainerError::TypeMismatch { .. }));
    }
}
