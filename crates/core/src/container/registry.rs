use crate::container::container::Container;
use crate::container::definition::{Definition, DefinitionHandle};
use crate::container::scope::ServiceScope;
use crate::container::value::{Arguments, Value};
use crate::errors::ContainerError;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Factory function invoked with call-time arguments
pub type Factory = Arc<dyn Fn(&Container, Arguments) -> Result<Value, ContainerError> + Send + Sync>;

/// How an alias produces its value
#[derive(Clone)]
pub enum Recipe {
    /// Pre-built value handed out as-is
    Literal(Value),
    /// Called directly with the arguments passed to `resolve`
    Factory(Factory),
    /// Constructor and method-call injection
    Definition(DefinitionHandle),
}

impl Recipe {
    pub fn kind(&self) -> &'static str {
        match self {
            Recipe::Literal(_) => "literal",
            Recipe::Factory(_) => "factory",
            Recipe::Definition(_) => "definition",
        }
    }
}

impl std::fmt::Debug for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipe::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Recipe::Factory(_) => f.debug_tuple("Factory").field(&"<factory>").finish(),
            Recipe::Definition(handle) => f.debug_tuple("Definition").field(handle).finish(),
        }
    }
}

/// What a caller hands to `register`
pub enum RecipeSource {
    /// The alias names its own type
    SelfAlias,
    /// A type from the catalog, wrapped in a fresh definition
    Type(String),
    Definition(Definition),
    Factory(Factory),
    Value(Value),
}

impl RecipeSource {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&Container, Arguments) -> Result<Value, ContainerError> + Send + Sync + 'static,
    {
        RecipeSource::Factory(Arc::new(factory))
    }
}

impl From<&str> for RecipeSource {
    fn from(type_name: &str) -> Self {
        RecipeSource::Type(type_name.to_string())
    }
}

impl From<String> for RecipeSource {
    fn from(type_name: String) -> Self {
        RecipeSource::Type(type_name)
    }
}

impl From<Definition> for RecipeSource {
    fn from(definition: Definition) -> Self {
        RecipeSource::Definition(definition)
    }
}

impl From<Value> for RecipeSource {
    fn from(value: Value) -> Self {
        RecipeSource::Value(value)
    }
}

impl From<Option<String>> for RecipeSource {
    fn from(type_name: Option<String>) -> Self {
        type_name.map_or(RecipeSource::SelfAlias, RecipeSource::Type)
    }
}

/// Registration record stored per alias
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    pub recipe: Recipe,
    pub scope: ServiceScope,
}

/// Alias table plus the shared-instance cache
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    entries: RwLock<HashMap<String, ServiceEntry>>,
    shared: RwLock<HashMap<String, Value>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry, returning the one it replaced
    pub fn insert(
        &self,
        alias: String,
        entry: ServiceEntry,
    ) -> Result<Option<ServiceEntry>, ContainerError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ContainerError::lock("service_registry"))?;
        Ok(entries.insert(alias, entry))
    }

    pub fn get(&self, alias: &str) -> Result<Option<ServiceEntry>, ContainerError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ContainerError::lock("service_registry"))?;
        Ok(entries.get(alias).cloned())
    }

    /// Whether `alias` is registered
    ///
    /// The introspection accessors read through a poisoned lock: the maps are
    /// only touched by single insert/remove calls, so they stay consistent.
    pub fn contains(&self, alias: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(alias)
    }

    pub fn remove(&self, alias: &str) -> Result<Option<ServiceEntry>, ContainerError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ContainerError::lock("service_registry"))?;
        Ok(entries.remove(alias))
    }

    /// Cached shared value for `alias`
    pub fn cached(&self, alias: &str) -> Result<Option<Value>, ContainerError> {
        let shared = self
            .shared
            .read()
            .map_err(|_| ContainerError::lock("shared_instances"))?;
        Ok(shared.get(alias).cloned())
    }

    /// Cache `value` unless another resolution got there first; returns the cached value
    pub fn cache(&self, alias: &str, value: Value) -> Result<Value, ContainerError> {
        let mut shared = self
            .shared
            .write()
            .map_err(|_| ContainerError::lock("shared_instances"))?;
        Ok(shared.entry(alias.to_string()).or_insert(value).clone())
    }

    /// Registered aliases, sorted
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        aliases.sort();
        aliases
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shared_count(&self) -> usize {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal_entry(value: &str, scope: ServiceScope) -> ServiceEntry {
        ServiceEntry {
            recipe: Recipe::Literal(Value::from(value)),
            scope,
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let registry = ServiceRegistry::new();
        assert!(registry.is_empty());

        let previous = registry
            .insert("prefix".into(), literal_entry("avh_", ServiceScope::Transient))
            .unwrap();
        assert!(previous.is_none());
        assert!(registry.contains("prefix"));
        assert!(!registry.contains("Prefix"));

        let entry = registry.get("prefix").unwrap().unwrap();
        assert_eq!(entry.recipe.kind(), "literal");
        assert_eq!(entry.scope, ServiceScope::Transient);

        let replaced = registry
            .insert("prefix".into(), literal_entry("wp_", ServiceScope::Singleton))
            .unwrap();
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("prefix").unwrap().is_some());
        assert!(!registry.contains("prefix"));
        assert!(registry.get("prefix").unwrap().is_none());
    }

    #[test]
    fn test_first_cached_value_wins() {
        let registry = ServiceRegistry::new();
        let first = Value::object("Session", 1u8);
        let second = Value::object("Session", 2u8);

        let cached = registry.cache("Session", first.clone()).unwrap();
        assert!(cached.ptr_eq(&first));

        let cached = registry.cache("Session", second).unwrap();
        assert!(cached.ptr_eq(&first));
        assert_eq!(registry.shared_count(), 1);
        assert!(registry.cached("Session").unwrap().unwrap().ptr_eq(&first));
    }

    #[test]
    fn test_aliases_sorted() {
        let registry = ServiceRegistry::new();
        registry
            .insert("b".into(), literal_entry("", ServiceScope::Transient))
            .unwrap();
        registry
            .insert("a".into(), literal_entry("", ServiceScope::Transient))
            .unwrap();
        assert_eq!(registry.aliases(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_introspection_survives_poisoned_lock() {
        let registry = ServiceRegistry::new();
        registry
            .insert("prefix".into(), literal_entry("avh_", ServiceScope::Transient))
            .unwrap();
        registry.cache("prefix", Value::from("avh_")).unwrap();

        let poisoned = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _entries = registry.entries.write().unwrap();
                    let _shared = registry.shared.write().unwrap();
                    panic!("poison the registry locks");
                })
                .join()
        });
        assert!(poisoned.is_err());
        assert!(registry.entries.is_poisoned());

        assert!(registry.contains("prefix"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.aliases(), vec!["prefix".to_string()]);
        assert_eq!(registry.shared_count(), 1);
        assert!(matches!(registry.get("prefix"), Err(ContainerError::LockError { .. })));
    }
}
