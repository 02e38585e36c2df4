use crate::container::descriptor::TypeDescriptor;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of constructible types, keyed by type identifier
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, returning the one it replaced
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Option<Arc<TypeDescriptor>> {
        self.types
            .insert(descriptor.name().to_string(), Arc::new(descriptor))
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type identifiers, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::descriptor::TypeBinding;

    #[derive(Default)]
    struct Visitor;

    #[derive(Default)]
    struct Session;

    #[test]
    fn test_catalog_operations() {
        let mut catalog = TypeCatalog::new();
        assert!(catalog.is_empty());

        assert!(catalog
            .insert(TypeBinding::<Visitor>::with_default("Visitor").into_descriptor())
            .is_none());
        catalog.insert(TypeBinding::<Session>::with_default("Session").into_descriptor());

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("Visitor"));
        assert!(!catalog.contains("visitor"));
        assert_eq!(catalog.type_names(), vec!["Session".to_string(), "Visitor".to_string()]);
        assert_eq!(catalog.get("Session").unwrap().name(), "Session");
    }

    #[test]
    fn test_insert_replaces() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(TypeBinding::<Visitor>::with_default("Visitor").into_descriptor());
        let previous = catalog.insert(
            TypeBinding::<Visitor>::with_default("Visitor")
                .depends_on("Session")
                .into_descriptor(),
        );

        assert!(previous.unwrap().dependencies().is_empty());
        assert_eq!(catalog.get("Visitor").unwrap().dependencies().len(), 1);
    }
}
