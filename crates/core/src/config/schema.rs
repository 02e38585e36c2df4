use crate::config::validation::{ConfigError, ConfigValidator, IdentifierValidator};
use crate::container::definition::MethodArgument;
use crate::container::value::Literal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One alias in a declarative container configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntryConfig {
    /// Type to build; defaults to the alias itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub shared: bool,
    /// Auto-wire the type when no arguments are configured
    pub auto: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Literal>,
    /// Method name to its arguments, in declaration order
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub methods: serde_json::Map<String, Literal>,
}

impl EntryConfig {
    /// Method calls with their arguments
    ///
    /// A list gives positional arguments, a map gives keyed arguments and
    /// any other value is a single positional argument.
    pub fn method_calls(&self) -> Vec<(String, Vec<MethodArgument>)> {
        self.methods
            .iter()
            .map(|(method, arguments)| (method.clone(), method_arguments(arguments)))
            .collect()
    }
}

fn method_arguments(arguments: &Literal) -> Vec<MethodArgument> {
    match arguments {
        Literal::Null => Vec::new(),
        Literal::Array(items) => items.iter().cloned().map(MethodArgument::from).collect(),
        Literal::Object(map) => map
            .iter()
            .map(|(key, value)| MethodArgument::keyed(key.clone(), value.clone()))
            .collect(),
        other => vec![MethodArgument::from(other.clone())],
    }
}

/// Declarative configuration: alias to entry, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerConfig {
    entries: Vec<(String, EntryConfig)>,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, or replace an existing one in place
    pub fn with_entry(mut self, alias: impl Into<String>, entry: EntryConfig) -> Self {
        self.insert(alias.into(), entry);
        self
    }

    fn insert(&mut self, alias: String, entry: EntryConfig) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == alias) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((alias, entry)),
        }
    }

    /// Entries in the order they were declared
    pub fn entries(&self) -> impl Iterator<Item = (&String, &EntryConfig)> {
        self.entries.iter().map(|(alias, entry)| (alias, entry))
    }

    pub fn get(&self, alias: &str) -> Option<&EntryConfig> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == alias)
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject empty aliases, object names and method names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let aliases = IdentifierValidator::new("alias");
        let objects = IdentifierValidator::new("object");
        let methods = IdentifierValidator::new("method");

        for (alias, entry) in self.entries() {
            aliases.validate(alias.as_str())?;
            if let Some(object) = &entry.object {
                objects.validate(object.as_str())?;
            }
            for method in entry.methods.keys() {
                methods.validate(method.as_str()).map_err(|_| {
                    ConfigError::validation_failed(format!(
                        "entry '{}' declares a method with an empty name",
                        alias
                    ))
                })?;
            }
        }
        Ok(())
    }
}

impl Serialize for ContainerConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (alias, entry) in &self.entries {
            map.serialize_entry(alias, entry)?;
        }
        map.end()
    }
}

struct ContainerConfigVisitor;

impl<'de> Visitor<'de> for ContainerConfigVisitor {
    type Value = ContainerConfig;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of aliases to container entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut config = ContainerConfig::new();
        while let Some((alias, entry)) = access.next_entry::<String, EntryConfig>()? {
            config.insert(alias, entry);
        }
        Ok(config)
    }
}

impl<'de> Deserialize<'de> for ContainerConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ContainerConfigVisitor)
    }
}
