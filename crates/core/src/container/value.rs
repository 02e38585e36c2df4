use crate::errors::ContainerError;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Plain data passed through the container without resolution
pub type Literal = serde_json::Value;

/// A constructed object held behind a shared, type-erased pointer
#[derive(Clone)]
pub struct Instance {
    type_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wrap a value under the given type identifier
    pub fn new<T: Send + Sync + 'static>(type_name: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            inner: Arc::new(value),
        }
    }

    /// Wrap an object produced by a type constructor
    pub fn from_boxed(type_name: impl Into<Arc<str>>, value: Box<dyn Any + Send + Sync>) -> Self {
        Self {
            type_name: type_name.into(),
            inner: Arc::from(value),
        }
    }

    /// Type identifier this instance was built from
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Check the concrete type behind the handle
    pub fn is<T: Send + Sync + 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Get a typed handle to the same object
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    /// Reference equality: both handles point at the same object
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance").field(&self.type_name).finish()
    }
}

/// Anything the container can hand out or pass as an argument
#[derive(Debug, Clone)]
pub enum Value {
    Literal(Literal),
    Object(Instance),
}

impl Value {
    /// The absent value, used for dependencies that could not be resolved
    pub fn null() -> Self {
        Value::Literal(Literal::Null)
    }

    /// Wrap an object under the given type identifier
    pub fn object<T: Send + Sync + 'static>(type_name: impl Into<Arc<str>>, value: T) -> Self {
        Value::Object(Instance::new(type_name, value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Literal(Literal::Null))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal(literal) => Some(literal),
            Value::Object(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            Value::Literal(_) => None,
        }
    }

    /// Typed handle when this value is an object of type `T`
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.as_instance().and_then(Instance::downcast::<T>)
    }

    /// Reference equality for objects; literals never compare equal here
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        Value::Literal(literal)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Literal(Literal::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Literal(Literal::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Literal(Literal::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Literal(Literal::from(value))
    }
}

/// Positional arguments handed to constructors, factories and methods
#[derive(Debug, Clone)]
pub struct Arguments {
    target: String,
    values: Vec<Value>,
}

impl Arguments {
    /// Create an argument list for the named target (used in error messages)
    pub fn new(target: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            target: target.into(),
            values,
        }
    }

    pub fn empty(target: impl Into<String>) -> Self {
        Self::new(target, Vec::new())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }

    /// Require an object of type `T` at `index`
    pub fn object<T: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>, ContainerError> {
        let value = self.require(index)?;
        value
            .downcast::<T>()
            .ok_or_else(|| self.invalid(index, std::any::type_name::<T>()))
    }

    /// Object of type `T` at `index`, `None` when absent or null
    pub fn optional_object<T: Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> Result<Option<Arc<T>>, ContainerError> {
        match self.values.get(index) {
            None => Ok(None),
            Some(value) if value.is_null() => Ok(None),
            Some(_) => self.object::<T>(index).map(Some),
        }
    }

    /// Deserialize the literal at `index` into `T`
    pub fn literal<T: DeserializeOwned>(&self, index: usize) -> Result<T, ContainerError> {
        let literal = self
            .require(index)?
            .as_literal()
            .ok_or_else(|| self.invalid(index, std::any::type_name::<T>()))?;
        serde_json::from_value(literal.clone())
            .map_err(|_| self.invalid(index, std::any::type_name::<T>()))
    }

    /// Literal at `index`, `None` when absent or null
    pub fn optional_literal<T: DeserializeOwned>(
        &self,
        index: usize,
    ) -> Result<Option<T>, ContainerError> {
        match self.values.get(index) {
            None => Ok(None),
            Some(value) if value.is_null() => Ok(None),
            Some(_) => self.literal::<T>(index).map(Some),
        }
    }

    fn require(&self, index: usize) -> Result<&Value, ContainerError> {
        self.values
            .get(index)
            .ok_or_else(|| ContainerError::MissingArgument {
                target: self.target.clone(),
                index,
            })
    }

    fn invalid(&self, index: usize, expected: &str) -> ContainerError {
        ContainerError::InvalidArgument {
            target: self.target.clone(),
            index,
            expected: expected.to_string(),
        }
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Mailer {
        from: String,
    }

    #[test]
    fn test_instance_downcast_and_identity() {
        let instance = Instance::new("Mailer", Mailer { from: "noreply@example.com".into() });
        let copy = instance.clone();

        assert!(instance.is::<Mailer>());
        assert!(!instance.is::<String>());
        assert_eq!(instance.type_name(), "Mailer");
        assert_eq!(instance.downcast::<Mailer>().unwrap().from, "noreply@example.com");
        assert!(instance.ptr_eq(&copy));

        let other = Instance::new("Mailer", Mailer { from: "noreply@example.com".into() });
        assert!(!instance.ptr_eq(&other));
    }

    #[test]
    fn test_literals_never_ptr_eq() {
        let a = Value::from("same");
        let b = Value::from("same");
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_typed_accessors() {
        let args = Arguments::new(
            "Mailer",
            vec![
                Value::object("Mailer", Mailer { from: "a@b.c".into() }),
                Value::from(json!(25)),
                Value::null(),
                Value::from("smtp.example.com"),
            ],
        );

        assert_eq!(args.len(), 4);
        assert_eq!(args.object::<Mailer>(0).unwrap().from, "a@b.c");
        assert_eq!(args.literal::<u16>(1).unwrap(), 25);
        assert!(args.optional_object::<Mailer>(2).unwrap().is_none());
        assert!(args.optional_object::<Mailer>(9).unwrap().is_none());
        assert_eq!(args.literal::<String>(3).unwrap(), "smtp.example.com");
        assert_eq!(args.optional_literal::<u16>(1).unwrap(), Some(25));
    }

    #[test]
    fn test_accessor_errors() {
        let args = Arguments::new("Session", vec![Value::from("not a number")]);

        match args.literal::<u32>(0) {
            Err(ContainerError::InvalidArgument { target, index, .. }) => {
                assert_eq!(target, "Session");
                assert_eq!(index, 0);
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }

        assert!(matches!(
            args.object::<Mailer>(1),
            Err(ContainerError::MissingArgument { index: 1, .. })
        ));
        assert!(matches!(
            args.object::<Mailer>(0),
            Err(ContainerError::InvalidArgument { .. })
        ));
    }
}
