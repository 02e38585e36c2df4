use crate::container::value::Arguments;
use crate::errors::ContainerError;
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Builds a fresh object from positional arguments
pub type Constructor =
    Arc<dyn Fn(&Arguments) -> Result<Box<dyn Any + Send + Sync>, ContainerError> + Send + Sync>;

/// Invokes a named method on an object that has not been shared yet
pub type MethodInvoker = Arc<
    dyn Fn(&mut (dyn Any + Send + Sync), &Arguments) -> Result<(), ContainerError> + Send + Sync,
>;

/// Everything the container knows about a constructible type
pub struct TypeDescriptor {
    name: String,
    dependencies: Vec<String>,
    constructor: Constructor,
    methods: HashMap<String, MethodInvoker>,
}

impl TypeDescriptor {
    /// Type identifier, the string aliases and arguments refer to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dependency identifiers consumed by auto-wiring, in constructor order
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Run the constructor
    pub fn construct(&self, args: &Arguments) -> Result<Box<dyn Any + Send + Sync>, ContainerError> {
        (self.constructor)(args)
    }

    /// Call `method` on an object built by this descriptor
    pub fn invoke_method(
        &self,
        object: &mut (dyn Any + Send + Sync),
        method: &str,
        args: &Arguments,
    ) -> Result<(), ContainerError> {
        let invoker = self
            .methods
            .get(method)
            .ok_or_else(|| ContainerError::MethodNotFound {
                type_name: self.name.clone(),
                method: method.to_string(),
            })?;
        invoker(object, args)
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("methods", &methods)
            .finish()
    }
}

/// Fluent builder turning a typed constructor and methods into a descriptor
pub struct TypeBinding<T> {
    name: String,
    dependencies: Vec<String>,
    constructor: Constructor,
    methods: HashMap<String, MethodInvoker>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> TypeBinding<T> {
    /// Bind `name` to a constructor producing `T`
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Arguments) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        let constructor: Constructor = Arc::new(move |args: &Arguments| {
            let instance = constructor(args)?;
            Ok(Box::new(instance) as Box<dyn Any + Send + Sync>)
        });

        Self {
            name: name.into(),
            dependencies: Vec::new(),
            constructor,
            methods: HashMap::new(),
            _phantom: PhantomData,
        }
    }

    /// Bind a type whose constructor takes no arguments
    pub fn with_default(name: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self::new(name, |_| Ok(T::default()))
    }

    /// Declare the next constructor dependency for auto-wiring
    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// Declare several constructor dependencies at once
    pub fn depends_on_all<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Expose a method that definitions may call after construction
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut T, &Arguments) -> Result<(), ContainerError> + Send + Sync + 'static,
    {
        let type_name = self.name.clone();
        let invoker: MethodInvoker = Arc::new(
            move |object: &mut (dyn Any + Send + Sync), args: &Arguments| {
                let target = object.downcast_mut::<T>().ok_or_else(|| {
                    ContainerError::InvalidArgument {
                        target: type_name.clone(),
                        index: 0,
                        expected: std::any::type_name::<T>().to_string(),
                    }
                })?;
                method(target, args)
            },
        );
        self.methods.insert(name.into(), invoker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the type-erased descriptor
    pub fn into_descriptor(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            dependencies: self.dependencies,
            constructor: self.constructor,
            methods: self.methods,
        }
    }
}
