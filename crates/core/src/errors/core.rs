use crate::config::validation::ConfigError;
use thiserror::Error;

/// Error type for registration and resolution in the container
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service not found: {alias}")]
    ServiceNotFound { alias: String },

    #[error("Type not found in catalog: {type_name}")]
    TypeNotFound { type_name: String },

    #[error("Method '{method}' is not defined for type '{type_name}'")]
    MethodNotFound { type_name: String, method: String },

    #[error("Missing argument {index} for '{target}'")]
    MissingArgument { target: String, index: usize },

    #[error("Invalid argument {index} for '{target}': expected {expected}")]
    InvalidArgument {
        target: String,
        index: usize,
        expected: String,
    },

    #[error("Service '{alias}' did not resolve to {expected}")]
    TypeMismatch { alias: String, expected: String },

    #[error("Circular dependency detected: {path} (cycle at: {cycle_service})")]
    CircularDependency { path: String, cycle_service: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Service initialization failed for '{service_type}': {source}")]
    ServiceInitializationFailed {
        service_type: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ContainerError {
    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new service not found error
    pub fn service_not_found(alias: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            alias: alias.into(),
        }
    }

    /// Create a new type not found error
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        Self::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Wrap an error raised by user code while building a service
    pub fn construction<E>(service_type: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ServiceInitializationFailed {
            service_type: service_type.into(),
            source: Box::new(source),
        }
    }

    /// Create a lock error for the named resource
    pub(crate) fn lock(resource: &str) -> Self {
        Self::LockError {
            resource: resource.to_string(),
        }
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Config(_))
    }

    /// Check if the error was raised while resolving a service
    pub fn is_resolution(&self) -> bool {
        !self.is_configuration() && !matches!(self, Self::LockError { .. })
    }
}
