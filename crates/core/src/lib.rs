pub mod errors;
pub mod container;
pub mod config;

// Re-export key types for convenience
pub use errors::ContainerError;
pub use container::{
    Argument, Arguments, Container, Definition, DefinitionHandle, Injectable, Instance,
    MethodArgument, RecipeSource, ServiceScope, TypeBinding, Value,
};
pub use config::{ConfigError, ConfigFormat, ContainerConfig, EntryConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
