#[allow(clippy::module_inception)]
pub mod container;
pub mod autowiring;
pub mod catalog;
pub mod definition;
pub mod descriptor;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod value;

pub use container::Container;
pub use autowiring::Injectable;
pub use catalog::TypeCatalog;
pub use definition::{Argument, Definition, DefinitionHandle, MethodArgument, MethodCall};
pub use descriptor::{TypeBinding, TypeDescriptor};
pub use registry::{Factory, Recipe, RecipeSource, ServiceEntry, ServiceRegistry};
pub use resolver::ResolutionPath;
pub use scope::ServiceScope;
pub use value::{Arguments, Instance, Literal, Value};
