use crate::container::descriptor::TypeBinding;
use crate::container::value::Arguments;
use crate::errors::ContainerError;

/// Trait for types the container can build on demand
///
/// `dependencies` replaces constructor introspection: it lists, in
/// constructor order, the identifiers auto-wiring resolves and hands to
/// `create` as positional arguments. A dependency that is neither a
/// registered alias nor a known type arrives as a null argument.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Type identifier used by aliases and definition arguments
    fn name() -> &'static str;

    /// Constructor dependencies, in order
    fn dependencies() -> Vec<String> {
        Vec::new()
    }

    /// Create an instance from resolved or explicit constructor arguments
    fn create(args: &Arguments) -> Result<Self, ContainerError>;

    /// Add methods that definitions may call after construction
    fn configure(binding: TypeBinding<Self>) -> TypeBinding<Self> {
        binding
    }
}

impl<T: Injectable> TypeBinding<T> {
    /// Build the binding described by an `Injectable` implementation
    pub fn injectable() -> Self {
        let binding = TypeBinding::new(T::name(), T::create).depends_on_all(T::dependencies());
        T::configure(binding)
    }
}
