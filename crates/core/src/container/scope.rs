/// Lifetime of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceScope {
    /// Resolved once, then served from the shared cache
    Singleton,
    /// Built anew on every resolution
    #[default]
    Transient,
}

impl ServiceScope {
    /// Map the `shared` flag used by registrations and configuration
    pub fn from_shared(shared: bool) -> Self {
        if shared {
            ServiceScope::Singleton
        } else {
            ServiceScope::Transient
        }
    }

    /// Check if the scope is singleton
    pub fn is_singleton(&self) -> bool {
        matches!(self, ServiceScope::Singleton)
    }

    /// Get the scope name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceScope::Singleton => "singleton",
            ServiceScope::Transient => "transient",
        }
    }
}

impl std::fmt::Display for ServiceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
