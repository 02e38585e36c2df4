use crate::errors::ContainerError;

/// Chain of aliases currently being resolved, for cycle detection and error reporting
#[derive(Debug, Clone, Default)]
pub struct ResolutionPath {
    aliases: Vec<String>,
}

impl ResolutionPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `alias`, failing if it is already being resolved further up the chain
    pub fn enter(&mut self, alias: &str) -> Result<(), ContainerError> {
        if self.contains(alias) {
            let mut cycle = self.aliases.clone();
            cycle.push(alias.to_string());
            return Err(ContainerError::CircularDependency {
                path: cycle.join(" -> "),
                cycle_service: alias.to_string(),
            });
        }
        self.aliases.push(alias.to_string());
        Ok(())
    }

    /// Leave the most recently entered alias
    pub fn leave(&mut self) -> Option<String> {
        self.aliases.pop()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.iter().any(|entry| entry == alias)
    }

    pub fn depth(&self) -> usize {
        self.aliases.len()
    }

    /// Get the path as a string for error messages
    pub fn path_string(&self) -> String {
        self.aliases.join(" -> ")
    }
}
