//! Built function image metadata.

use std::fmt;

use serde::Serialize;

use super::Runtime;

/// Fully qualified image reference (`<registry>/<repository>:<tag>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    registry: String,
    repository: String,
    tag: String,
}

impl ImageRef {
    /// Reference for the current (`latest`) image of a function.
    pub fn latest(registry: &str, function_name: &str) -> Self {
        Self {
            registry: registry.to_string(),
            repository: function_name.to_string(),
            tag: "latest".to_string(),
        }
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The same repository and tag pushed through a different registry
    /// endpoint (internal network name vs. advertised name).
    pub fn with_registry(&self, registry: &str) -> Self {
        Self {
            registry: registry.to_string(),
            repository: self.repository.clone(),
            tag: self.tag.clone(),
        }
    }

    /// Full reference string passed to the container engine.
    pub fn reference(&self) -> String {
        format!("{}/{}:{}", self.registry, self.repository, self.tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.registry, self.repository, self.tag)
    }
}

/// Result of a successful function build, returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionImage {
    /// Function name as supplied by the caller.
    pub name: String,
    /// Advertised image reference.
    pub image: String,
    /// Runtime the function was built for.
    pub runtime: Runtime,
}
