//! Extension capability trait and registry.
//!
//! Extensions are opaque command handlers executed in-process. The
//! core never inspects their internals; dispatch is a lookup from
//! command path to the single `execute` capability, which keeps the
//! router open to new extensions without modification.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A self-contained command handler registered with the tool.
pub trait Extension {
    /// The command path this extension claims, e.g. `"sbom"`.
    fn command_path(&self) -> &str;

    /// One-line description shown in command listings.
    fn summary(&self) -> &str;

    /// Runs the extension with the invocation's trailing arguments.
    ///
    /// The returned code becomes the process exit code; any error is
    /// treated as failure.
    fn execute(&self, args: &[String]) -> anyhow::Result<i32>;
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Another extension already claims this command path.
    #[error("extension already registered for command '{0}'")]
    AlreadyRegistered(String),
}

/// Registry of extensions, keyed by command path.
#[derive(Default, Clone)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension under its command path.
    pub fn register(&mut self, extension: Arc<dyn Extension>) -> Result<(), RegistryError> {
        let path = extension.command_path().to_string();
        if self.extensions.contains_key(&path) {
            return Err(RegistryError::AlreadyRegistered(path));
        }
        self.extensions.insert(path, extension);
        Ok(())
    }

    /// Gets the extension claiming a command path, if any.
    pub fn find(&self, command_path: &str) -> Option<Arc<dyn Extension>> {
        self.extensions.get(command_path).cloned()
    }

    /// Returns true if an extension claims the command path.
    pub fn contains(&self, command_path: &str) -> bool {
        self.extensions.contains_key(command_path)
    }

    /// Lists all registered extensions.
    pub fn list(&self) -> impl Iterator<Item = &Arc<dyn Extension>> {
        self.extensions.values()
    }

    /// Returns the number of registered extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Returns true if no extensions are registered.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<&str> = self.extensions.keys().map(String::as_str).collect();
        paths.sort_unstable();
        f.debug_struct("ExtensionRegistry")
            .field("commands", &paths)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Extension stub returning a fixed result.
    pub struct FixedExtension {
        pub path: String,
        pub code: i32,
        pub fail: bool,
    }

    impl FixedExtension {
        pub fn ok(path: &str, code: i32) -> Arc<dyn Extension> {
            Arc::new(Self {
                path: path.to_string(),
                code,
                fail: false,
            })
        }

        pub fn failing(path: &str) -> Arc<dyn Extension> {
            Arc::new(Self {
                path: path.to_string(),
                code: 0,
                fail: true,
            })
        }
    }

    impl Extension for FixedExtension {
        fn command_path(&self) -> &str {
            &self.path
        }

        fn summary(&self) -> &str {
            "test extension"
        }

        fn execute(&self, _args: &[String]) -> anyhow::Result<i32> {
            if self.fail {
                anyhow::bail!("extension failed")
            }
            Ok(self.code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FixedExtension;
    use super::*;

    #[test]
    fn test_registry_register_and_find() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.is_empty());

        registry.register(FixedExtension::ok("sbom", 0)).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("sbom"));
        assert!(registry.find("sbom").is_some());
        assert!(registry.find("other").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicate_command_path() {
        let mut registry = ExtensionRegistry::new();
        registry.register(FixedExtension::ok("sbom", 0)).unwrap();

        let err = registry.register(FixedExtension::ok("sbom", 1)).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered("sbom".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_list() {
        let mut registry = ExtensionRegistry::new();
        registry.register(FixedExtension::ok("sbom", 0)).unwrap();
        registry.register(FixedExtension::ok("fix", 0)).unwrap();

        let mut paths: Vec<&str> = registry.list().map(|e| e.command_path()).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["fix", "sbom"]);
    }
}
