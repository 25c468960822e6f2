//! Built-in commands served by this tool itself.

pub mod version;

use std::sync::Arc;
use tandem_core::{ExtensionRegistry, RegistryError};

/// Registers every built-in command.
pub fn register_builtins(registry: &mut ExtensionRegistry) -> Result<(), RegistryError> {
    registry.register(Arc::new(version::VersionCommand))
}
