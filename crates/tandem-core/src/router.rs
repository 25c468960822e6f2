//! Routing: extension, legacy fall-through, or unrecognized.

use crate::extension::{Extension, ExtensionRegistry};
use std::sync::Arc;

/// Commands served by this tool itself, regardless of extension
/// registration. They never fall through to the legacy binary.
pub const V2_ONLY_COMMANDS: &[&str] = &["version"];

/// The resolved shape of one invocation, built once per invocation by
/// the argument-parser collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// The command word, or `None` for flags-only invocations
    /// (e.g. a bare `--help`), which the legacy binary serves.
    pub path: Option<String>,
    /// Arguments trailing the command word, for extension dispatch.
    pub command_args: Vec<String>,
    /// The complete original argument vector, forwarded verbatim on
    /// legacy fall-through.
    pub raw_args: Vec<String>,
    /// Whether the command tree recognizes this invocation at all.
    pub recognized: bool,
}

impl CommandDescriptor {
    /// Descriptor for a flags-only invocation served by the legacy
    /// binary's root command.
    pub fn legacy_root(raw_args: &[String]) -> Self {
        Self {
            path: None,
            command_args: Vec::new(),
            raw_args: raw_args.to_vec(),
            recognized: true,
        }
    }

    /// Descriptor for a recognized command word.
    pub fn command(path: &str, command_args: &[String], raw_args: &[String]) -> Self {
        Self {
            path: Some(path.to_string()),
            command_args: command_args.to_vec(),
            raw_args: raw_args.to_vec(),
            recognized: true,
        }
    }

    /// Descriptor for an invocation no handler claims.
    pub fn unrecognized(path: &str, raw_args: &[String]) -> Self {
        Self {
            path: Some(path.to_string()),
            command_args: Vec::new(),
            raw_args: raw_args.to_vec(),
            recognized: false,
        }
    }

    /// Returns true if the command word is reserved for this tool.
    pub fn is_v2_only(&self) -> bool {
        self.path
            .as_deref()
            .is_some_and(|p| V2_ONLY_COMMANDS.contains(&p))
    }
}

/// Where an invocation is served.
pub enum RouteDecision {
    /// A registered extension claims the command path.
    Extension(Arc<dyn Extension>),
    /// Fall through to the cached legacy binary, arguments verbatim.
    Legacy,
    /// No handler claims the invocation.
    Unrecognized,
}

impl std::fmt::Debug for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extension(ext) => write!(f, "Extension({})", ext.command_path()),
            Self::Legacy => write!(f, "Legacy"),
            Self::Unrecognized => write!(f, "Unrecognized"),
        }
    }
}

/// Decides how the invocation described by `descriptor` is served.
///
/// Priority order: unrecognized invocations are rejected before any
/// lookup; an exact extension match wins over the legacy binary;
/// v2-only command words never fall through to the legacy binary even
/// when no extension claims them.
pub fn route(descriptor: &CommandDescriptor, registry: &ExtensionRegistry) -> RouteDecision {
    if !descriptor.recognized {
        return RouteDecision::Unrecognized;
    }

    if let Some(path) = descriptor.path.as_deref() {
        if let Some(extension) = registry.find(path) {
            return RouteDecision::Extension(extension);
        }
        if descriptor.is_v2_only() {
            return RouteDecision::Unrecognized;
        }
    }

    RouteDecision::Legacy
}
