//! Argument-parser collaborator.
//!
//! Builds a clap command tree from the extension registry and the
//! known legacy command words, and reduces one raw argument vector to
//! the [`CommandDescriptor`] the router consumes. The tree exists to
//! decide routing; general-purpose flag parsing stays with whichever
//! implementation ends up serving the invocation, so built-in help
//! and version flags are disabled and unknown words surface as
//! routing data rather than parse errors.

use clap::{Arg, ArgAction, Command};
use tandem_core::router::{CommandDescriptor, V2_ONLY_COMMANDS};
use tandem_core::ExtensionRegistry;

/// Command words served by the legacy binary.
///
/// Anything else that is not an extension or a v2-only command is
/// unrecognized.
pub const KNOWN_LEGACY_COMMANDS: &[&str] = &[
    "auth", "test", "monitor", "config", "policy", "ignore", "protect", "wizard", "help",
];

/// Builds the clap command tree for one invocation.
pub fn make_arg_parser(registry: &ExtensionRegistry) -> Command {
    let mut parser = Command::new("tandem")
        .about("Hybrid CLI routing between native extensions and the legacy binary")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .disable_help_subcommand(true)
        .allow_external_subcommands(true)
        .arg(
            Arg::new("version")
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print the tandem version"),
        );

    for extension in registry.list() {
        parser = parser.subcommand(command_stub(
            extension.command_path(),
            extension.summary(),
        ));
    }
    for name in KNOWN_LEGACY_COMMANDS {
        if !registry.contains(name) {
            parser = parser.subcommand(command_stub(name, "Served by the legacy binary"));
        }
    }

    parser
}

/// A subcommand that swallows its trailing arguments unparsed; the
/// handler that serves it owns their meaning.
fn command_stub(name: &str, about: &str) -> Command {
    Command::new(name.to_string())
        .about(about.to_string())
        .disable_help_flag(true)
        .arg(
            Arg::new("args")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
}

/// Reduces a raw argument vector to its routing descriptor.
pub fn describe(
    parser: Command,
    registry: &ExtensionRegistry,
    raw_args: &[String],
) -> CommandDescriptor {
    let mut argv = Vec::with_capacity(raw_args.len() + 1);
    argv.push("tandem".to_string());
    argv.extend(raw_args.iter().cloned());

    let matches = match parser.try_get_matches_from(&argv) {
        Ok(matches) => matches,
        // Unknown root flags (including a bare --help) belong to the
        // legacy binary, which parses its own surface.
        Err(_) => return CommandDescriptor::legacy_root(raw_args),
    };

    match matches.subcommand() {
        Some((name, sub)) => {
            let known = registry.contains(name)
                || KNOWN_LEGACY_COMMANDS.contains(&name)
                || V2_ONLY_COMMANDS.contains(&name);
            if !known {
                return CommandDescriptor::unrecognized(name, raw_args);
            }

            let command_args: Vec<String> = sub
                .get_many::<String>("args")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            CommandDescriptor::command(name, &command_args, raw_args)
        }
        None if matches.get_flag("version") => {
            CommandDescriptor::command("version", &[], raw_args)
        }
        None => CommandDescriptor::legacy_root(raw_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tandem_core::Extension;

    struct NoopExtension;

    impl Extension for NoopExtension {
        fn command_path(&self) -> &str {
            "sbom"
        }

        fn summary(&self) -> &str {
            "Generate an SBOM"
        }

        fn execute(&self, _args: &[String]) -> anyhow::Result<i32> {
            Ok(0)
        }
    }

    fn registry_with_sbom() -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::new();
        registry.register(Arc::new(NoopExtension)).unwrap();
        registry
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn describe_args(registry: &ExtensionRegistry, items: &[&str]) -> CommandDescriptor {
        describe(make_arg_parser(registry), registry, &args(items))
    }

    #[test]
    fn test_describe_extension_command_with_trailing_args() {
        let registry = registry_with_sbom();
        let descriptor = describe_args(&registry, &["sbom", "--format", "cyclonedx"]);

        assert_eq!(descriptor.path.as_deref(), Some("sbom"));
        assert!(descriptor.recognized);
        assert_eq!(descriptor.command_args, args(&["--format", "cyclonedx"]));
        assert_eq!(descriptor.raw_args, args(&["sbom", "--format", "cyclonedx"]));
    }

    #[test]
    fn test_describe_legacy_command() {
        let registry = ExtensionRegistry::new();
        let descriptor = describe_args(&registry, &["test", "--json"]);

        assert_eq!(descriptor.path.as_deref(), Some("test"));
        assert!(descriptor.recognized);
        assert_eq!(descriptor.raw_args, args(&["test", "--json"]));
    }

    #[test]
    fn test_describe_unknown_command_word() {
        let registry = ExtensionRegistry::new();
        let descriptor = describe_args(&registry, &["bogusCommand"]);

        assert_eq!(descriptor.path.as_deref(), Some("bogusCommand"));
        assert!(!descriptor.recognized);
    }

    #[test]
    fn test_describe_bare_version_flag() {
        let registry = ExtensionRegistry::new();
        let descriptor = describe_args(&registry, &["--version"]);

        assert_eq!(descriptor.path.as_deref(), Some("version"));
        assert!(descriptor.recognized);
        assert!(descriptor.is_v2_only());
    }

    #[test]
    fn test_describe_flags_only_invocation_is_legacy_root() {
        let registry = ExtensionRegistry::new();
        let descriptor = describe_args(&registry, &["--help"]);

        assert_eq!(descriptor.path, None);
        assert!(descriptor.recognized);
        assert_eq!(descriptor.raw_args, args(&["--help"]));
    }

    #[test]
    fn test_describe_empty_invocation_is_legacy_root() {
        let registry = ExtensionRegistry::new();
        let descriptor = describe_args(&registry, &[]);

        assert_eq!(descriptor.path, None);
        assert!(descriptor.recognized);
        assert!(descriptor.raw_args.is_empty());
    }

    #[test]
    fn test_registered_extension_shadows_legacy_word() {
        // An extension may take over a word the legacy binary also
        // serves; the subcommand must not be registered twice.
        struct TestExtension;
        impl Extension for TestExtension {
            fn command_path(&self) -> &str {
                "test"
            }
            fn summary(&self) -> &str {
                "Native test command"
            }
            fn execute(&self, _args: &[String]) -> anyhow::Result<i32> {
                Ok(0)
            }
        }

        let mut registry = ExtensionRegistry::new();
        registry.register(Arc::new(TestExtension)).unwrap();

        let descriptor = describe_args(&registry, &["test"]);
        assert_eq!(descriptor.path.as_deref(), Some("test"));
        assert!(descriptor.recognized);
    }
}
