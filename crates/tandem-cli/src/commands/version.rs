//! The `version` command.
//!
//! Reports this tool's own version. Defined v2-only: it never falls
//! through to the legacy binary, even on a cold cache.

use tandem_core::{exit_codes, Extension};

pub struct VersionCommand;

impl Extension for VersionCommand {
    fn command_path(&self) -> &str {
        "version"
    }

    fn summary(&self) -> &str {
        "Print the tandem version"
    }

    fn execute(&self, _args: &[String]) -> anyhow::Result<i32> {
        println!("{}", env!("CARGO_PKG_VERSION"));
        Ok(exit_codes::OK)
    }
}
