//! Child-process invocation builder.
//!
//! Pure construction of an executable invocation ready for spawning.
//! Nothing here touches the filesystem or validates that the program
//! exists; the executor decides when and whether to spawn.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A fully-specified child-process invocation.
///
/// The environment is exactly the provided list; no variables are
/// inherited from the parent process when the invocation is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildInvocation {
    /// Path to the executable.
    pub program: PathBuf,
    /// Arguments, not including the program itself.
    pub args: Vec<String>,
    /// Environment as `KEY=VALUE` assignments.
    pub env: Vec<String>,
}

/// Builds a [`ChildInvocation`] from its parts.
pub fn build(
    program: impl Into<PathBuf>,
    args: &[String],
    env: &[String],
) -> ChildInvocation {
    ChildInvocation {
        program: program.into(),
        args: args.to_vec(),
        env: env.to_vec(),
    }
}

impl ChildInvocation {
    /// The argument vector as the child observes it: program first.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone().into_os_string());
        argv.extend(self.args.iter().map(OsString::from));
        argv
    }

    /// Converts to a [`Command`] with a cleared environment and
    /// inherited stdio, ready for `spawn`.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.env_clear();
        for entry in &self.env {
            let (key, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_argument_vector() {
        let args = vec!["hello".to_string(), "world".to_string()];
        let env = vec!["something=1".to_string(), "else=2".to_string()];

        let invocation = build("someExecutable", &args, &env);

        assert_eq!(invocation.env, env);
        let argv = invocation.argv();
        assert_eq!(argv[0], OsString::from("someExecutable"));
        assert_eq!(&argv[1..], &[OsString::from("hello"), OsString::from("world")][..]);
    }

    #[test]
    fn test_build_is_pure_construction() {
        // A nonexistent program is fine at build time.
        let invocation = build("/definitely/not/a/real/path", &[], &[]);
        assert_eq!(invocation.args.len(), 0);
        assert_eq!(invocation.argv().len(), 1);
    }

    #[test]
    fn test_to_command_splits_env_on_first_equals() {
        let env = vec!["here=3=2".to_string()];
        let invocation = build("exe", &[], &env);
        let cmd = invocation.to_command();

        let vars: Vec<_> = cmd.get_envs().collect();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].0, OsString::from("here").as_os_str());
        assert_eq!(vars[0].1, Some(OsString::from("3=2").as_os_str()));
    }
}
