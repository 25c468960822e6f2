//! Invocation executor.
//!
//! Orchestrates one invocation end to end: route, then either call
//! the matched extension in-process or resolve the cached legacy
//! binary, sanitize the child environment, build the command, spawn
//! and wait with a timeout. Every outcome maps to a process exit
//! code; the legacy binary's own exit code is passed through
//! verbatim.

use crate::cache::BinaryCache;
use crate::command;
use crate::config::Configuration;
use crate::env;
use crate::error::ExecutorError;
use crate::exit_codes;
use crate::extension::ExtensionRegistry;
use crate::router::{route, CommandDescriptor, RouteDecision};
use std::path::PathBuf;
use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

/// Poll interval while waiting on the legacy child process.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Executes routed invocations.
pub struct Executor {
    config: Configuration,
    registry: ExtensionRegistry,
    cache: BinaryCache,
}

impl Executor {
    /// Creates an executor owning the invocation's configuration,
    /// the extension registry and the legacy-binary cache.
    pub fn new(config: Configuration, registry: ExtensionRegistry, cache: BinaryCache) -> Self {
        Self {
            config,
            registry,
            cache,
        }
    }

    /// The deterministic path the legacy binary is cached at.
    pub fn binary_location(&self) -> PathBuf {
        self.cache.binary_path()
    }

    /// This invocation's configuration.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Runs the invocation described by `descriptor` and returns the
    /// process exit code.
    ///
    /// Unrecognized invocations return [`exit_codes::UNKNOWN_COMMAND`]
    /// without touching the cache or spawning anything.
    pub fn execute(&self, descriptor: &CommandDescriptor) -> i32 {
        let decision = route(descriptor, &self.registry);
        self.debug(&format!("routing decision: {:?}", decision));

        match decision {
            RouteDecision::Unrecognized => {
                eprintln!(
                    "unknown command{}",
                    descriptor
                        .path
                        .as_deref()
                        .map(|p| format!(": {}", p))
                        .unwrap_or_default()
                );
                exit_codes::UNKNOWN_COMMAND
            }
            RouteDecision::Extension(extension) => {
                match extension.execute(&descriptor.command_args) {
                    Ok(code) => code,
                    Err(e) => {
                        eprintln!("{}: {}", extension.command_path(), e);
                        exit_codes::ERROR
                    }
                }
            }
            RouteDecision::Legacy => match self.run_legacy(descriptor) {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("{}", e);
                    e.exit_code()
                }
            },
        }
    }

    /// Resolves the cache, prepares environment and command, spawns
    /// the legacy binary and waits for completion or timeout.
    fn run_legacy(&self, descriptor: &CommandDescriptor) -> Result<i32, ExecutorError> {
        let binary = self.cache.resolve()?;
        self.debug(&format!("legacy binary at {}", binary.display()));

        // vars_os, not vars: inherited values are arbitrary bytes on
        // unix and must not abort the invocation.
        let inherited: Vec<String> = std::env::vars_os()
            .map(|(key, value)| {
                format!("{}={}", key.to_string_lossy(), value.to_string_lossy())
            })
            .collect();
        let (child_env, warning) = env::sanitize(
            &inherited,
            &self.config.integration_name,
            &self.config.integration_version,
            &self.config.proxy_addr,
            &self.config.ca_cert_path.to_string_lossy(),
        );
        if let Some(warning) = warning {
            self.debug(&warning.to_string());
        }

        let invocation = command::build(binary, &descriptor.raw_args, &child_env);
        self.debug(&format!("spawning {:?}", invocation.argv()));

        let child = invocation
            .to_command()
            .spawn()
            .map_err(ExecutorError::Spawn)?;

        let status = wait_with_timeout(
            child,
            Duration::from_millis(self.config.timeout_ms),
            self.config.timeout_ms,
        )?;

        // A signal death leaves no exit code to pass through.
        Ok(status.code().unwrap_or(exit_codes::FATAL))
    }

    fn debug(&self, message: &str) {
        if self.config.debug {
            eprintln!("tandem: {}", message);
        }
    }
}

/// Waits for the child, killing it unconditionally once the timeout
/// expires. The opaque legacy binary is not assumed to support any
/// graceful shutdown signal.
fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    timeout_ms: u64,
) -> Result<ExitStatus, ExecutorError> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExecutorError::Timeout { timeout_ms });
                }
                std::thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(e) => return Err(ExecutorError::Wait(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{BinaryFetcher, FetchError, ReleaseDescriptor};
    use crate::extension::test_support::FixedExtension;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct ScriptFetcher {
        script: &'static str,
        calls: Rc<Cell<u32>>,
    }

    impl BinaryFetcher for ScriptFetcher {
        fn fetch(&self) -> Result<Vec<u8>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.script.as_bytes().to_vec())
        }
    }

    fn executor_with_script(
        cache_dir: &std::path::Path,
        script: &'static str,
        registry: ExtensionRegistry,
        timeout_ms: u64,
    ) -> (Executor, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let fetcher = ScriptFetcher {
            script,
            calls: Rc::clone(&calls),
        };
        let release = ReleaseDescriptor::for_bytes("1.0.0", script.as_bytes());
        let cache = BinaryCache::new(cache_dir, release, Box::new(fetcher));
        let config = Configuration::default()
            .with_cache_dir(cache_dir)
            .with_proxy("http://127.0.0.1:1")
            .with_ca_cert("/nonexistent/ca.pem")
            .with_timeout_ms(timeout_ms);
        (Executor::new(config, registry, cache), calls)
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_command_has_no_side_effects() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let (executor, calls) =
            executor_with_script(&cache_dir, "#!/bin/sh\nexit 0\n", ExtensionRegistry::new(), 1000);

        let descriptor =
            CommandDescriptor::unrecognized("bogusCommand", &args(&["bogusCommand"]));
        let code = executor.execute(&descriptor);

        assert_eq!(code, exit_codes::UNKNOWN_COMMAND);
        assert_eq!(calls.get(), 0);
        assert!(!cache_dir.exists(), "unknown command touched the cache");
    }

    #[test]
    fn test_extension_result_maps_to_exit_code() {
        let tmp = TempDir::new().unwrap();
        let mut registry = ExtensionRegistry::new();
        registry.register(FixedExtension::ok("sbom", 0)).unwrap();
        registry.register(FixedExtension::failing("fix")).unwrap();

        let (executor, calls) =
            executor_with_script(tmp.path(), "#!/bin/sh\nexit 0\n", registry, 1000);

        let ok = CommandDescriptor::command("sbom", &[], &args(&["sbom"]));
        assert_eq!(executor.execute(&ok), exit_codes::OK);

        let failing = CommandDescriptor::command("fix", &[], &args(&["fix"]));
        assert_eq!(executor.execute(&failing), exit_codes::ERROR);

        // Extension dispatch never touches the legacy cache.
        assert_eq!(calls.get(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_legacy_exit_code_passes_through() {
        let tmp = TempDir::new().unwrap();
        let (executor, calls) =
            executor_with_script(tmp.path(), "#!/bin/sh\nexit 7\n", ExtensionRegistry::new(), 5000);

        let descriptor = CommandDescriptor::command("test", &[], &args(&["test"]));
        assert_eq!(executor.execute(&descriptor), 7);
        assert_eq!(calls.get(), 1);
        assert!(executor.binary_location().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_legacy_binary_reused_across_invocations() {
        let tmp = TempDir::new().unwrap();
        let (executor, calls) =
            executor_with_script(tmp.path(), "#!/bin/sh\nexit 0\n", ExtensionRegistry::new(), 5000);

        let descriptor = CommandDescriptor::legacy_root(&args(&["--help"]));
        assert_eq!(executor.execute(&descriptor), 0);
        assert_eq!(executor.execute(&descriptor), 0);
        assert_eq!(calls.get(), 1, "current cache was refetched");
    }

    #[cfg(unix)]
    #[test]
    fn test_legacy_run_tolerates_non_unicode_environment() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        // Inherited values are arbitrary bytes on unix.
        std::env::set_var("TANDEM_NON_UNICODE_VALUE", OsStr::from_bytes(&[0xff, 0xfe]));

        let tmp = TempDir::new().unwrap();
        let (executor, _calls) =
            executor_with_script(tmp.path(), "#!/bin/sh\nexit 0\n", ExtensionRegistry::new(), 5000);

        let descriptor = CommandDescriptor::command("test", &[], &args(&["test"]));
        let code = executor.execute(&descriptor);

        std::env::remove_var("TANDEM_NON_UNICODE_VALUE");
        assert_eq!(code, exit_codes::OK);
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_legacy_child() {
        let tmp = TempDir::new().unwrap();
        let (executor, _calls) = executor_with_script(
            tmp.path(),
            "#!/bin/sh\nsleep 30\n",
            ExtensionRegistry::new(),
            100,
        );

        let descriptor = CommandDescriptor::command("test", &[], &args(&["test"]));
        let start = Instant::now();
        let code = executor.execute(&descriptor);

        assert_eq!(code, exit_codes::TIMEOUT);
        assert!(
            start.elapsed() < Duration::from_secs(10),
            "child was not killed promptly"
        );
    }
}
