//! tandem - hybrid command-line interface.
//!
//! Serves each invocation with either a natively-registered extension
//! or the cached legacy binary, and reports the outcome as the
//! process exit code.

use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use tandem_cli::{commands, fetch, parser};
use tandem_core::{exit_codes, BinaryCache, Configuration, Executor, ExtensionRegistry};

fn main() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    match run(&raw_args) {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red(), e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Builds the invocation configuration from the process environment.
fn configuration_from_env() -> Configuration {
    let mut config = Configuration::default();
    if let Ok(dir) = std::env::var("TANDEM_CACHE_DIR") {
        config = config.with_cache_dir(dir);
    }
    if let Ok(proxy) = std::env::var("TANDEM_PROXY_ADDR") {
        config = config.with_proxy(proxy);
    }
    if let Ok(ca) = std::env::var("TANDEM_CA_CERTS") {
        config = config.with_ca_cert(ca);
    }
    if let Ok(timeout) = std::env::var("TANDEM_TIMEOUT_MS") {
        if let Ok(timeout_ms) = timeout.parse::<u64>() {
            config = config.with_timeout_ms(timeout_ms);
        }
    }
    config.with_debug(std::env::var_os("TANDEM_DEBUG").is_some())
}

fn run(raw_args: &[String]) -> anyhow::Result<i32> {
    let config = configuration_from_env();

    let mut registry = ExtensionRegistry::new();
    commands::register_builtins(&mut registry)?;

    let descriptor = parser::describe(parser::make_arg_parser(&registry), &registry, raw_args);

    let mirror = std::env::var_os("TANDEM_LEGACY_MIRROR").map(PathBuf::from);
    let release = fetch::load_release_descriptor(mirror.as_deref())?;
    let cache = BinaryCache::new(
        config.cache_dir.clone(),
        release,
        Box::new(fetch::MirrorFetcher::new(mirror)),
    );

    let executor = Executor::new(config, registry, cache);
    Ok(executor.execute(&descriptor))
}
