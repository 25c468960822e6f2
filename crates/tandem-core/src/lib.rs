//! Routing and execution core for the tandem CLI.
//!
//! The tandem CLI serves every invocation with one of two coexisting
//! implementations: natively-registered in-process extensions, or the
//! legacy monolithic binary, which is fetched once, cached on disk and
//! re-invoked as a child process. This crate is the layer that decides
//! which of the two serves a given invocation and carries it out:
//!
//! 1. **Routing** ([`router`]): match the parsed command against the
//!    extension registry, fall through to the legacy binary, or reject
//!    the invocation as unrecognized.
//! 2. **Cache lifecycle** ([`cache`]): keep exactly one usable copy of
//!    the legacy binary at a deterministic path, refreshed atomically
//!    when it goes stale and left untouched otherwise.
//! 3. **Child environment** ([`env`]): build a fully-specified
//!    environment for the child process; nothing is inherited
//!    implicitly.
//! 4. **Outcome mapping** ([`executor`], [`exit_codes`]): translate
//!    every execution outcome into a process exit code.

pub mod cache;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod executor;
pub mod exit_codes;
pub mod extension;
pub mod router;

pub use cache::{BinaryCache, BinaryFetcher, CacheError, FetchError, ReleaseDescriptor};
pub use config::Configuration;
pub use env::{sanitize, EnvironmentWarning};
pub use error::ExecutorError;
pub use executor::Executor;
pub use extension::{Extension, ExtensionRegistry, RegistryError};
pub use router::{route, CommandDescriptor, RouteDecision};
