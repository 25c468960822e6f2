//! tandem CLI library.
//!
//! This crate wires the routing/execution core to the outside world:
//! the clap-based argument-parser collaborator, the built-in v2-only
//! commands, and the binary-fetch collaborator.

pub mod commands;
pub mod fetch;
pub mod parser;
