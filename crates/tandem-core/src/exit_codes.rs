//! Process exit codes observed by the calling shell.
//!
//! The legacy binary's own exit code is always passed through
//! verbatim; these fixed codes cover everything the wrapper decides
//! itself. Values follow BSD `sysexits` where one fits.

/// Success.
pub const OK: i32 = 0;

/// Generic failure, including extension-reported errors.
pub const ERROR: i32 = 2;

/// The invocation matched no extension, no legacy command and no
/// built-in command (EX_USAGE).
pub const UNKNOWN_COMMAND: i32 = 64;

/// Infrastructure failure: the cache could not be resolved or the
/// child process could not be started (EX_SOFTWARE).
pub const FATAL: i32 = 70;

/// The legacy child process exceeded its timeout and was killed.
pub const TIMEOUT: i32 = 124;
