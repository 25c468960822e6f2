//! Invocation configuration.

use std::path::PathBuf;

/// Default timeout for legacy-binary execution (15 minutes).
pub const DEFAULT_TIMEOUT_MS: u64 = 15 * 60 * 1000;

/// Configuration for a single CLI invocation.
///
/// Built once at startup and immutable for the lifetime of the
/// invocation; the [`crate::Executor`] owns it.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Directory where the legacy binary is materialized and reused.
    pub cache_dir: PathBuf,
    /// Proxy address the tool has negotiated for the child process.
    pub proxy_addr: String,
    /// CA certificate bundle the child process must trust.
    pub ca_cert_path: PathBuf,
    /// Integration identity injected into the child environment.
    pub integration_name: String,
    /// Integration version injected into the child environment.
    pub integration_version: String,
    /// Timeout for legacy-binary execution, in milliseconds.
    pub timeout_ms: u64,
    /// Whether to emit debug lines on stderr.
    pub debug: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            cache_dir: Self::default_cache_dir(),
            proxy_addr: String::new(),
            ca_cert_path: PathBuf::new(),
            integration_name: String::from("CLI_V2"),
            integration_version: String::from(env!("CARGO_PKG_VERSION")),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
        }
    }
}

impl Configuration {
    /// Returns the platform cache directory for tandem, falling back
    /// to a relative `.tandem` directory when the platform offers none.
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|d| d.join("tandem"))
            .unwrap_or_else(|| PathBuf::from(".tandem"))
    }

    /// Sets the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Sets the proxy address handed to the child process.
    pub fn with_proxy(mut self, addr: impl Into<String>) -> Self {
        self.proxy_addr = addr.into();
        self
    }

    /// Sets the CA certificate bundle path handed to the child process.
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = path.into();
        self
    }

    /// Sets the integration identity.
    pub fn with_integration(
        mut self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.integration_name = name.into();
        self.integration_version = version.into();
        self
    }

    /// Sets the legacy-binary execution timeout in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Enables or disables debug output.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
