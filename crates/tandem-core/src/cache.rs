//! Legacy-binary cache manager.
//!
//! Guarantees that a usable copy of the legacy binary exists at a
//! deterministic path under the cache directory before it is invoked,
//! while keeping repeated invocations cheap: a cache that already
//! matches the expected release is returned without a single write,
//! so its modification timestamp is the externally observable signal
//! of whether a refresh happened.
//!
//! The cache directory is shared between concurrently running
//! instances of the tool. Replacement is write-to-temp-then-rename so
//! no instance can ever exec a half-written binary; redundant
//! concurrent downloads are an accepted idempotent race (last writer
//! wins, both writers produce a valid binary).

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the cached legacy binary inside the cache directory.
#[cfg(not(windows))]
pub const BINARY_FILE_NAME: &str = "tandem-legacy";
#[cfg(windows)]
pub const BINARY_FILE_NAME: &str = "tandem-legacy.exe";

/// The release the cache is expected to hold.
///
/// Supplied externally (release channel metadata); the cache never
/// decides for itself what "current" means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Human-readable version of the legacy binary.
    pub version: String,
    /// Blake3 hex digest of the legacy binary's bytes.
    pub checksum: String,
}

impl ReleaseDescriptor {
    /// Builds a descriptor for the given binary bytes.
    pub fn for_bytes(version: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            version: version.into(),
            checksum: blake3::hash(bytes).to_hex().to_string(),
        }
    }

    /// Returns true if `bytes` are the release this descriptor names.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        blake3::hash(bytes).to_hex().to_string() == self.checksum
    }
}

/// Error from the binary-fetch collaborator.
#[derive(Debug, Error)]
#[error("failed to fetch legacy binary: {message}")]
pub struct FetchError {
    /// Description of what went wrong.
    pub message: String,
    #[source]
    source: Option<io::Error>,
}

impl FetchError {
    /// Creates a fetch error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a fetch error wrapping an I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            message: message.into(),
            source: Some(source),
        }
    }
}

/// External collaborator that provides the legacy binary's bytes for
/// the current platform. Transport (network, mirror, archive) is the
/// collaborator's concern.
pub trait BinaryFetcher {
    fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}

/// Errors that can occur while resolving the cached binary.
///
/// All of these are fatal for the invocation.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The fetch collaborator failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The fetched bytes do not match the release descriptor.
    #[error("fetched legacy binary does not match release {version}: expected checksum {expected}, got {actual}")]
    ChecksumMismatch {
        version: String,
        expected: String,
        actual: String,
    },

    /// Filesystem failure creating or writing inside the cache directory.
    #[error("cache directory I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Owns the on-disk location of the legacy binary.
pub struct BinaryCache {
    cache_dir: PathBuf,
    release: ReleaseDescriptor,
    fetcher: Box<dyn BinaryFetcher>,
}

impl BinaryCache {
    /// Creates a cache manager rooted at `cache_dir`, expecting
    /// `release` and fetching through `fetcher` when needed.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        release: ReleaseDescriptor,
        fetcher: Box<dyn BinaryFetcher>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            release,
            fetcher,
        }
    }

    /// The deterministic path of the cached binary.
    pub fn binary_path(&self) -> PathBuf {
        self.cache_dir.join(BINARY_FILE_NAME)
    }

    /// The release this cache is expected to hold.
    pub fn release(&self) -> &ReleaseDescriptor {
        &self.release
    }

    /// Ensures a usable binary exists at [`Self::binary_path`] and
    /// returns that path.
    ///
    /// State check, in order: absent → fetch and materialize;
    /// present and matching the expected release → return unchanged
    /// with zero writes; present but stale or corrupted → replace
    /// atomically.
    pub fn resolve(&self) -> Result<PathBuf, CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|source| CacheError::Io {
            path: self.cache_dir.clone(),
            source,
        })?;

        let path = self.binary_path();
        if path.exists() && self.is_current(&path) {
            return Ok(path);
        }

        self.refresh(&path)?;
        Ok(path)
    }

    /// Returns true if the file at `path` is the expected release.
    ///
    /// Zero-length, unreadable or non-executable files count as stale
    /// so they are replaced rather than exec'd.
    fn is_current(&self, path: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            match fs::metadata(path) {
                Ok(meta) if meta.permissions().mode() & 0o111 != 0 => {}
                _ => return false,
            }
        }

        match fs::read(path) {
            Ok(bytes) => !bytes.is_empty() && self.release.matches(&bytes),
            Err(_) => false,
        }
    }

    /// Fetches the expected release and installs it atomically.
    fn refresh(&self, path: &Path) -> Result<(), CacheError> {
        let bytes = self.fetcher.fetch()?;

        if !self.release.matches(&bytes) {
            return Err(CacheError::ChecksumMismatch {
                version: self.release.version.clone(),
                expected: self.release.checksum.clone(),
                actual: blake3::hash(&bytes).to_hex().to_string(),
            });
        }

        let io_err = |source: io::Error| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Written next to the final location so the rename stays on
        // one filesystem and is atomic.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.cache_dir).map_err(io_err)?;
        io::Write::write_all(&mut tmp, &bytes).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o755))
                .map_err(io_err)?;
        }

        tmp.persist(path)
            .map_err(|e| io_err(e.error))?;

        Ok(())
    }
}
