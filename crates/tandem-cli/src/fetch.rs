//! Binary-fetch collaborator.
//!
//! Provides the legacy binary's bytes and the release descriptor the
//! cache validates against. Transport is deliberately simple here: a
//! mirror path (file or directory) configured by the deployment;
//! packaged builds fall back to the release descriptor pinned at
//! build time.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tandem_core::cache::{BinaryFetcher, FetchError, ReleaseDescriptor, BINARY_FILE_NAME};

/// Release descriptor pinned into the packaged build.
const PINNED_RELEASE_JSON: &str = include_str!("../release.json");

/// File name of the release descriptor next to a mirrored binary.
pub const RELEASE_FILE_NAME: &str = "release.json";

/// Loads the expected release: the mirror's `release.json` when one
/// is configured and present, the pinned descriptor otherwise.
pub fn load_release_descriptor(mirror: Option<&Path>) -> Result<ReleaseDescriptor> {
    if let Some(mirror) = mirror {
        let candidate = if mirror.is_dir() {
            mirror.join(RELEASE_FILE_NAME)
        } else {
            mirror.with_file_name(RELEASE_FILE_NAME)
        };
        if candidate.exists() {
            let content = fs::read_to_string(&candidate)
                .with_context(|| format!("failed to read {}", candidate.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", candidate.display()));
        }
    }

    serde_json::from_str(PINNED_RELEASE_JSON).context("pinned release descriptor is invalid")
}

/// Fetches the legacy binary from a configured mirror path.
pub struct MirrorFetcher {
    source: Option<PathBuf>,
}

impl MirrorFetcher {
    /// Creates a fetcher reading from `source`, a file or a directory
    /// containing the platform binary. `None` means no mirror is
    /// configured; fetching then fails with guidance.
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source }
    }

    fn binary_source(&self) -> Result<PathBuf, FetchError> {
        let source = self.source.as_ref().ok_or_else(|| {
            FetchError::new("no legacy-binary mirror configured; set TANDEM_LEGACY_MIRROR")
        })?;
        Ok(if source.is_dir() {
            source.join(BINARY_FILE_NAME)
        } else {
            source.clone()
        })
    }
}

impl BinaryFetcher for MirrorFetcher {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let path = self.binary_source()?;
        fs::read(&path)
            .map_err(|e| FetchError::io(format!("failed to read mirror {}", path.display()), e))
    }
}
