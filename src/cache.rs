//! Persistent link → resolved URL cache.
//!
//! The cache is a flat JSON object stored on disk. It is read once when a run
//! starts and written back in full once resolution finishes, so entries only
//! ever accumulate; there is no eviction.
//!
//! # Example
//!
//! ```no_run
//! use linkmeta_core::LinkCache;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cache = LinkCache::load(Path::new("link_lookup.json"))?;
//! cache.insert("https://bit.ly/abc", "https://example.com/dp/B00TEST123");
//! cache.save()?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

/// Link cache errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache file exists but could not be read.
    #[error("failed to read link cache '{}': {source}", path.display())]
    Read {
        /// Cache file location
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The cache file is not a JSON object of strings.
    #[error(
        "link cache '{}' is malformed: {source}\n  Suggestion: Delete the file to start with an empty cache",
        path.display()
    )]
    Malformed {
        /// Cache file location
        path: PathBuf,
        /// Underlying decode failure
        source: serde_json::Error,
    },

    /// The cache could not be written back.
    #[error("failed to write link cache '{}': {source}", path.display())]
    Write {
        /// Cache file location
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },
}

/// On-disk mapping of original links to their resolved URLs.
#[derive(Debug, Clone)]
pub struct LinkCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LinkCache {
    /// Creates an empty cache that will be saved to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Loads the cache stored at `path`.
    ///
    /// A missing file is not an error and yields an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Read`] if the file exists but cannot be read,
    /// or [`CacheError::Malformed`] if its contents are not a JSON string map.
    #[instrument(skip(path), fields(cache_path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("no link cache on disk; starting empty");
                return Ok(Self::empty(path));
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let entries: BTreeMap<String, String> =
            serde_json::from_slice(&raw).map_err(|source| CacheError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(entries = entries.len(), "link cache loaded");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Returns the cached resolution for `link`, if any.
    #[must_use]
    pub fn get(&self, link: &str) -> Option<&str> {
        self.entries.get(link).map(String::as_str)
    }

    /// Records (or overwrites) the resolution for `link`.
    pub fn insert(&mut self, link: impl Into<String>, resolved: impl Into<String>) {
        self.entries.insert(link.into(), resolved.into());
    }

    /// Number of cached links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Location the cache is saved to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the full cache to disk, replacing the previous file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Write`] if the parent directory cannot be created
    /// or the file cannot be written.
    #[instrument(skip(self), fields(path = %self.path.display(), entries = self.entries.len()))]
    pub fn save(&self) -> Result<(), CacheError> {
        let write_error = |source: io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let encoded = serde_json::to_vec_pretty(&self.entries)
            .map_err(|error| write_error(io::Error::other(error)))?;
        fs::write(&self.path, encoded).map_err(write_error)?;

        debug!("link cache saved");
        Ok(())
    }
}
