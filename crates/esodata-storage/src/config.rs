//! Configuration for archives and depots

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Result, StorageError};

/// Manifests of a standard client install, relative to the depot root
pub const DEFAULT_MANIFESTS: [&str; 3] = [
    "game/client/game.mnf",
    "depot/eso.mnf",
    "vo_en/esoaudioen.mnf",
];

/// Name tables of a standard client install
pub const DEFAULT_FILE_TABLES: [u64; 2] = [0x8000_0001_0000_0000, 0x0000_0000_00ff_ffff];

/// Options applied when opening an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveOptions {
    /// Read every signed entry at open time to learn its exact payload size
    pub need_precise_sizes: bool,

    /// Check per-file signatures; when off, signature headers are still
    /// stripped
    pub verify_signatures: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            need_precise_sizes: false,
            verify_signatures: true,
        }
    }
}

impl ArchiveOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable eager size resolution
    #[must_use]
    pub const fn with_precise_sizes(mut self, enable: bool) -> Self {
        self.need_precise_sizes = enable;
        self
    }

    /// Enable or disable per-file signature checks
    #[must_use]
    pub const fn with_signature_verification(mut self, enable: bool) -> Self {
        self.verify_signatures = enable;
        self
    }
}

/// Layout of a depot on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepotConfig {
    /// Depot root directory
    pub root: PathBuf,

    /// Manifests in lookup precedence order, relative to `root`
    pub manifests: Vec<PathBuf>,

    /// Name table keys to load after the manifests
    pub file_tables: Vec<u64>,

    /// Client versions accepted by [`crate::Depot::validate`]
    pub supported_versions: Vec<String>,

    /// Options for every archive
    pub archive: ArchiveOptions,
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            manifests: DEFAULT_MANIFESTS.iter().map(PathBuf::from).collect(),
            file_tables: DEFAULT_FILE_TABLES.to_vec(),
            supported_versions: Vec::new(),
            archive: ArchiveOptions::default(),
        }
    }
}

impl DepotConfig {
    /// Create the standard layout rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Create an empty layout rooted at `root`
    pub fn empty<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            manifests: Vec::new(),
            file_tables: Vec::new(),
            ..Default::default()
        }
    }

    /// Load a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| match e {
            StorageError::Config(message) => {
                StorageError::Config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Parse a JSON configuration
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| StorageError::Config(e.to_string()))
    }

    /// Render the configuration as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Config(e.to_string()))
    }

    /// Append a manifest
    #[must_use]
    pub fn with_manifest<P: AsRef<Path>>(mut self, manifest: P) -> Self {
        self.manifests.push(manifest.as_ref().to_path_buf());
        self
    }

    /// Append a name table key
    #[must_use]
    pub fn with_file_table(mut self, key: u64) -> Self {
        self.file_tables.push(key);
        self
    }

    /// Add an accepted client version
    #[must_use]
    pub fn with_supported_version(mut self, version: impl Into<String>) -> Self {
        self.supported_versions.push(version.into());
        self
    }

    /// Replace the archive options
    #[must_use]
    pub const fn with_archive_options(mut self, options: ArchiveOptions) -> Self {
        self.archive = options;
        self
    }

    /// Absolute paths of the configured manifests
    pub fn manifest_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.manifests.iter().map(|manifest| self.root.join(manifest))
    }
}
