//! Depot bootstrap
//!
//! A depot is a client installation directory. Opening one adds every
//! configured manifest to a [`Filesystem`] in order, then loads every
//! configured name table, reporting each step to an optional
//! [`LoadingCallback`].

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::build_stamp::BuildStamp;
use crate::config::DepotConfig;
use crate::database::{DatabaseManager, DatabaseRegistry};
use crate::filesystem::Filesystem;
use crate::{Result, StorageError};

/// Receives load progress; returning `false` aborts the load
pub trait LoadingCallback {
    /// `steps` more steps have completed
    fn loading_steps_done(&mut self, steps: usize) -> bool;
}

impl<F: FnMut(usize) -> bool> LoadingCallback for F {
    fn loading_steps_done(&mut self, steps: usize) -> bool {
        self(steps)
    }
}

/// Outcome of [`Depot::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepotValidation {
    /// No readable build stamp
    DoesNotExist,
    /// The stamp names a client version that is not supported
    UnsupportedVersion,
    /// The depot can be used
    Succeeded,
}

/// An opened depot
#[derive(Debug)]
pub struct Depot {
    config: DepotConfig,
    filesystem: Arc<Filesystem>,
}

impl Depot {
    /// Open the depot described by `config`
    pub fn open(config: DepotConfig) -> Result<Self> {
        Self::load(config, None)
    }

    /// Open the depot, reporting progress to `callback`
    ///
    /// The callback sees one step before any work starts and one step after
    /// each manifest and each name table.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Aborted`] when the callback returns `false`.
    pub fn open_with_progress(config: DepotConfig, callback: &mut dyn LoadingCallback) -> Result<Self> {
        Self::load(config, Some(callback))
    }

    /// Number of steps an open of `config` reports
    pub fn expected_loading_steps(config: &DepotConfig) -> usize {
        1 + config.manifests.len() + config.file_tables.len()
    }

    fn load(config: DepotConfig, mut callback: Option<&mut dyn LoadingCallback>) -> Result<Self> {
        info!("Opening depot at {}", config.root.display());
        report_step(&mut callback)?;

        let mut filesystem = Filesystem::new();
        for path in config.manifest_paths() {
            filesystem.add_manifest(&path, config.archive)?;
            report_step(&mut callback)?;
        }

        for &table_key in &config.file_tables {
            filesystem.load_file_table(table_key)?;
            report_step(&mut callback)?;
        }

        debug!(
            "Depot loaded: {} archives, {} name tables",
            filesystem.archives().len(),
            filesystem.name_tables().len()
        );

        Ok(Self {
            config,
            filesystem: Arc::new(filesystem),
        })
    }

    /// Configuration the depot was opened with
    pub fn config(&self) -> &DepotConfig {
        &self.config
    }

    /// Depot root directory
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Shared filesystem over all archives and name tables
    pub fn filesystem(&self) -> &Arc<Filesystem> {
        &self.filesystem
    }

    /// Create the database manager over this depot
    pub fn database(&self, registry: &DatabaseRegistry) -> Result<DatabaseManager> {
        DatabaseManager::new(Arc::clone(&self.filesystem), registry)
    }

    /// Read the build stamp
    pub fn query_build_stamp(&self) -> Result<Option<BuildStamp>> {
        BuildStamp::read_from(&self.config.root)
    }

    /// Check the build stamp against the configured supported versions
    pub fn validate(&self) -> DepotValidation {
        validate_root(&self.config.root, &self.config.supported_versions)
    }
}

fn report_step(callback: &mut Option<&mut dyn LoadingCallback>) -> Result<()> {
    if callback
        .as_deref_mut()
        .is_some_and(|callback| !callback.loading_steps_done(1))
    {
        return Err(StorageError::Aborted);
    }
    Ok(())
}

/// Check a depot root without opening it
///
/// A stamp that cannot be read or parsed counts as missing.
pub fn validate_root(root: &Path, supported_versions: &[String]) -> DepotValidation {
    match BuildStamp::read_from(root) {
        Ok(Some(stamp)) if supported_versions.contains(&stamp.client_version) => {
            DepotValidation::Succeeded
        }
        Ok(Some(stamp)) => {
            debug!("Depot client version {} is not supported", stamp.client_version);
            DepotValidation::UnsupportedVersion
        }
        Ok(None) | Err(_) => DepotValidation::DoesNotExist,
    }
}
