//! Depot build stamp
//!
//! `depot/_databuild/databuild.stamp` is a text file of three lines: the
//! depot build, the build date and the client version the depot was built
//! for. All three must be present.

use std::path::{Path, PathBuf};

use crate::{Result, StorageError};

/// Stamp path relative to the depot root
pub const BUILD_STAMP_PATH: [&str; 3] = ["depot", "_databuild", "databuild.stamp"];

/// Parsed `databuild.stamp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStamp {
    /// Depot build identifier
    pub build: String,
    /// Date the depot was built
    pub build_date: String,
    /// Client version the depot matches
    pub client_version: String,
}

impl BuildStamp {
    /// Location of the stamp under a depot root
    pub fn path_in(root: &Path) -> PathBuf {
        BUILD_STAMP_PATH.iter().fold(root.to_path_buf(), |path, part| path.join(part))
    }

    /// Parse stamp file contents
    ///
    /// Line endings may be `\n` or `\r\n`. Lines after the third are ignored.
    pub fn parse_str(content: &str) -> Result<Self> {
        let mut lines = content.lines();
        let mut next = |what: &str| {
            lines
                .next()
                .map(str::to_owned)
                .ok_or_else(|| StorageError::Config(format!("build stamp is missing the {what} line")))
        };

        Ok(Self {
            build: next("build")?,
            build_date: next("build date")?,
            client_version: next("client version")?,
        })
    }

    /// Read the stamp of the depot at `root`
    ///
    /// Returns `None` when the stamp file does not exist.
    pub fn read_from(root: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(Self::path_in(root)) {
            Ok(content) => Self::parse_str(&content).map(Some),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stamp() {
        let stamp = BuildStamp::parse_str("eso.rc.5.3.4.1234567\r\n2020-02-10\r\n5.3.4").unwrap();
        assert_eq!(stamp.build, "eso.rc.5.3.4.1234567");
        assert_eq!(stamp.build_date, "2020-02-10");
        assert_eq!(stamp.client_version, "5.3.4");
    }

    #[test]
    fn test_missing_lines() {
        assert!(BuildStamp::parse_str("").is_err());
        assert!(BuildStamp::parse_str("build\ndate\n").is_err());
        assert!(BuildStamp::parse_str("build\ndate\n\n").is_ok());
    }

    #[test]
    fn test_read_missing_stamp() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BuildStamp::read_from(dir.path()).unwrap().is_none());

        let path = BuildStamp::path_in(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "b\nd\nv\n").unwrap();
        let stamp = BuildStamp::read_from(dir.path()).unwrap().unwrap();
        assert_eq!(stamp.client_version, "v");
    }
}
