//! Filesystem export of keyword lists as CSV

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::domain::keywords::{csv_file_name, to_csv_bytes};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("There are no keywords to export.")]
    NothingToExport,

    #[error("Failed to write {path}: {cause}")]
    Io { path: PathBuf, cause: String },
}

/// Writes keyword CSV files.
///
/// A target that is an existing directory receives a file named after the
/// topic, e.g. `{dir}/kopi_susu_keywords.csv`; any other target is used as
/// the file path.
pub struct KeywordCsvFile {
    target: PathBuf,
}

impl KeywordCsvFile {
    pub fn new(target: impl AsRef<Path>) -> Self {
        Self {
            target: target.as_ref().to_path_buf(),
        }
    }

    /// Resolves the file that `write` will produce for `topic`.
    pub fn path_for(&self, topic: &str) -> PathBuf {
        if self.target.is_dir() {
            self.target.join(csv_file_name(topic))
        } else {
            self.target.clone()
        }
    }

    /// Writes `keywords` under a `Keywords` header and returns the file path.
    ///
    /// The file is written to a temporary sibling and renamed into place.
    pub async fn write(&self, topic: &str, keywords: &[String]) -> Result<PathBuf, ExportError> {
        if keywords.is_empty() {
            return Err(ExportError::NothingToExport);
        }
        let path = self.path_for(topic);
        let io_error = |e: std::io::Error| ExportError::Io {
            path: path.clone(),
            cause: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let temp_path = path.with_extension("csv.tmp");
        fs::write(&temp_path, to_csv_bytes(keywords))
            .await
            .map_err(io_error)?;
        fs::rename(&temp_path, &path).await.map_err(io_error)?;

        Ok(path)
    }
}
