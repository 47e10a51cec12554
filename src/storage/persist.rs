use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::storage::ProjectDocument;

/// Errors reported by a [`Persist`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Writing to local storage failed.
    #[error("failed to write project document: {0}")]
    Io(#[from] io::Error),
    /// The document could not be encoded.
    #[error("failed to encode project document: {0}")]
    Encode(#[from] serde_json::Error),
    /// A remote store refused or failed the save.
    #[error("save rejected: {0}")]
    Rejected(String),
}

/// Somewhere a project document can be saved.
///
/// The editing engine never saves on its own. Hosts hand the current
/// document to a `Persist` implementation when they choose to.
pub trait Persist {
    /// Stores the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document could not be stored.
    fn save(&mut self, document: &ProjectDocument) -> Result<(), PersistError>;
}

/// A JSON file on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// A sink writing to `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The file written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persist for JsonFile {
    fn save(&mut self, document: &ProjectDocument) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!("Saved project document to {}", self.path.display());
        Ok(())
    }
}
