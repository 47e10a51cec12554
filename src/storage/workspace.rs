//! The single owner of the framework being edited.
//!
//! A [`Workspace`] holds the current document, the identifier source used
//! for new nodes and the view's expansion state. Edits are applied one at a
//! time and replace the current value. Saving is a separate, explicit step;
//! a failed save does not roll back any edit.

use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::{
    domain::{
        Config, EditError, ExpansionState, IdSource, Mutation, NodeId, RandomIds, ResultsFramework,
        engine,
    },
    storage::{DocumentLoadError, Persist, PersistError, ProjectDocument},
};

/// Directory holding workspace metadata, relative to the root.
pub const META_DIR: &str = ".rf";

/// Errors that can occur when opening a workspace.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The project document could not be loaded.
    #[error("failed to load {}: {source}", path.display())]
    Document {
        /// The document path.
        path: PathBuf,
        /// The underlying error.
        source: DocumentLoadError,
    },
}

/// An editing session over one project document.
#[derive(Debug)]
pub struct Workspace<I> {
    document: ProjectDocument,
    ids: I,
    config: Config,
    expansion: ExpansionState,
}

impl<I: IdSource> Workspace<I> {
    /// Starts a session over `document`.
    #[must_use]
    pub fn new(document: ProjectDocument, ids: I, config: Config) -> Self {
        Self {
            document,
            ids,
            config,
            expansion: ExpansionState::new(),
        }
    }

    /// The current framework.
    #[must_use]
    pub const fn framework(&self) -> &ResultsFramework {
        self.document.framework()
    }

    /// The current document, framework included.
    #[must_use]
    pub const fn document(&self) -> &ProjectDocument {
        &self.document
    }

    /// The workspace configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The view's expansion state. Never saved.
    #[must_use]
    pub const fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    /// Mutable access to the view's expansion state.
    pub const fn expansion_mut(&mut self) -> &mut ExpansionState {
        &mut self.expansion
    }

    /// Applies one edit to the current framework.
    ///
    /// Returns the id of the node created by an add. When the configuration
    /// asks for it, shrinking the project duration also prunes the targets
    /// that fall out of range.
    ///
    /// # Errors
    ///
    /// Returns the reason the edit was rejected. The framework is unchanged
    /// in that case.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, mutation: Mutation) -> Result<Option<NodeId>, EditError> {
        let prune = match &mutation {
            Mutation::SetProjectDuration { duration } => {
                self.config.prune_on_shrink && *duration < self.framework().project_duration()
            }
            _ => false,
        };

        let (mut next, result) =
            engine::apply(self.document.framework(), mutation, &mut self.ids).into_parts();
        let created = result?;
        if prune {
            next = engine::prune_hidden_targets(&next).framework;
        }
        self.document.set_framework(next);
        Ok(created)
    }

    /// Hands the current document to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the sink's error. The in-memory framework keeps every edit
    /// regardless; retrying is up to the caller.
    pub fn save(&self, sink: &mut impl Persist) -> Result<(), PersistError> {
        sink.save(&self.document).inspect_err(|e| {
            tracing::warn!("save failed, keeping in-memory edits: {e}");
        })
    }
}

impl Workspace<RandomIds> {
    /// Opens the workspace rooted at `root`.
    ///
    /// Configuration is read from `.rf/config.toml`, falling back to the
    /// defaults if it is missing or invalid. New nodes get random UUIDs, so
    /// an id removed in one session is never handed out again in a later
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an error if the project document cannot be loaded.
    pub fn open(root: &Path) -> Result<Self, OpenError> {
        let config = load_config(root);
        let mut ids = RandomIds;
        let path = root.join(config.document());
        let document = ProjectDocument::load(&path, &mut ids)
            .map_err(|source| OpenError::Document { path, source })?;
        Ok(Self::new(document, ids, config))
    }
}

/// Path of the configuration file for the workspace rooted at `root`.
#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    root.join(META_DIR).join("config.toml")
}

fn load_config(root: &Path) -> Config {
    Config::load(&config_path(root)).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}
