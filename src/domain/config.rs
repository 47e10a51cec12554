use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::framework::ProjectDuration;

/// Configuration for a results framework workspace.
///
/// This struct holds settings that control how new frameworks are sized,
/// where the project document lives, and how duration changes treat stored
/// targets. Workspaces opened from disk always mint random UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Project duration given to newly initialised frameworks.
    default_duration: ProjectDuration,

    /// Whether shrinking the project duration deletes stored targets for the
    /// years that fall away.
    ///
    /// When `false` (default) those entries are kept and only hidden from
    /// the target matrix, so growing the duration again brings them back.
    pub prune_on_shrink: bool,

    /// File name of the project document, relative to the workspace root.
    document: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration: ProjectDuration::default(),
            prune_on_shrink: false,
            document: default_document(),
        }
    }
}

impl Config {
    /// Reads `config.toml` from `path`.
    ///
    /// Keys missing from a version 1 file take their default values.
    ///
    /// # Errors
    ///
    /// Returns a message describing the read or parse failure.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Writes the configuration to `path`, tagged with its format version.
    ///
    /// # Errors
    ///
    /// Returns a message describing the encode or write failure.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the duration given to new frameworks.
    #[must_use]
    pub const fn default_duration(&self) -> ProjectDuration {
        self.default_duration
    }

    /// Sets the duration given to new frameworks.
    pub const fn set_default_duration(&mut self, duration: ProjectDuration) {
        self.default_duration = duration;
    }

    /// Returns the project document file name.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }
}

fn default_document() -> String {
    "project.json".to_string()
}

/// On-disk layouts of `config.toml`, keyed by the `_version` field.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        default_duration: ProjectDuration,

        #[serde(default)]
        prune_on_shrink: bool,

        #[serde(default = "default_document")]
        document: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                default_duration,
                prune_on_shrink,
                document,
            } => Self {
                default_duration,
                prune_on_shrink,
                document,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            default_duration: config.default_duration,
            prune_on_shrink: config.prune_on_shrink,
            document: config.document,
        }
    }
}
