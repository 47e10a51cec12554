use std::{fs, path::Path};

use logframe::{
    Config, JsonFile, Persist, ProjectDocument, ProjectDuration, ResultsFramework,
    storage::{META_DIR, config_path},
};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Project duration in years (1-5)
    #[arg(long, short, value_parser = parse_duration)]
    duration: Option<ProjectDuration>,
}

pub fn parse_duration(s: &str) -> Result<ProjectDuration, String> {
    let years: u8 = s.parse().map_err(|e| format!("{e}"))?;
    ProjectDuration::try_from(years).map_err(|e| e.to_string())
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let meta_dir = root.join(META_DIR);
        if meta_dir.exists() {
            anyhow::bail!("Workspace already initialized (found existing {META_DIR} directory)");
        }

        fs::create_dir_all(&meta_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create {META_DIR} directory: {e}"))?;

        let mut config = Config::default();
        if let Some(duration) = self.duration {
            config.set_default_duration(duration);
        }
        config
            .save(&config_path(root))
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!("Initialized results framework workspace in {}", root.display());
        println!("  Created: {META_DIR}/config.toml");

        let document_path = root.join(config.document());
        if document_path.exists() {
            println!("  Using existing: {}", config.document());
        } else {
            let document =
                ProjectDocument::new(ResultsFramework::new(config.default_duration()));
            JsonFile::new(document_path).save(&document)?;
            println!("  Created: {}", config.document());
        }

        println!();
        println!("Next steps:");
        println!("  rf add objective --title \"Your first objective\"");

        Ok(())
    }
}
