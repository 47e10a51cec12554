use std::path::Path;

use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Report whether the document would change, without writing it
    #[arg(long)]
    check: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let workspace = super::open(root)?;
        let mut sink = super::document_file(root, &workspace);

        let text = std::fs::read_to_string(sink.path())?;
        let on_disk: serde_json::Value = serde_json::from_str(&text)?;
        if on_disk == workspace.document().to_value() {
            println!("{}", "Already normalized".success());
            return Ok(());
        }

        if self.check {
            anyhow::bail!("{} is not normalized", sink.path().display());
        }

        workspace.save(&mut sink)?;
        println!("{} {}", "Normalized".success(), sink.path().display());
        Ok(())
    }
}
