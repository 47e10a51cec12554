use std::path::Path;

use logframe::{Mutation, ProjectDuration, domain::targets};
use tracing::instrument;

use crate::cli::{init::parse_duration, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Project duration in years (1-5)
    #[arg(value_parser = parse_duration)]
    years: ProjectDuration,

    /// Delete targets for years beyond the new duration
    #[arg(long)]
    prune: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut workspace = super::open(root)?;

        workspace.apply(Mutation::SetProjectDuration {
            duration: self.years,
        })?;
        if self.prune {
            workspace.apply(Mutation::PruneHiddenTargets)?;
        }
        super::save(root, &workspace)?;

        println!(
            "{} project duration to {} year(s)",
            "Set".success(),
            self.years
        );

        let hidden: usize = workspace
            .framework()
            .indicators()
            .map(|indicator| targets::hidden_targets(indicator, self.years).len())
            .sum();
        if hidden > 0 {
            println!(
                "{}",
                format!("{hidden} target(s) beyond year {} are kept but hidden", self.years)
                    .warning()
            );
        }
        Ok(())
    }
}
