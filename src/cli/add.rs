use std::path::Path;

use logframe::{IndicatorField, Mutation, NodeId, NodeUpdate};
use tracing::instrument;

use crate::cli::{NodePath, NodeRef, terminal::Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Kind {
    Objective,
    Outcome,
    Output,
    Indicator,
}

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// What to add
    #[arg(value_enum)]
    kind: Kind,

    /// The parent of the new node
    ///
    /// Outcomes need --objective, outputs need --outcome, and indicators
    /// attach to the deepest of --outcome or --output.
    #[command(flatten)]
    parent: NodePath,

    /// Title of the new node, or description of a new indicator
    #[arg(long, short)]
    title: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut workspace = super::open(root)?;

        let (add, label) = self.add_mutation()?;
        let id = workspace
            .apply(add)?
            .ok_or_else(|| anyhow::anyhow!("no id was returned for the new {label}"))?;

        if let Some(title) = self.title.as_deref() {
            workspace.apply(self.title_mutation(&id, title)?)?;
        }

        super::save(root, &workspace)?;
        println!("{} {label} {}", "Added".success(), id.as_str().strong());
        Ok(())
    }

    fn add_mutation(&self) -> anyhow::Result<(Mutation, &'static str)> {
        let mutation = match (self.kind, self.parent.objective.is_some()) {
            (Kind::Objective, false) => (Mutation::AddObjective, "objective"),
            (Kind::Objective, true) => anyhow::bail!("objectives have no parent"),
            (Kind::Indicator, _) => (
                Mutation::AddIndicator {
                    owner: self.parent.owner()?,
                },
                "indicator",
            ),
            (Kind::Outcome, _) => match self.parent.node()? {
                NodeRef::Objective(objective) => (Mutation::AddOutcome { objective }, "outcome"),
                _ => anyhow::bail!("an outcome's parent is an objective"),
            },
            (Kind::Output, _) => match self.parent.node()? {
                NodeRef::Outcome(objective, outcome) => {
                    (Mutation::AddOutput { objective, outcome }, "output")
                }
                _ => anyhow::bail!("an output's parent is an outcome"),
            },
        };
        Ok(mutation)
    }

    fn title_mutation(&self, id: &NodeId, title: &str) -> anyhow::Result<Mutation> {
        let id = id.clone();
        let mutation = match self.kind {
            Kind::Objective => Mutation::UpdateObjective {
                objective: id,
                update: NodeUpdate::title(title),
            },
            Kind::Outcome => match self.parent.node()? {
                NodeRef::Objective(objective) => Mutation::UpdateOutcome {
                    objective,
                    outcome: id,
                    update: NodeUpdate::title(title),
                },
                _ => anyhow::bail!("an outcome's parent is an objective"),
            },
            Kind::Output => match self.parent.node()? {
                NodeRef::Outcome(objective, outcome) => Mutation::UpdateOutput {
                    objective,
                    outcome,
                    output: id,
                    update: NodeUpdate::title(title),
                },
                _ => anyhow::bail!("an output's parent is an outcome"),
            },
            Kind::Indicator => Mutation::UpdateIndicator {
                owner: self.parent.owner()?,
                indicator: id,
                field: IndicatorField::Description(title.to_string()),
            },
        };
        Ok(mutation)
    }
}
