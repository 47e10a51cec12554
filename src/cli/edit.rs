use std::path::Path;

use logframe::{IndicatorField, Mutation, NodeUpdate};
use tracing::instrument;

use crate::cli::{IndicatorSelector, NodePath, NodeRef, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The node to edit, or the owner of the indicator to edit
    #[command(flatten)]
    path: NodePath,

    #[command(flatten)]
    indicator: IndicatorSelector,

    /// New title
    #[arg(long, conflicts_with_all = ["field", "indicator", "position"])]
    title: Option<String>,

    /// New description
    #[arg(long, conflicts_with_all = ["field", "indicator", "position"])]
    description: Option<String>,

    /// Indicator field to set, e.g. `baseline`, `dataCollection.frequency`
    /// or `targets.Year 2`
    #[arg(long, requires = "value")]
    field: Option<String>,

    /// Value for --field
    #[arg(long, requires = "field")]
    value: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut workspace = super::open(root)?;

        let mutation = match (&self.field, &self.value) {
            (Some(path), Some(value)) => {
                let owner = self.path.owner()?;
                let indicator = self.indicator.resolve(&workspace, &owner)?;
                Mutation::UpdateIndicator {
                    owner,
                    indicator,
                    field: IndicatorField::parse(path, value.as_str())?,
                }
            }
            _ => {
                if self.title.is_none() && self.description.is_none() {
                    anyhow::bail!("nothing to change: pass --title, --description or --field");
                }
                self.node_update()?
            }
        };

        workspace.apply(mutation)?;
        super::save(root, &workspace)?;
        println!("{}", "Updated".success());
        Ok(())
    }

    fn node_update(&self) -> anyhow::Result<Mutation> {
        let update = NodeUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
        };
        Ok(match self.path.node()? {
            NodeRef::Objective(objective) => Mutation::UpdateObjective { objective, update },
            NodeRef::Outcome(objective, outcome) => Mutation::UpdateOutcome {
                objective,
                outcome,
                update,
            },
            NodeRef::Output(objective, outcome, output) => Mutation::UpdateOutput {
                objective,
                outcome,
                output,
                update,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Command::try_parse_from(std::iter::once("edit").chain(args.iter().copied()))
    }

    #[test]
    fn title_targets_deepest_node() {
        let command = parse(&[
            "--objective", "a", "--outcome", "b", "--title", "Enrolment",
        ])
        .unwrap();
        assert_eq!(
            command.node_update().unwrap(),
            Mutation::UpdateOutcome {
                objective: "a".into(),
                outcome: "b".into(),
                update: NodeUpdate::title("Enrolment"),
            }
        );
    }

    #[test]
    fn field_needs_value() {
        assert!(parse(&["--objective", "a", "--outcome", "b", "--field", "baseline"]).is_err());
    }

    #[test]
    fn title_and_field_conflict() {
        let result = parse(&[
            "--objective", "a", "--outcome", "b", "--title", "x", "--field", "baseline", "--value",
            "3",
        ]);
        assert!(result.is_err());
    }
}
