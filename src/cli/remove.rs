use std::path::Path;

use logframe::{Mutation, ResultsFramework};
use tracing::instrument;

use crate::cli::{IndicatorSelector, NodePath, NodeRef, terminal::{self, Colorize}};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The node to remove, or the owner of the indicator to remove
    #[command(flatten)]
    path: NodePath,

    #[command(flatten)]
    indicator: IndicatorSelector,

    /// Don't ask for confirmation before removing a subtree
    #[arg(long, short)]
    yes: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut workspace = super::open(root)?;

        let mutation = if self.indicator.is_set() {
            let owner = self.path.owner()?;
            let indicator = self.indicator.resolve(&workspace, &owner)?;
            Mutation::RemoveIndicator { owner, indicator }
        } else {
            let node = self.path.node()?;
            let descendants = descendants(workspace.framework(), &node);
            if descendants > 0 && !self.yes {
                let prompt =
                    format!("Remove this node and the {descendants} node(s) beneath it?");
                if !terminal::confirm(&prompt)? {
                    println!("Nothing removed");
                    return Ok(());
                }
            }
            removal(node)
        };

        workspace.apply(mutation)?;
        super::save(root, &workspace)?;
        println!("{}", "Removed".success());
        Ok(())
    }
}

fn removal(node: NodeRef) -> Mutation {
    match node {
        NodeRef::Objective(objective) => Mutation::RemoveObjective { objective },
        NodeRef::Outcome(objective, outcome) => Mutation::RemoveOutcome { objective, outcome },
        NodeRef::Output(objective, outcome, output) => Mutation::RemoveOutput {
            objective,
            outcome,
            output,
        },
    }
}

/// Number of nodes (indicators included) beneath `node`. Zero if the node
/// does not exist.
fn descendants(framework: &ResultsFramework, node: &NodeRef) -> usize {
    let Some(objective) = framework.objective(match node {
        NodeRef::Objective(o) | NodeRef::Outcome(o, _) | NodeRef::Output(o, _, _) => o,
    }) else {
        return 0;
    };

    let outcome_size = |outcome: &logframe::Outcome| {
        outcome.indicators().len()
            + outcome
                .outputs()
                .iter()
                .map(|output| 1 + output.indicators().len())
                .sum::<usize>()
    };

    match node {
        NodeRef::Objective(_) => objective
            .outcomes()
            .iter()
            .map(|outcome| 1 + outcome_size(outcome))
            .sum(),
        NodeRef::Outcome(_, outcome) => objective.outcome(outcome).map_or(0, outcome_size),
        NodeRef::Output(_, outcome, output) => objective
            .outcome(outcome)
            .and_then(|o| o.output(output))
            .map_or(0, |o| o.indicators().len()),
    }
}
