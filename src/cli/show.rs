use std::path::Path;

use logframe::{
    ExpansionState, Indicator, NodeId, ResultsFramework,
    domain::targets::{self, labels_for},
};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Print the project document as JSON
    #[arg(long)]
    json: bool,

    /// Only expand the given node and the nodes above it (may be repeated)
    ///
    /// By default every node is expanded. An indicator id reveals the outcome
    /// or output that carries it.
    #[arg(long, value_name = "ID")]
    expand: Vec<String>,

    /// Show only the objectives
    #[arg(long, conflicts_with = "expand")]
    collapse: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut workspace = super::open(root)?;

        if self.json {
            let json = serde_json::to_string_pretty(&workspace.document().to_value())?;
            println!("{json}");
            return Ok(());
        }

        let framework = workspace.framework().clone();
        let expansion = workspace.expansion_mut();
        if self.collapse {
            expansion.collapse_all();
        } else if self.expand.is_empty() {
            expansion.expand_all(&framework);
        } else {
            for id in self.expand.into_iter().map(NodeId::from) {
                if !expansion.reveal(&framework, &id) {
                    eprintln!("{}", format!("no node with id {id}").warning());
                }
            }
        }

        print!("{}", render(&framework, workspace.expansion()));
        Ok(())
    }
}

fn render(framework: &ResultsFramework, expansion: &ExpansionState) -> String {
    let mut out = String::new();
    let duration = framework.project_duration();
    let labels = labels_for(duration);

    out.push_str(&format!(
        "{} ({duration} year{})\n",
        "Results framework".strong(),
        if duration.get() == 1 { "" } else { "s" }
    ));

    if framework.objectives().is_empty() {
        out.push_str(&format!("  {}\n", "no objectives".dim()));
        return out;
    }

    for objective in framework.objectives() {
        node_line(&mut out, 1, "Objective", objective.id(), &objective.title);
        if !expansion.is_expanded(objective.id()) {
            continue;
        }
        for outcome in objective.outcomes() {
            node_line(&mut out, 2, "Outcome", outcome.id(), &outcome.title);
            if !expansion.is_expanded(outcome.id()) {
                continue;
            }
            for indicator in outcome.indicators() {
                indicator_lines(&mut out, 3, indicator, &labels, duration);
            }
            for output in outcome.outputs() {
                node_line(&mut out, 3, "Output", output.id(), &output.title);
                if !expansion.is_expanded(output.id()) {
                    continue;
                }
                for indicator in output.indicators() {
                    indicator_lines(&mut out, 4, indicator, &labels, duration);
                }
            }
        }
    }
    out
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn title_or_placeholder(title: &str) -> String {
    if title.is_empty() {
        "(untitled)".dim()
    } else {
        title.to_string()
    }
}

fn node_line(out: &mut String, depth: usize, kind: &str, id: &NodeId, title: &str) {
    out.push_str(&format!(
        "{}{} {} {}\n",
        indent(depth),
        kind.info(),
        format!("[{id}]").dim(),
        title_or_placeholder(title)
    ));
}

fn indicator_lines(
    out: &mut String,
    depth: usize,
    indicator: &Indicator,
    labels: &[String],
    duration: logframe::ProjectDuration,
) {
    out.push_str(&format!(
        "{}{} {} {}\n",
        indent(depth),
        "Indicator".success(),
        format!("[{}]", indicator.id()).dim(),
        title_or_placeholder(&indicator.description)
    ));

    let pad = indent(depth + 1);
    if !indicator.baseline.is_empty() {
        out.push_str(&format!(
            "{pad}baseline: {} {}\n",
            indicator.baseline, indicator.baseline_unit
        ));
    }

    let cells = targets::reconcile(indicator, labels)
        .iter()
        .map(|cell| format!("{}: {}", cell.label, cell.display_value()))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(&format!("{pad}targets: {cells}\n"));

    for (label, value) in targets::hidden_targets(indicator, duration) {
        out.push_str(&format!(
            "{pad}{}\n",
            format!("hidden {label}: {value}").dim()
        ));
    }
}
