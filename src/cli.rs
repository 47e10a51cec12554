use std::path::{Path, PathBuf};

mod add;
mod duration;
mod edit;
mod init;
mod normalize;
mod remove;
mod show;
mod terminal;

use clap::ArgAction;
use logframe::{IndicatorOwner, JsonFile, NodeId, RandomIds, Workspace};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the workspace
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Show(show::Command::default()))
            .run(&self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new workspace with an empty results framework
    Init(init::Command),

    /// Show the results framework (default)
    Show(show::Command),

    /// Add an objective, outcome, output or indicator
    Add(add::Command),

    /// Remove a node and everything beneath it
    Remove(remove::Command),

    /// Edit the text of a node, or one field of an indicator
    Edit(edit::Command),

    /// Set the project duration in years
    ///
    /// Targets for years beyond the new duration are kept but hidden, unless
    /// `prune_on_shrink` is enabled in the configuration.
    Duration(duration::Command),

    /// Rewrite the project document in canonical form
    ///
    /// Missing fields are filled, missing ids are minted and oversized lists
    /// are truncated.
    Normalize(normalize::Command),
}

impl Command {
    fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Add(command) => command.run(root)?,
            Self::Remove(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Duration(command) => command.run(root)?,
            Self::Normalize(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Location of a node, given as ids from the top of the tree down.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct NodePath {
    /// Objective id
    #[arg(long)]
    objective: Option<String>,

    /// Outcome id (requires --objective)
    #[arg(long, requires = "objective")]
    outcome: Option<String>,

    /// Output id (requires --outcome)
    #[arg(long, requires = "outcome")]
    output: Option<String>,
}

/// The deepest node a [`NodePath`] names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    Objective(NodeId),
    Outcome(NodeId, NodeId),
    Output(NodeId, NodeId, NodeId),
}

impl NodePath {
    fn ids(&self) -> (Option<NodeId>, Option<NodeId>, Option<NodeId>) {
        (
            self.objective.as_deref().map(NodeId::from),
            self.outcome.as_deref().map(NodeId::from),
            self.output.as_deref().map(NodeId::from),
        )
    }

    /// The deepest node named by the path.
    fn node(&self) -> anyhow::Result<NodeRef> {
        match self.ids() {
            (Some(objective), None, None) => Ok(NodeRef::Objective(objective)),
            (Some(objective), Some(outcome), None) => Ok(NodeRef::Outcome(objective, outcome)),
            (Some(objective), Some(outcome), Some(output)) => {
                Ok(NodeRef::Output(objective, outcome, output))
            }
            _ => anyhow::bail!("a node path needs at least --objective"),
        }
    }

    /// The outcome or output whose indicators are addressed.
    fn owner(&self) -> anyhow::Result<IndicatorOwner> {
        match self.node()? {
            NodeRef::Outcome(objective, outcome) => {
                Ok(IndicatorOwner::Outcome { objective, outcome })
            }
            NodeRef::Output(objective, outcome, output) => Ok(IndicatorOwner::Output {
                objective,
                outcome,
                output,
            }),
            NodeRef::Objective(_) => {
                anyhow::bail!("indicators belong to an outcome or an output, not an objective")
            }
        }
    }
}

/// Selects one indicator of an owner, by id or by position.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct IndicatorSelector {
    /// Indicator id
    #[arg(long, conflicts_with = "position")]
    indicator: Option<String>,

    /// Indicator position within its owner, starting at 0
    #[arg(long)]
    position: Option<usize>,
}

impl IndicatorSelector {
    const fn is_set(&self) -> bool {
        self.indicator.is_some() || self.position.is_some()
    }

    fn resolve(
        &self,
        workspace: &Workspace<RandomIds>,
        owner: &IndicatorOwner,
    ) -> anyhow::Result<NodeId> {
        match (&self.indicator, self.position) {
            (Some(id), _) => Ok(NodeId::from(id.as_str())),
            (None, Some(position)) => Ok(logframe::domain::engine::indicator_id_at(
                workspace.framework(),
                owner,
                position,
            )?),
            (None, None) => anyhow::bail!("select an indicator with --indicator or --position"),
        }
    }
}

fn open(root: &Path) -> anyhow::Result<Workspace<RandomIds>> {
    Ok(Workspace::open(root)?)
}

/// The file the project document of `workspace` lives in.
fn document_file(root: &Path, workspace: &Workspace<RandomIds>) -> JsonFile {
    JsonFile::new(root.join(workspace.config().document()))
}

fn save(root: &Path, workspace: &Workspace<RandomIds>) -> anyhow::Result<()> {
    workspace.save(&mut document_file(root, workspace))?;
    Ok(())
}
