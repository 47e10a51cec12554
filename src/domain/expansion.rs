//! Which nodes a view currently shows expanded.
//!
//! This is view state only. It is keyed by node id, lives beside the
//! framework rather than inside it, and is never persisted. Ids of nodes
//! that have since been removed may linger; they are never rendered again.

use std::collections::HashSet;

use crate::domain::{framework::ResultsFramework, id::NodeId, indicator::Indicator};

/// The set of expanded node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<NodeId>,
}

impl ExpansionState {
    /// Nothing expanded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the membership of `id`.
    ///
    /// Returns `true` if the node is expanded afterwards.
    pub fn toggle(&mut self, id: &NodeId) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    /// Whether `id` is shown expanded.
    #[must_use]
    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.expanded.contains(id)
    }

    /// Marks `id` expanded.
    pub fn expand(&mut self, id: NodeId) {
        self.expanded.insert(id);
    }

    /// Marks `id` collapsed.
    pub fn collapse(&mut self, id: &NodeId) {
        self.expanded.remove(id);
    }

    /// Expands every node currently in `framework`.
    pub fn expand_all(&mut self, framework: &ResultsFramework) {
        self.expanded.extend(framework.all_ids().into_iter().cloned());
    }

    /// Expands `id` together with every node above it, so the node is shown.
    ///
    /// For an indicator, the outcome or output carrying it is revealed. Returns
    /// `false` and leaves the state alone if `id` is not in `framework`.
    pub fn reveal(&mut self, framework: &ResultsFramework, id: &NodeId) -> bool {
        let Some(chain) = ancestry(framework, id) else {
            return false;
        };
        self.expanded.extend(chain.into_iter().cloned());
        true
    }

    /// Collapses everything.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Forgets ids that no longer name a node in `framework`.
    pub fn retain_live(&mut self, framework: &ResultsFramework) {
        let live = framework.all_ids();
        self.expanded.retain(|id| live.contains(id));
    }

    /// Number of expanded ids, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// Whether nothing is expanded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// The expandable nodes from the root down to `id`, or to the owner of `id`
/// when it names an indicator.
fn ancestry<'a>(framework: &'a ResultsFramework, id: &NodeId) -> Option<Vec<&'a NodeId>> {
    let carries = |indicators: &[Indicator]| indicators.iter().any(|i| i.id() == id);

    for objective in framework.objectives() {
        if objective.id() == id {
            return Some(vec![objective.id()]);
        }
        for outcome in objective.outcomes() {
            if outcome.id() == id || carries(outcome.indicators()) {
                return Some(vec![objective.id(), outcome.id()]);
            }
            for output in outcome.outputs() {
                if output.id() == id || carries(output.indicators()) {
                    return Some(vec![objective.id(), outcome.id(), output.id()]);
                }
            }
        }
    }
    None
}
