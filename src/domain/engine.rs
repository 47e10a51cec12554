//! Copy-on-write edits to a [`ResultsFramework`].
//!
//! Every operation takes the current tree by reference and returns an
//! [`Edit`] holding the next tree value. Operations are total: a request
//! that cannot be honoured (a missing id, a full collection) yields a tree
//! equal to the input together with an [`EditError`] describing why.
//!
//! Paths are resolved top down. An objective is located by id, then an
//! outcome within that objective, then an output within that outcome. A
//! miss at any stage rejects the edit.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    bounded::{Appended, MAX_CHILDREN, try_append},
    framework::{Level, Objective, Outcome, Output, ProjectDuration, ResultsFramework},
    id::{IdSource, NodeId},
    indicator::{Indicator, IndicatorField},
    targets,
};

/// Reasons an edit is declined.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    /// An add at a capped level that is already full.
    #[error("cannot add {level}: limit of {cap} reached")]
    CapacityExceeded {
        /// The level that was being added to.
        level: Level,
        /// The cap that was hit.
        cap: usize,
    },
    /// A path segment names a node that does not exist.
    #[error("{level} {id} not found")]
    NotFound {
        /// The level of the missing node.
        level: Level,
        /// The id that was looked up.
        id: NodeId,
    },
    /// A target written for a label that is not a year of the project.
    #[error("'{year}' is not a target year of a {duration}-year project")]
    TargetYearOutOfRange {
        /// The rejected label.
        year: String,
        /// The project duration at the time of the edit.
        duration: ProjectDuration,
    },
    /// An indicator position past the end of its list.
    #[error("no indicator at position {position} (owner has {len})")]
    PositionOutOfRange {
        /// The requested position.
        position: usize,
        /// How many indicators the owner has.
        len: usize,
    },
}

/// Whether an edit took effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditStatus {
    /// The edit was applied.
    Applied {
        /// The id minted by an add, if any.
        created: Option<NodeId>,
    },
    /// The edit was declined and the tree is unchanged.
    Rejected(EditError),
}

/// The result of an edit: the next tree value and what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Edit {
    /// The tree after the edit. Equal to the input when rejected.
    pub framework: ResultsFramework,
    /// What happened.
    pub status: EditStatus,
}

impl Edit {
    /// Whether the edit took effect.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self.status, EditStatus::Applied { .. })
    }

    /// The id minted by an add, if the add was applied.
    #[must_use]
    pub fn created(&self) -> Option<&NodeId> {
        match &self.status {
            EditStatus::Applied { created } => created.as_ref(),
            EditStatus::Rejected(_) => None,
        }
    }

    /// The next tree, or the reason the edit was rejected.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason. The unchanged tree is dropped.
    pub fn into_result(self) -> Result<(ResultsFramework, Option<NodeId>), EditError> {
        match self.status {
            EditStatus::Applied { created } => Ok((self.framework, created)),
            EditStatus::Rejected(e) => Err(e),
        }
    }

    /// Splits the edit into the next tree and a `Result` for use with `?`.
    ///
    /// # Errors
    ///
    /// The second element is an error when the edit was rejected.
    pub fn into_parts(self) -> (ResultsFramework, Result<Option<NodeId>, EditError>) {
        let result = match self.status {
            EditStatus::Applied { created } => Ok(created),
            EditStatus::Rejected(e) => Err(e),
        };
        (self.framework, result)
    }
}

/// Partial update of an objective, outcome or output.
///
/// Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeUpdate {
    /// An update that sets only the title.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    /// An update that sets only the description.
    #[must_use]
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            title: None,
            description: Some(description.into()),
        }
    }

    fn apply_to(self, title: &mut String, description: &mut String) {
        if let Some(t) = self.title {
            *title = t;
        }
        if let Some(d) = self.description {
            *description = d;
        }
    }
}

/// The outcome or output an indicator list belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum IndicatorOwner {
    /// Indicators attached directly to an outcome.
    Outcome {
        /// The objective holding the outcome.
        objective: NodeId,
        /// The outcome.
        outcome: NodeId,
    },
    /// Indicators attached to an output.
    Output {
        /// The objective holding the outcome.
        objective: NodeId,
        /// The outcome holding the output.
        outcome: NodeId,
        /// The output.
        output: NodeId,
    },
}

/// A single edit request, naming the level, the verb and the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Append a new, empty objective.
    AddObjective,
    /// Remove an objective and its subtree.
    RemoveObjective {
        /// Objective to remove.
        objective: NodeId,
    },
    /// Update an objective's text.
    UpdateObjective {
        /// Objective to update.
        objective: NodeId,
        /// Fields to write.
        update: NodeUpdate,
    },
    /// Append a new, empty outcome to an objective.
    AddOutcome {
        /// Parent objective.
        objective: NodeId,
    },
    /// Remove an outcome and its subtree.
    RemoveOutcome {
        /// Parent objective.
        objective: NodeId,
        /// Outcome to remove.
        outcome: NodeId,
    },
    /// Update an outcome's text.
    UpdateOutcome {
        /// Parent objective.
        objective: NodeId,
        /// Outcome to update.
        outcome: NodeId,
        /// Fields to write.
        update: NodeUpdate,
    },
    /// Append a new, empty output to an outcome.
    AddOutput {
        /// Grandparent objective.
        objective: NodeId,
        /// Parent outcome.
        outcome: NodeId,
    },
    /// Remove an output and its indicators.
    RemoveOutput {
        /// Grandparent objective.
        objective: NodeId,
        /// Parent outcome.
        outcome: NodeId,
        /// Output to remove.
        output: NodeId,
    },
    /// Update an output's text.
    UpdateOutput {
        /// Grandparent objective.
        objective: NodeId,
        /// Parent outcome.
        outcome: NodeId,
        /// Output to update.
        output: NodeId,
        /// Fields to write.
        update: NodeUpdate,
    },
    /// Append a new, empty indicator to an outcome or output.
    AddIndicator {
        /// Where the indicator goes.
        owner: IndicatorOwner,
    },
    /// Remove an indicator.
    RemoveIndicator {
        /// Where the indicator lives.
        owner: IndicatorOwner,
        /// Indicator to remove.
        indicator: NodeId,
    },
    /// Write one field of an indicator.
    UpdateIndicator {
        /// Where the indicator lives.
        owner: IndicatorOwner,
        /// Indicator to update.
        indicator: NodeId,
        /// Field and value to write.
        field: IndicatorField,
    },
    /// Change the project duration.
    SetProjectDuration {
        /// New duration.
        duration: ProjectDuration,
    },
    /// Drop stored targets outside the current duration.
    PruneHiddenTargets,
}

/// Applies any [`Mutation`] by dispatching to the matching operation.
pub fn apply<I: IdSource + ?Sized>(
    tree: &ResultsFramework,
    mutation: Mutation,
    ids: &mut I,
) -> Edit {
    match mutation {
        Mutation::AddObjective => add_objective(tree, ids),
        Mutation::RemoveObjective { objective } => remove_objective(tree, &objective),
        Mutation::UpdateObjective { objective, update } => {
            update_objective(tree, &objective, update)
        }
        Mutation::AddOutcome { objective } => add_outcome(tree, &objective, ids),
        Mutation::RemoveOutcome { objective, outcome } => {
            remove_outcome(tree, &objective, &outcome)
        }
        Mutation::UpdateOutcome {
            objective,
            outcome,
            update,
        } => update_outcome(tree, &objective, &outcome, update),
        Mutation::AddOutput { objective, outcome } => add_output(tree, &objective, &outcome, ids),
        Mutation::RemoveOutput {
            objective,
            outcome,
            output,
        } => remove_output(tree, &objective, &outcome, &output),
        Mutation::UpdateOutput {
            objective,
            outcome,
            output,
            update,
        } => update_output(tree, &objective, &outcome, &output, update),
        Mutation::AddIndicator { owner } => add_indicator(tree, &owner, ids),
        Mutation::RemoveIndicator { owner, indicator } => {
            remove_indicator(tree, &owner, &indicator)
        }
        Mutation::UpdateIndicator {
            owner,
            indicator,
            field,
        } => update_indicator(tree, &owner, &indicator, field),
        Mutation::SetProjectDuration { duration } => set_project_duration(tree, duration),
        Mutation::PruneHiddenTargets => prune_hidden_targets(tree),
    }
}

/// Appends an empty objective with a freshly minted id.
#[instrument(level = "debug", skip_all)]
pub fn add_objective<I: IdSource + ?Sized>(tree: &ResultsFramework, ids: &mut I) -> Edit {
    let id = mint(tree, ids);
    edit(tree, |next| {
        append(&mut next.objectives, Objective::new(id.clone()), Level::Objective)?;
        Ok(Some(id))
    })
}

/// Removes an objective together with its outcomes, outputs and indicators.
#[instrument(level = "debug", skip_all, fields(%objective))]
pub fn remove_objective(tree: &ResultsFramework, objective: &NodeId) -> Edit {
    edit(tree, |next| {
        remove_by_id(&mut next.objectives, objective, Level::Objective, |o| &o.id)?;
        Ok(None)
    })
}

/// Writes the supplied fields of an objective.
#[instrument(level = "debug", skip_all, fields(%objective))]
pub fn update_objective(tree: &ResultsFramework, objective: &NodeId, update: NodeUpdate) -> Edit {
    edit(tree, |next| {
        let node = objective_mut(next, objective)?;
        update.apply_to(&mut node.title, &mut node.description);
        Ok(None)
    })
}

/// Appends an empty outcome to an objective.
#[instrument(level = "debug", skip_all, fields(%objective))]
pub fn add_outcome<I: IdSource + ?Sized>(
    tree: &ResultsFramework,
    objective: &NodeId,
    ids: &mut I,
) -> Edit {
    let id = mint(tree, ids);
    edit(tree, |next| {
        let parent = objective_mut(next, objective)?;
        append(&mut parent.outcomes, Outcome::new(id.clone()), Level::Outcome)?;
        Ok(Some(id))
    })
}

/// Removes an outcome together with its outputs and indicators.
#[instrument(level = "debug", skip_all, fields(%objective, %outcome))]
pub fn remove_outcome(tree: &ResultsFramework, objective: &NodeId, outcome: &NodeId) -> Edit {
    edit(tree, |next| {
        let parent = objective_mut(next, objective)?;
        remove_by_id(&mut parent.outcomes, outcome, Level::Outcome, |o| &o.id)?;
        Ok(None)
    })
}

/// Writes the supplied fields of an outcome.
#[instrument(level = "debug", skip_all, fields(%objective, %outcome))]
pub fn update_outcome(
    tree: &ResultsFramework,
    objective: &NodeId,
    outcome: &NodeId,
    update: NodeUpdate,
) -> Edit {
    edit(tree, |next| {
        let node = outcome_mut(next, objective, outcome)?;
        update.apply_to(&mut node.title, &mut node.description);
        Ok(None)
    })
}

/// Appends an empty output to an outcome.
#[instrument(level = "debug", skip_all, fields(%objective, %outcome))]
pub fn add_output<I: IdSource + ?Sized>(
    tree: &ResultsFramework,
    objective: &NodeId,
    outcome: &NodeId,
    ids: &mut I,
) -> Edit {
    let id = mint(tree, ids);
    edit(tree, |next| {
        let parent = outcome_mut(next, objective, outcome)?;
        append(&mut parent.outputs, Output::new(id.clone()), Level::Output)?;
        Ok(Some(id))
    })
}

/// Removes an output together with its indicators.
#[instrument(level = "debug", skip_all, fields(%objective, %outcome, %output))]
pub fn remove_output(
    tree: &ResultsFramework,
    objective: &NodeId,
    outcome: &NodeId,
    output: &NodeId,
) -> Edit {
    edit(tree, |next| {
        let parent = outcome_mut(next, objective, outcome)?;
        remove_by_id(&mut parent.outputs, output, Level::Output, |o| &o.id)?;
        Ok(None)
    })
}

/// Writes the supplied fields of an output.
#[instrument(level = "debug", skip_all, fields(%objective, %outcome, %output))]
pub fn update_output(
    tree: &ResultsFramework,
    objective: &NodeId,
    outcome: &NodeId,
    output: &NodeId,
    update: NodeUpdate,
) -> Edit {
    edit(tree, |next| {
        let node = output_mut(next, objective, outcome, output)?;
        update.apply_to(&mut node.title, &mut node.description);
        Ok(None)
    })
}

/// Appends an empty indicator. Indicator lists are not capped.
#[instrument(level = "debug", skip(tree, ids))]
pub fn add_indicator<I: IdSource + ?Sized>(
    tree: &ResultsFramework,
    owner: &IndicatorOwner,
    ids: &mut I,
) -> Edit {
    let id = mint(tree, ids);
    edit(tree, |next| {
        indicators_mut(next, owner)?.push(Indicator::new(id.clone()));
        Ok(Some(id))
    })
}

/// Removes an indicator by id.
#[instrument(level = "debug", skip_all, fields(%indicator))]
pub fn remove_indicator(
    tree: &ResultsFramework,
    owner: &IndicatorOwner,
    indicator: &NodeId,
) -> Edit {
    edit(tree, |next| {
        let list = indicators_mut(next, owner)?;
        remove_by_id(list, indicator, Level::Indicator, |i| &i.id)?;
        Ok(None)
    })
}

/// Writes a single field of an indicator, leaving every other field and
/// every sibling untouched.
///
/// Targets can only be written for the year labels of the current project
/// duration.
#[instrument(level = "debug", skip_all, fields(%indicator, field = %field.path()))]
pub fn update_indicator(
    tree: &ResultsFramework,
    owner: &IndicatorOwner,
    indicator: &NodeId,
    field: IndicatorField,
) -> Edit {
    edit(tree, |next| {
        if let IndicatorField::Target { year, .. } = &field {
            let duration = next.project_duration;
            if !targets::labels_for(duration).contains(year) {
                return Err(EditError::TargetYearOutOfRange {
                    year: year.clone(),
                    duration,
                });
            }
        }
        let target = indicators_mut(next, owner)?
            .iter_mut()
            .find(|i| &i.id == indicator)
            .ok_or_else(|| not_found(Level::Indicator, indicator))?;
        field.apply_to(target);
        Ok(None)
    })
}

/// Resolves an indicator's position within its owner to its id.
///
/// # Errors
///
/// Returns an error if the owner path does not resolve or the position is
/// past the end of the list.
pub fn indicator_id_at(
    tree: &ResultsFramework,
    owner: &IndicatorOwner,
    position: usize,
) -> Result<NodeId, EditError> {
    let list = indicators(tree, owner)?;
    list.get(position)
        .map(|i| i.id.clone())
        .ok_or_else(|| EditError::PositionOutOfRange {
            position,
            len: list.len(),
        })
}

/// Looks up the indicator list of an outcome or output.
///
/// # Errors
///
/// Returns an error if any segment of the owner path does not resolve.
pub fn indicators<'a>(
    tree: &'a ResultsFramework,
    owner: &IndicatorOwner,
) -> Result<&'a [Indicator], EditError> {
    let (objective, outcome) = match owner {
        IndicatorOwner::Outcome { objective, outcome }
        | IndicatorOwner::Output {
            objective, outcome, ..
        } => (objective, outcome),
    };
    let outcome_node = tree
        .objective(objective)
        .ok_or_else(|| not_found(Level::Objective, objective))?
        .outcome(outcome)
        .ok_or_else(|| not_found(Level::Outcome, outcome))?;
    match owner {
        IndicatorOwner::Outcome { .. } => Ok(outcome_node.indicators()),
        IndicatorOwner::Output { output, .. } => outcome_node
            .output(output)
            .map(Output::indicators)
            .ok_or_else(|| not_found(Level::Output, output)),
    }
}

/// Changes the project duration.
///
/// Stored targets beyond the new duration are kept; they simply drop out of
/// the active matrix.
#[instrument(level = "debug", skip_all, fields(%duration))]
pub fn set_project_duration(tree: &ResultsFramework, duration: ProjectDuration) -> Edit {
    edit(tree, |next| {
        next.project_duration = duration;
        Ok(None)
    })
}

/// Deletes every stored target whose label is outside the current duration.
#[instrument(level = "debug", skip(tree))]
pub fn prune_hidden_targets(tree: &ResultsFramework) -> Edit {
    edit(tree, |next| {
        let duration = next.project_duration;
        for indicator in indicators_in_mut(next) {
            indicator
                .targets
                .retain(|label, _| targets::is_active(label, duration));
        }
        Ok(None)
    })
}

/// Runs `f` against a copy of `tree`. A failed edit discards the copy.
fn edit(
    tree: &ResultsFramework,
    f: impl FnOnce(&mut ResultsFramework) -> Result<Option<NodeId>, EditError>,
) -> Edit {
    let mut next = tree.clone();
    match f(&mut next) {
        Ok(created) => Edit {
            framework: next,
            status: EditStatus::Applied { created },
        },
        Err(e) => {
            tracing::debug!("edit rejected: {e}");
            Edit {
                framework: tree.clone(),
                status: EditStatus::Rejected(e),
            }
        }
    }
}

/// Draws ids until one is not already used in the tree.
fn mint<I: IdSource + ?Sized>(tree: &ResultsFramework, ids: &mut I) -> NodeId {
    loop {
        let id = ids.next_id();
        if !tree.contains_id(&id) {
            return id;
        }
        tracing::debug!("skipping id {id}: already present in the tree");
    }
}

fn append<T>(list: &mut Vec<T>, item: T, level: Level) -> Result<(), EditError> {
    match try_append(list, item, MAX_CHILDREN) {
        Appended::Accepted => Ok(()),
        Appended::Full(_) => Err(EditError::CapacityExceeded {
            level,
            cap: MAX_CHILDREN,
        }),
    }
}

fn remove_by_id<T>(
    list: &mut Vec<T>,
    id: &NodeId,
    level: Level,
    id_of: impl Fn(&T) -> &NodeId,
) -> Result<(), EditError> {
    let position = list
        .iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| not_found(level, id))?;
    list.remove(position);
    Ok(())
}

fn not_found(level: Level, id: &NodeId) -> EditError {
    EditError::NotFound {
        level,
        id: id.clone(),
    }
}

fn objective_mut<'a>(
    tree: &'a mut ResultsFramework,
    objective: &NodeId,
) -> Result<&'a mut Objective, EditError> {
    tree.objectives
        .iter_mut()
        .find(|o| &o.id == objective)
        .ok_or_else(|| not_found(Level::Objective, objective))
}

fn outcome_mut<'a>(
    tree: &'a mut ResultsFramework,
    objective: &NodeId,
    outcome: &NodeId,
) -> Result<&'a mut Outcome, EditError> {
    objective_mut(tree, objective)?
        .outcomes
        .iter_mut()
        .find(|o| &o.id == outcome)
        .ok_or_else(|| not_found(Level::Outcome, outcome))
}

fn output_mut<'a>(
    tree: &'a mut ResultsFramework,
    objective: &NodeId,
    outcome: &NodeId,
    output: &NodeId,
) -> Result<&'a mut Output, EditError> {
    outcome_mut(tree, objective, outcome)?
        .outputs
        .iter_mut()
        .find(|o| &o.id == output)
        .ok_or_else(|| not_found(Level::Output, output))
}

fn indicators_mut<'a>(
    tree: &'a mut ResultsFramework,
    owner: &IndicatorOwner,
) -> Result<&'a mut Vec<Indicator>, EditError> {
    match owner {
        IndicatorOwner::Outcome { objective, outcome } => {
            Ok(&mut outcome_mut(tree, objective, outcome)?.indicators)
        }
        IndicatorOwner::Output {
            objective,
            outcome,
            output,
        } => Ok(&mut output_mut(tree, objective, outcome, output)?.indicators),
    }
}

fn indicators_in_mut(tree: &mut ResultsFramework) -> impl Iterator<Item = &mut Indicator> {
    tree.objectives
        .iter_mut()
        .flat_map(|objective| objective.outcomes.iter_mut())
        .flat_map(|outcome| {
            outcome
                .indicators
                .iter_mut()
                .chain(outcome.outputs.iter_mut().flat_map(|o| o.indicators.iter_mut()))
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_case::test_case;

    use super::*;
    use crate::domain::id::SequentialIds;

    struct Fixture {
        ids: SequentialIds,
        tree: ResultsFramework,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ids: SequentialIds::new("n"),
                tree: ResultsFramework::default(),
            }
        }

        /// Applies a mutation, asserts it was accepted and returns any new id.
        fn apply(&mut self, mutation: Mutation) -> Option<NodeId> {
            let edit = apply(&self.tree, mutation, &mut self.ids);
            let (tree, result) = edit.into_parts();
            self.tree = tree;
            result.expect("edit should be applied")
        }

        fn objective(&mut self) -> NodeId {
            self.apply(Mutation::AddObjective).unwrap()
        }

        fn outcome(&mut self, objective: &NodeId) -> NodeId {
            self.apply(Mutation::AddOutcome {
                objective: objective.clone(),
            })
            .unwrap()
        }

        fn output(&mut self, objective: &NodeId, outcome: &NodeId) -> NodeId {
            self.apply(Mutation::AddOutput {
                objective: objective.clone(),
                outcome: outcome.clone(),
            })
            .unwrap()
        }

        fn indicator(&mut self, owner: &IndicatorOwner) -> NodeId {
            self.apply(Mutation::AddIndicator {
                owner: owner.clone(),
            })
            .unwrap()
        }

        /// objective → outcome → output, with one indicator on each of the
        /// outcome and the output.
        fn branch(&mut self) -> Branch {
            let objective = self.objective();
            let outcome = self.outcome(&objective);
            let output = self.output(&objective, &outcome);
            let outcome_owner = IndicatorOwner::Outcome {
                objective: objective.clone(),
                outcome: outcome.clone(),
            };
            let output_owner = IndicatorOwner::Output {
                objective: objective.clone(),
                outcome: outcome.clone(),
                output: output.clone(),
            };
            let outcome_indicator = self.indicator(&outcome_owner);
            let output_indicator = self.indicator(&output_owner);
            Branch {
                objective,
                outcome,
                output,
                outcome_owner,
                output_owner,
                outcome_indicator,
                output_indicator,
            }
        }
    }

    struct Branch {
        objective: NodeId,
        outcome: NodeId,
        output: NodeId,
        outcome_owner: IndicatorOwner,
        output_owner: IndicatorOwner,
        outcome_indicator: NodeId,
        output_indicator: NodeId,
    }

    #[test]
    fn two_objectives_have_distinct_ids_and_empty_titles() {
        let mut f = Fixture::new();
        let a = f.objective();
        let b = f.objective();

        assert_ne!(a, b);
        assert_eq!(f.tree.objectives().len(), 2);
        assert!(f.tree.objectives().iter().all(|o| o.title.is_empty()));
    }

    #[test]
    fn eleventh_outcome_is_rejected() {
        let mut f = Fixture::new();
        let objective = f.objective();
        f.objective();

        for _ in 0..10 {
            f.outcome(&objective);
        }
        let before = f.tree.clone();
        let edit = add_outcome(&f.tree, &objective, &mut f.ids);

        assert_eq!(
            edit.status,
            EditStatus::Rejected(EditError::CapacityExceeded {
                level: Level::Outcome,
                cap: 10
            })
        );
        assert_eq!(edit.framework, before);
        assert_eq!(edit.framework.objectives()[0].outcomes().len(), 10);
    }

    #[test]
    fn into_result_carries_the_next_tree() {
        let mut f = Fixture::new();
        let (tree, created) = add_objective(&f.tree, &mut f.ids).into_result().unwrap();
        assert_eq!(tree.objectives()[0].id(), created.as_ref().unwrap());

        let error = remove_objective(&tree, &NodeId::from("missing"))
            .into_result()
            .unwrap_err();
        assert_eq!(
            error,
            EditError::NotFound {
                level: Level::Objective,
                id: NodeId::from("missing"),
            }
        );
    }

    #[test]
    fn add_objective_at_cap_is_a_no_op() {
        let mut f = Fixture::new();
        for _ in 0..MAX_CHILDREN {
            f.objective();
        }
        let edit = add_objective(&f.tree, &mut f.ids);
        assert!(!edit.is_applied());
        assert_eq!(edit.framework, f.tree);
    }

    #[test]
    fn add_objective_mints_an_unused_id() {
        let mut f = Fixture::new();
        f.objective();
        f.objective();
        let existing: HashSet<NodeId> = f.tree.all_ids().into_iter().cloned().collect();

        let edit = add_objective(&f.tree, &mut f.ids);

        assert_eq!(edit.framework.objectives().len(), 3);
        let created = edit.created().unwrap();
        assert!(!existing.contains(created));
    }

    #[test]
    fn minting_skips_ids_already_in_the_tree() {
        let mut f = Fixture::new();
        let first = f.objective();
        assert_eq!(first.as_str(), "n-1");

        // A fresh counter would hand out n-1 again.
        let mut restarted = SequentialIds::new("n");
        let edit = add_objective(&f.tree, &mut restarted);
        assert_eq!(edit.created().map(NodeId::as_str), Some("n-2"));
    }

    #[test]
    fn update_objective_changes_only_the_title() {
        let mut f = Fixture::new();
        let first = f.branch();
        let second = f.branch();
        let before = f.tree.clone();

        let edit = update_objective(&f.tree, &second.objective, NodeUpdate::title("X"));
        assert!(edit.is_applied());

        let mut expected = before;
        expected.objectives[1].title = "X".to_string();
        assert_eq!(edit.framework, expected);
        assert_eq!(edit.framework.objectives()[0], f.tree.objectives()[0]);
        assert!(edit.framework.objective(&first.objective).unwrap().title.is_empty());
    }

    #[test]
    fn update_with_both_fields_writes_both() {
        let mut f = Fixture::new();
        let b = f.branch();
        let update = NodeUpdate {
            title: Some("T".into()),
            description: Some("D".into()),
        };
        f.apply(Mutation::UpdateOutput {
            objective: b.objective.clone(),
            outcome: b.outcome.clone(),
            output: b.output.clone(),
            update,
        });

        let output = f.tree.objectives()[0].outcomes()[0].output(&b.output).unwrap();
        assert_eq!(output.title, "T");
        assert_eq!(output.description, "D");
    }

    #[test]
    fn update_outcome_leaves_description() {
        let mut f = Fixture::new();
        let b = f.branch();
        f.apply(Mutation::UpdateOutcome {
            objective: b.objective.clone(),
            outcome: b.outcome.clone(),
            update: NodeUpdate::description("why"),
        });
        f.apply(Mutation::UpdateOutcome {
            objective: b.objective.clone(),
            outcome: b.outcome.clone(),
            update: NodeUpdate::title("what"),
        });

        let outcome = f.tree.objectives()[0].outcome(&b.outcome).unwrap();
        assert_eq!(outcome.title, "what");
        assert_eq!(outcome.description, "why");
    }

    #[test]
    fn remove_objective_removes_subtree() {
        let mut f = Fixture::new();
        let doomed = f.branch();
        let kept = f.branch();

        f.apply(Mutation::RemoveObjective {
            objective: doomed.objective.clone(),
        });

        let ids = f.tree.all_ids();
        for id in [
            &doomed.objective,
            &doomed.outcome,
            &doomed.output,
            &doomed.outcome_indicator,
            &doomed.output_indicator,
        ] {
            assert!(!ids.contains(id), "{id} should be gone");
        }
        assert!(ids.contains(&kept.output_indicator));
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn re_added_outcome_gets_a_new_id() {
        let mut f = Fixture::new();
        let objective = f.objective();
        let removed = f.outcome(&objective);
        f.apply(Mutation::UpdateOutcome {
            objective: objective.clone(),
            outcome: removed.clone(),
            update: NodeUpdate::title("Same"),
        });

        f.apply(Mutation::RemoveOutcome {
            objective: objective.clone(),
            outcome: removed.clone(),
        });
        let added = f.outcome(&objective);
        f.apply(Mutation::UpdateOutcome {
            objective: objective.clone(),
            outcome: added.clone(),
            update: NodeUpdate::title("Same"),
        });

        assert_ne!(added, removed);
    }

    #[test]
    fn missing_ids_are_no_ops() {
        let mut f = Fixture::new();
        let b = f.branch();
        let missing = NodeId::from("missing");

        let requests = [
            Mutation::RemoveObjective {
                objective: missing.clone(),
            },
            Mutation::AddOutcome {
                objective: missing.clone(),
            },
            Mutation::RemoveOutcome {
                objective: b.objective.clone(),
                outcome: missing.clone(),
            },
            Mutation::AddOutput {
                objective: missing.clone(),
                outcome: b.outcome.clone(),
            },
            Mutation::UpdateOutput {
                objective: b.objective.clone(),
                outcome: b.outcome.clone(),
                output: missing.clone(),
                update: NodeUpdate::title("x"),
            },
            Mutation::RemoveIndicator {
                owner: b.output_owner.clone(),
                indicator: b.outcome_indicator.clone(),
            },
            Mutation::UpdateIndicator {
                owner: b.outcome_owner.clone(),
                indicator: missing.clone(),
                field: IndicatorField::Comment("x".into()),
            },
        ];

        for request in requests {
            let edit = apply(&f.tree, request.clone(), &mut f.ids);
            assert!(
                matches!(edit.status, EditStatus::Rejected(EditError::NotFound { .. })),
                "{request:?} should be rejected"
            );
            assert_eq!(edit.framework, f.tree);
        }
    }

    #[test]
    fn indicators_attach_to_outcomes_and_outputs() {
        let mut f = Fixture::new();
        let b = f.branch();

        let outcome = f.tree.objectives()[0].outcome(&b.outcome).unwrap();
        assert_eq!(outcome.indicators().len(), 1);
        assert_eq!(outcome.indicators()[0].id(), &b.outcome_indicator);
        assert_eq!(
            outcome.output(&b.output).unwrap().indicators()[0].id(),
            &b.output_indicator
        );
    }

    #[test]
    fn indicator_lists_are_not_capped() {
        let mut f = Fixture::new();
        let b = f.branch();
        for _ in 0..15 {
            f.indicator(&b.outcome_owner);
        }
        assert_eq!(indicators(&f.tree, &b.outcome_owner).unwrap().len(), 16);
    }

    #[test]
    fn update_indicator_field_is_isolated() {
        let mut f = Fixture::new();
        let b = f.branch();
        let sibling = f.indicator(&b.output_owner);
        f.apply(Mutation::UpdateIndicator {
            owner: b.output_owner.clone(),
            indicator: b.output_indicator.clone(),
            field: IndicatorField::Comment("keep".into()),
        });
        let before = f.tree.clone();

        f.apply(Mutation::UpdateIndicator {
            owner: b.output_owner.clone(),
            indicator: b.output_indicator.clone(),
            field: IndicatorField::parse("dataCollection.source", "survey").unwrap(),
        });

        let list = indicators(&f.tree, &b.output_owner).unwrap();
        let updated = list.iter().find(|i| i.id() == &b.output_indicator).unwrap();
        assert_eq!(updated.data_collection.source, "survey");
        assert_eq!(updated.comment, "keep");

        let untouched = list.iter().find(|i| i.id() == &sibling).unwrap();
        let untouched_before = indicators(&before, &b.output_owner)
            .unwrap()
            .iter()
            .find(|i| i.id() == &sibling)
            .unwrap();
        assert_eq!(untouched, untouched_before);
        assert_eq!(
            indicators(&f.tree, &b.outcome_owner).unwrap(),
            indicators(&before, &b.outcome_owner).unwrap()
        );
    }

    #[test]
    fn remove_indicator_by_id_keeps_siblings_in_order() {
        let mut f = Fixture::new();
        let b = f.branch();
        let second = f.indicator(&b.outcome_owner);
        let third = f.indicator(&b.outcome_owner);

        f.apply(Mutation::RemoveIndicator {
            owner: b.outcome_owner.clone(),
            indicator: second,
        });

        let remaining: Vec<_> = indicators(&f.tree, &b.outcome_owner)
            .unwrap()
            .iter()
            .map(|i| i.id().clone())
            .collect();
        assert_eq!(remaining, [b.outcome_indicator, third]);
    }

    #[test]
    fn positions_resolve_to_indicator_ids() {
        let mut f = Fixture::new();
        let b = f.branch();
        let second = f.indicator(&b.outcome_owner);

        assert_eq!(indicator_id_at(&f.tree, &b.outcome_owner, 1), Ok(second));
        assert_eq!(
            indicator_id_at(&f.tree, &b.outcome_owner, 2),
            Err(EditError::PositionOutOfRange { position: 2, len: 2 })
        );
    }

    #[test_case("Year 4"; "beyond duration")]
    #[test_case("banana"; "not a year")]
    #[test_case("Year 01"; "non canonical label")]
    fn targets_outside_the_duration_are_rejected(year: &str) {
        let mut f = Fixture::new();
        let b = f.branch();
        f.apply(Mutation::SetProjectDuration {
            duration: ProjectDuration::try_from(2).unwrap(),
        });

        let edit = update_indicator(
            &f.tree,
            &b.outcome_owner,
            &b.outcome_indicator,
            IndicatorField::Target {
                year: year.into(),
                value: "9".into(),
            },
        );

        assert_eq!(
            edit.status,
            EditStatus::Rejected(EditError::TargetYearOutOfRange {
                year: year.into(),
                duration: ProjectDuration::try_from(2).unwrap(),
            })
        );
        assert_eq!(edit.framework, f.tree);
    }

    #[test]
    fn shrinking_duration_retains_hidden_targets() {
        let mut f = Fixture::new();
        let b = f.branch();
        f.apply(Mutation::SetProjectDuration {
            duration: ProjectDuration::try_from(3).unwrap(),
        });
        f.apply(Mutation::UpdateIndicator {
            owner: b.outcome_owner.clone(),
            indicator: b.outcome_indicator.clone(),
            field: IndicatorField::parse("targets.Year 3", "75").unwrap(),
        });

        f.apply(Mutation::SetProjectDuration {
            duration: ProjectDuration::MIN,
        });

        let indicator = &indicators(&f.tree, &b.outcome_owner).unwrap()[0];
        assert_eq!(indicator.target("Year 3"), Some("75"));
        let labels = targets::labels_for(f.tree.project_duration());
        assert!(
            targets::reconcile(indicator, &labels)
                .iter()
                .all(|cell| cell.label != "Year 3")
        );
    }

    #[test]
    fn pruning_drops_only_hidden_targets() {
        let mut f = Fixture::new();
        let b = f.branch();
        f.apply(Mutation::SetProjectDuration {
            duration: ProjectDuration::MAX,
        });
        for (owner, indicator) in [
            (&b.outcome_owner, &b.outcome_indicator),
            (&b.output_owner, &b.output_indicator),
        ] {
            for year in ["Year 1", "Year 4"] {
                f.apply(Mutation::UpdateIndicator {
                    owner: owner.clone(),
                    indicator: indicator.clone(),
                    field: IndicatorField::Target {
                        year: year.into(),
                        value: "1".into(),
                    },
                });
            }
        }
        f.apply(Mutation::SetProjectDuration {
            duration: ProjectDuration::try_from(2).unwrap(),
        });

        f.apply(Mutation::PruneHiddenTargets);

        for indicator in f.tree.indicators() {
            assert_eq!(indicator.targets.keys().collect::<Vec<_>>(), ["Year 1"]);
        }
    }

    #[test]
    fn mutations_serialize_with_an_op_tag() {
        let mutation = Mutation::UpdateIndicator {
            owner: IndicatorOwner::Outcome {
                objective: "a".into(),
                outcome: "b".into(),
            },
            indicator: "c".into(),
            field: IndicatorField::Baseline("10".into()),
        };
        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "op": "updateIndicator",
                "owner": { "level": "outcome", "objective": "a", "outcome": "b" },
                "indicator": "c",
                "field": { "field": "baseline", "value": "10" },
            })
        );
        let back: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(back, mutation);
    }
}
