//! The results framework tree.
//!
//! A [`ResultsFramework`] owns its objectives, which own their outcomes,
//! which own their outputs. Outcomes and outputs each own a list of
//! indicators. There are no shared or back references.
//!
//! Collections are only modified through the mutation engine, which keeps
//! them within their caps and keeps every id unique.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::domain::{id::NodeId, indicator::Indicator};

/// Length of the project in years. Always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ProjectDuration(u8);

impl ProjectDuration {
    /// The shortest allowed duration.
    pub const MIN: Self = Self(1);
    /// The longest allowed duration.
    pub const MAX: Self = Self(5);

    /// The number of years.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Forces `years` into the allowed range.
    #[must_use]
    pub fn clamped(years: i64) -> Self {
        let years = years.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        Self(u8::try_from(years).unwrap_or(Self::MIN.0))
    }
}

impl Default for ProjectDuration {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for ProjectDuration {
    type Error = InvalidDuration;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidDuration(value))
        }
    }
}

impl From<ProjectDuration> for u8 {
    fn from(value: ProjectDuration) -> Self {
        value.0
    }
}

impl fmt::Display for ProjectDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned for a project duration outside `1..=5`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid project duration {0}: must be between 1 and 5 years")]
pub struct InvalidDuration(pub u8);

/// The four levels of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Top-level goal.
    Objective,
    /// Intermediate result under an objective.
    Outcome,
    /// Concrete deliverable under an outcome.
    Output,
    /// Measurable metric on an outcome or output.
    Indicator,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Objective => write!(f, "objective"),
            Self::Outcome => write!(f, "outcome"),
            Self::Output => write!(f, "output"),
            Self::Indicator => write!(f, "indicator"),
        }
    }
}

/// A project's monitoring and evaluation plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsFramework {
    pub(crate) objectives: Vec<Objective>,
    pub(crate) project_duration: ProjectDuration,
}

impl ResultsFramework {
    /// An empty framework for a project of the given duration.
    #[must_use]
    pub const fn new(project_duration: ProjectDuration) -> Self {
        Self {
            objectives: Vec::new(),
            project_duration,
        }
    }

    /// The objectives, in order.
    #[must_use]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// The project duration.
    #[must_use]
    pub const fn project_duration(&self) -> ProjectDuration {
        self.project_duration
    }

    /// Finds an objective by id.
    #[must_use]
    pub fn objective(&self, id: &NodeId) -> Option<&Objective> {
        self.objectives.iter().find(|o| &o.id == id)
    }

    /// Every id in the tree, at every level.
    #[must_use]
    pub fn all_ids(&self) -> HashSet<&NodeId> {
        let mut ids = HashSet::new();
        for objective in &self.objectives {
            ids.insert(&objective.id);
            for outcome in &objective.outcomes {
                ids.insert(&outcome.id);
                ids.extend(outcome.indicators.iter().map(Indicator::id));
                for output in &outcome.outputs {
                    ids.insert(&output.id);
                    ids.extend(output.indicators.iter().map(Indicator::id));
                }
            }
        }
        ids
    }

    /// Whether `id` names any node in the tree.
    #[must_use]
    pub fn contains_id(&self, id: &NodeId) -> bool {
        self.objectives.iter().any(|objective| {
            objective.id == *id
                || objective.outcomes.iter().any(|outcome| {
                    outcome.id == *id
                        || outcome.indicators.iter().any(|i| i.id == *id)
                        || outcome.outputs.iter().any(|output| {
                            output.id == *id || output.indicators.iter().any(|i| i.id == *id)
                        })
                })
        })
    }

    /// Every indicator in the tree, depth first.
    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> {
        self.objectives
            .iter()
            .flat_map(|objective| &objective.outcomes)
            .flat_map(|outcome| {
                outcome
                    .indicators
                    .iter()
                    .chain(outcome.outputs.iter().flat_map(|o| &o.indicators))
            })
    }
}

/// A top-level goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub(crate) id: NodeId,
    /// Short name.
    pub title: String,
    /// Longer explanation.
    pub description: String,
    pub(crate) outcomes: Vec<Outcome>,
}

impl Objective {
    /// An objective with empty text and no outcomes.
    #[must_use]
    pub const fn new(id: NodeId) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            outcomes: Vec::new(),
        }
    }

    /// The unique, stable identifier of this objective.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// The outcomes, in order.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Finds an outcome by id.
    #[must_use]
    pub fn outcome(&self, id: &NodeId) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| &o.id == id)
    }
}

/// An intermediate result under an objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub(crate) id: NodeId,
    /// Short name.
    pub title: String,
    /// Longer explanation.
    pub description: String,
    pub(crate) indicators: Vec<Indicator>,
    pub(crate) outputs: Vec<Output>,
}

impl Outcome {
    /// An outcome with empty text, no indicators and no outputs.
    #[must_use]
    pub const fn new(id: NodeId) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            indicators: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// The unique, stable identifier of this outcome.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Indicators attached directly to the outcome.
    #[must_use]
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    /// The outputs, in order.
    #[must_use]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Finds an output by id.
    #[must_use]
    pub fn output(&self, id: &NodeId) -> Option<&Output> {
        self.outputs.iter().find(|o| &o.id == id)
    }
}

/// A concrete deliverable under an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub(crate) id: NodeId,
    /// Short name.
    pub title: String,
    /// Longer explanation.
    pub description: String,
    pub(crate) indicators: Vec<Indicator>,
}

impl Output {
    /// An output with empty text and no indicators.
    #[must_use]
    pub const fn new(id: NodeId) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            indicators: Vec::new(),
        }
    }

    /// The unique, stable identifier of this output.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Indicators attached to the output.
    #[must_use]
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0, false; "zero")]
    #[test_case(1, true; "min")]
    #[test_case(5, true; "max")]
    #[test_case(6, false; "too long")]
    fn duration_bounds(years: u8, valid: bool) {
        assert_eq!(ProjectDuration::try_from(years).is_ok(), valid);
    }

    #[test_case(-3, 1; "negative")]
    #[test_case(3, 3; "in range")]
    #[test_case(40, 5; "too long")]
    fn duration_clamping(years: i64, expected: u8) {
        assert_eq!(ProjectDuration::clamped(years).get(), expected);
    }

    #[test]
    fn duration_deserialization_is_validated() {
        assert!(serde_json::from_str::<ProjectDuration>("3").is_ok());
        assert!(serde_json::from_str::<ProjectDuration>("9").is_err());
    }

    #[test]
    fn empty_framework_serializes_with_camel_case() {
        let json = serde_json::to_value(ResultsFramework::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "objectives": [], "projectDuration": 1 })
        );
    }

    #[test]
    fn ids_are_collected_from_every_level() {
        let mut output = Output::new(NodeId::from("out"));
        output.indicators.push(Indicator::new(NodeId::from("i2")));
        let mut outcome = Outcome::new(NodeId::from("oc"));
        outcome.indicators.push(Indicator::new(NodeId::from("i1")));
        outcome.outputs.push(output);
        let mut objective = Objective::new(NodeId::from("ob"));
        objective.outcomes.push(outcome);
        let framework = ResultsFramework {
            objectives: vec![objective],
            project_duration: ProjectDuration::default(),
        };

        let ids: Vec<&str> = {
            let mut ids: Vec<_> = framework.all_ids().into_iter().map(NodeId::as_str).collect();
            ids.sort_unstable();
            ids
        };
        assert_eq!(ids, ["i1", "i2", "ob", "oc", "out"]);
        assert!(framework.contains_id(&NodeId::from("i2")));
        assert!(!framework.contains_id(&NodeId::from("missing")));
        assert_eq!(framework.indicators().count(), 2);
    }
}
