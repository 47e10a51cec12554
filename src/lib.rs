//! Results Framework editing engine
//!
//! A results framework is a bounded hierarchy of objectives, outcomes,
//! outputs and indicators describing a project's monitoring plan.

pub mod domain;
pub use domain::{
    Config, DataCollection, Edit, EditError, EditStatus, ExpansionState, Frequency, IdSource,
    Indicator, IndicatorField, IndicatorOwner, Level, Mutation, NodeId, NodeUpdate, Objective,
    Outcome, Output, ProjectDuration, RandomIds, ResultsFramework, SequentialIds,
};

/// Host-side collaborators: project documents and the editing workspace.
pub mod storage;
pub use storage::{JsonFile, Persist, PersistError, ProjectDocument, Workspace};
