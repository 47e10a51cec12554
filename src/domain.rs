//! Domain models for results frameworks.
//!
//! This module contains the framework tree, the mutation engine that edits
//! it, and the auxiliary pieces the engine is built from.

/// Identity generation for framework nodes.
pub mod id;
pub use id::{IdSource, NodeId, RandomIds, SequentialIds};

/// Capacity-limited appends for child collections.
pub mod bounded;

/// The framework tree: objectives, outcomes and outputs.
pub mod framework;
pub use framework::{Level, Objective, Outcome, Output, ProjectDuration, ResultsFramework};

/// Indicators and their typed field updates.
pub mod indicator;
pub use indicator::{CustomFrequency, DataCollection, Frequency, Indicator, IndicatorField};

/// Per-year target labels and display reconciliation.
pub mod targets;

/// Copy-on-write edit operations over the framework tree.
pub mod engine;
pub use engine::{Edit, EditError, EditStatus, IndicatorOwner, Mutation, NodeUpdate};

/// Reconstruction of well-formed trees from loosely typed input.
pub mod normalize;

/// View-only record of expanded nodes.
pub mod expansion;
pub use expansion::ExpansionState;

mod config;
pub use config::Config;
