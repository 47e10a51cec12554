//! Reconstruction of well-formed frameworks from loosely typed input.
//!
//! Data freshly loaded from storage may be partial, may come from an older
//! shape of the document, or may have been edited by hand. [`normalize`]
//! accepts any JSON value and always produces a valid [`ResultsFramework`]:
//! missing pieces are filled with defaults and never cause the load to be
//! rejected. This is the only place defaults are applied; the mutation
//! engine assumes its input is well formed.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::domain::{
    bounded::MAX_CHILDREN,
    framework::{Objective, Outcome, Output, ProjectDuration, ResultsFramework},
    id::{IdSource, NodeId},
    indicator::{DataCollection, Frequency, Indicator},
};

/// Error returned when text cannot be parsed as JSON at all.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse results framework: {0}")]
pub struct LoadError(#[from] serde_json::Error);

/// Parses `text` as JSON and normalizes the result.
///
/// # Errors
///
/// Returns an error only if `text` is not valid JSON. Structurally
/// incomplete documents are repaired, not rejected.
pub fn from_json_str<I: IdSource + ?Sized>(
    text: &str,
    ids: &mut I,
) -> Result<ResultsFramework, LoadError> {
    let raw: Value = serde_json::from_str(text)?;
    Ok(normalize(&raw, ids))
}

/// Serializes a framework to its plain JSON form.
///
/// # Panics
///
/// Panics if serialization fails, which cannot happen for this data
/// structure.
#[must_use]
pub fn to_json_value(framework: &ResultsFramework) -> Value {
    serde_json::to_value(framework).expect("this must never fail")
}

/// Builds a well-formed framework from any JSON value.
///
/// - missing `objectives` become an empty list
/// - a missing `projectDuration` becomes 1; out-of-range values are clamped
/// - objectives, outcomes, outputs and indicators without an id (or with an
///   id already used earlier in the document) get a freshly minted one;
///   minted ids never collide with any id written in the input
/// - missing nested lists become empty lists; capped lists are truncated to
///   their cap
/// - missing text fields become empty strings
/// - a missing `dataCollection` becomes an all-empty record
#[must_use]
pub fn normalize<I: IdSource + ?Sized>(raw: &Value, ids: &mut I) -> ResultsFramework {
    let root = record(raw);
    let mut gate = Gate {
        ids,
        seen: HashSet::new(),
        stored: stored_ids(root),
    };

    let objectives = capped(root, "objectives")
        .iter()
        .map(|raw| gate.objective(record(raw)))
        .collect();

    ResultsFramework {
        objectives,
        project_duration: duration(root.get("projectDuration")),
    }
}

struct Gate<'a, I: ?Sized> {
    ids: &'a mut I,
    seen: HashSet<NodeId>,
    stored: HashSet<NodeId>,
}

impl<I: IdSource + ?Sized> Gate<'_, I> {
    fn objective(&mut self, raw: &Map<String, Value>) -> Objective {
        let mut objective = Objective::new(self.id(raw));
        objective.title = text(raw, "title");
        objective.description = text(raw, "description");
        objective.outcomes = capped(raw, "outcomes")
            .iter()
            .map(|raw| self.outcome(record(raw)))
            .collect();
        objective
    }

    fn outcome(&mut self, raw: &Map<String, Value>) -> Outcome {
        let mut outcome = Outcome::new(self.id(raw));
        outcome.title = text(raw, "title");
        outcome.description = text(raw, "description");
        outcome.indicators = self.indicators(raw);
        outcome.outputs = capped(raw, "outputs")
            .iter()
            .map(|raw| self.output(record(raw)))
            .collect();
        outcome
    }

    fn output(&mut self, raw: &Map<String, Value>) -> Output {
        let mut output = Output::new(self.id(raw));
        output.title = text(raw, "title");
        output.description = text(raw, "description");
        output.indicators = self.indicators(raw);
        output
    }

    fn indicators(&mut self, raw: &Map<String, Value>) -> Vec<Indicator> {
        list(raw, "indicators")
            .iter()
            .map(|raw| self.indicator(record(raw)))
            .collect()
    }

    fn indicator(&mut self, raw: &Map<String, Value>) -> Indicator {
        let mut indicator = Indicator::new(self.id(raw));
        indicator.description = text(raw, "description");
        indicator.baseline = text(raw, "baseline");
        indicator.baseline_unit = text(raw, "baselineUnit");
        indicator.target_unit = text(raw, "targetUnit");
        indicator.targets = target_map(raw.get("targets"));
        indicator.monitoring_method = text(raw, "monitoringMethod");
        indicator.data_collection = data_collection(raw.get("dataCollection"));
        indicator.comment = text(raw, "comment");
        indicator
    }

    /// The record's own id if it has a usable, unused one, otherwise a
    /// fresh one.
    fn id(&mut self, raw: &Map<String, Value>) -> NodeId {
        let existing = text(raw, "id");
        if !existing.is_empty() {
            let id = NodeId::from(existing);
            if self.seen.insert(id.clone()) {
                return id;
            }
            tracing::warn!("duplicate id {id} in loaded framework, minting a new one");
        }

        loop {
            let id = self.ids.next_id();
            if !self.stored.contains(&id) && self.seen.insert(id.clone()) {
                tracing::debug!("minted id {id} for record without one");
                return id;
            }
        }
    }
}

/// Every id written in the input, at any level, whether or not it survives
/// truncation or deduplication.
fn stored_ids(root: &Map<String, Value>) -> HashSet<NodeId> {
    fn collect(raw: &Map<String, Value>, ids: &mut HashSet<NodeId>) {
        let id = text(raw, "id");
        if !id.is_empty() {
            ids.insert(NodeId::from(id));
        }
        for key in ["outcomes", "outputs", "indicators"] {
            for child in list(raw, key) {
                collect(record(child), ids);
            }
        }
    }

    let mut ids = HashSet::new();
    for objective in list(root, "objectives") {
        collect(record(objective), &mut ids);
    }
    ids
}

/// Non-object entries are treated as empty records.
fn record(value: &Value) -> &Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    value
        .as_object()
        .unwrap_or_else(|| EMPTY.get_or_init(Map::new))
}

fn list<'a>(raw: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    raw.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn capped<'a>(raw: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    let items = list(raw, key);
    if items.len() > MAX_CHILDREN {
        tracing::warn!(
            "dropping {} of {} {key}: at most {MAX_CHILDREN} are allowed",
            items.len() - MAX_CHILDREN,
            items.len()
        );
        &items[..MAX_CHILDREN]
    } else {
        items
    }
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn text(raw: &Map<String, Value>, key: &str) -> String {
    scalar(raw.get(key))
}

fn target_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|targets| {
            targets
                .iter()
                .map(|(label, value)| (label.clone(), scalar(Some(value))))
                .collect()
        })
        .unwrap_or_default()
}

fn data_collection(value: Option<&Value>) -> DataCollection {
    let Some(raw) = value.and_then(Value::as_object) else {
        return DataCollection::default();
    };
    DataCollection {
        frequency: Frequency::from(text(raw, "frequency")),
        source: text(raw, "source"),
        disaggregation: text(raw, "disaggregation"),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn duration(value: Option<&Value>) -> ProjectDuration {
    let years = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    let Some(years) = years else {
        return ProjectDuration::default();
    };
    let duration = ProjectDuration::clamped(years);
    if i64::from(duration.get()) != years {
        tracing::warn!("project duration {years} out of range, using {duration}");
    }
    duration
}
