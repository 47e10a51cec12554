use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{id::NodeId, targets};

/// A measurable metric attached to an outcome or an output.
///
/// Targets are a sparse map from year label (`"Year 1"`, `"Year 2"`, ...) to
/// a free-text value. Entries for years beyond the current project duration
/// are retained, just not displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub(crate) id: NodeId,
    /// What is being measured.
    pub description: String,
    /// Value at the start of the project.
    pub baseline: String,
    /// Unit the baseline is expressed in.
    pub baseline_unit: String,
    /// Unit the targets are expressed in.
    pub target_unit: String,
    /// Per-year target values keyed by year label.
    pub targets: BTreeMap<String, String>,
    /// How progress is monitored.
    pub monitoring_method: String,
    /// Where, how often and how finely data is collected.
    pub data_collection: DataCollection,
    /// Free-text remarks.
    pub comment: String,
}

impl Indicator {
    /// An indicator with every field empty.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            description: String::new(),
            baseline: String::new(),
            baseline_unit: String::new(),
            target_unit: String::new(),
            targets: BTreeMap::new(),
            monitoring_method: String::new(),
            data_collection: DataCollection::default(),
            comment: String::new(),
        }
    }

    /// The unique, stable identifier of this indicator.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// The stored target for `label`, if one has been written.
    #[must_use]
    pub fn target(&self, label: &str) -> Option<&str> {
        self.targets.get(label).map(String::as_str)
    }
}

/// Data collection plan for an indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCollection {
    /// How often data is collected.
    pub frequency: Frequency,
    /// Where the data comes from.
    pub source: String,
    /// Dimensions the data is broken down by (age, gender, location, ...).
    pub disaggregation: String,
}

/// Data collection frequency.
///
/// Serialized as a plain string. Parsing is case-insensitive and unknown
/// values are preserved verbatim in [`Frequency::Other`]. A known name always
/// parses to its own variant, so `Other` never holds one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    /// No frequency chosen yet (the empty string).
    #[default]
    Unspecified,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
    /// Every three months.
    Quarterly,
    /// Twice a year.
    Biannually,
    /// Once a year.
    Annually,
    /// Any other value, kept as written.
    Other(CustomFrequency),
}

/// A frequency that is not one of the named variants.
///
/// Only produced by parsing, which sends every known name to its own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomFrequency(String);

impl CustomFrequency {
    /// The value as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Frequency {
    /// The canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unspecified => "",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Biannually => "Biannually",
            Self::Annually => "Annually",
            Self::Other(other) => other.as_str(),
        }
    }
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => Self::Unspecified,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "quarterly" => Self::Quarterly,
            "biannually" | "biannual" | "semi-annually" => Self::Biannually,
            "annually" | "annual" | "yearly" => Self::Annually,
            _ => Self::Other(CustomFrequency(value)),
        }
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        match value {
            Frequency::Other(CustomFrequency(other)) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Frequency {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-field update to an indicator.
///
/// Each variant names exactly one writable field, so every valid update
/// target is known at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum IndicatorField {
    /// Replace the description.
    Description(String),
    /// Replace the baseline value.
    Baseline(String),
    /// Replace the baseline unit.
    BaselineUnit(String),
    /// Replace the target unit.
    TargetUnit(String),
    /// Replace the monitoring method.
    MonitoringMethod(String),
    /// Replace the comment.
    Comment(String),
    /// Replace the data collection frequency.
    Frequency(Frequency),
    /// Replace the data source.
    Source(String),
    /// Replace the disaggregation.
    Disaggregation(String),
    /// Write the target for one year, creating the entry if needed.
    Target {
        /// Year label, e.g. `"Year 2"`.
        year: String,
        /// Target value.
        value: String,
    },
}

/// Error returned when a field path does not name an indicator field.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldPathError {
    /// The path does not match any field.
    #[error("unknown indicator field '{0}'")]
    UnknownField(String),
    /// A `targets.` path whose year label is not of the form `Year N`.
    #[error("invalid target year '{0}': expected a label like 'Year 1'")]
    InvalidYear(String),
}

impl IndicatorField {
    /// Build an update from a dotted field path such as `baseline`,
    /// `dataCollection.frequency` or `targets.Year 2`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not name an indicator field, or if
    /// a target path does not carry a valid year label.
    pub fn parse(path: &str, value: impl Into<String>) -> Result<Self, FieldPathError> {
        let value = value.into();
        if let Some(year) = path.strip_prefix("targets.") {
            if targets::year_number(year).is_none() {
                return Err(FieldPathError::InvalidYear(year.to_string()));
            }
            return Ok(Self::Target {
                year: year.to_string(),
                value,
            });
        }

        let field = match path {
            "description" => Self::Description(value),
            "baseline" => Self::Baseline(value),
            "baselineUnit" => Self::BaselineUnit(value),
            "targetUnit" => Self::TargetUnit(value),
            "monitoringMethod" => Self::MonitoringMethod(value),
            "comment" => Self::Comment(value),
            "dataCollection.frequency" => Self::Frequency(Frequency::from(value)),
            "dataCollection.source" => Self::Source(value),
            "dataCollection.disaggregation" => Self::Disaggregation(value),
            other => return Err(FieldPathError::UnknownField(other.to_string())),
        };
        Ok(field)
    }

    /// The dotted path of the field this update writes.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Description(_) => "description".to_string(),
            Self::Baseline(_) => "baseline".to_string(),
            Self::BaselineUnit(_) => "baselineUnit".to_string(),
            Self::TargetUnit(_) => "targetUnit".to_string(),
            Self::MonitoringMethod(_) => "monitoringMethod".to_string(),
            Self::Comment(_) => "comment".to_string(),
            Self::Frequency(_) => "dataCollection.frequency".to_string(),
            Self::Source(_) => "dataCollection.source".to_string(),
            Self::Disaggregation(_) => "dataCollection.disaggregation".to_string(),
            Self::Target { year, .. } => format!("targets.{year}"),
        }
    }

    pub(crate) fn apply_to(self, indicator: &mut Indicator) {
        match self {
            Self::Description(v) => indicator.description = v,
            Self::Baseline(v) => indicator.baseline = v,
            Self::BaselineUnit(v) => indicator.baseline_unit = v,
            Self::TargetUnit(v) => indicator.target_unit = v,
            Self::MonitoringMethod(v) => indicator.monitoring_method = v,
            Self::Comment(v) => indicator.comment = v,
            Self::Frequency(v) => indicator.data_collection.frequency = v,
            Self::Source(v) => indicator.data_collection.source = v,
            Self::Disaggregation(v) => indicator.data_collection.disaggregation = v,
            Self::Target { year, value } => {
                indicator.targets.insert(year, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("baseline", "baseline"; "top level")]
    #[test_case("dataCollection.frequency", "dataCollection.frequency"; "data collection")]
    #[test_case("targets.Year 2", "targets.Year 2"; "target")]
    fn parse_then_path(path: &str, expected: &str) {
        let field = IndicatorField::parse(path, "x").unwrap();
        assert_eq!(field.path(), expected);
    }

    #[test]
    fn parse_rejects_unknown_field() {
        assert_eq!(
            IndicatorField::parse("budget", "1"),
            Err(FieldPathError::UnknownField("budget".to_string()))
        );
    }

    #[test]
    fn parse_rejects_bad_year() {
        assert_eq!(
            IndicatorField::parse("targets.2025", "1"),
            Err(FieldPathError::InvalidYear("2025".to_string()))
        );
    }

    #[test]
    fn apply_touches_only_the_named_field() {
        let mut indicator = Indicator::new(NodeId::from("i"));
        indicator.comment = "keep".to_string();

        IndicatorField::Source("survey".to_string()).apply_to(&mut indicator);

        assert_eq!(indicator.data_collection.source, "survey");
        assert_eq!(indicator.comment, "keep");
        assert_eq!(indicator.data_collection.frequency, Frequency::Unspecified);
    }

    #[test]
    fn target_update_creates_entry() {
        let mut indicator = Indicator::new(NodeId::from("i"));
        IndicatorField::parse("targets.Year 3", "40%")
            .unwrap()
            .apply_to(&mut indicator);
        assert_eq!(indicator.target("Year 3"), Some("40%"));
        assert_eq!(indicator.targets.len(), 1);
    }

    #[test_case("Monthly", Frequency::Monthly; "canonical")]
    #[test_case("QUARTERLY", Frequency::Quarterly; "upper case")]
    #[test_case("", Frequency::Unspecified; "empty")]
    fn frequency_parsing(input: &str, expected: Frequency) {
        assert_eq!(input.parse::<Frequency>().unwrap(), expected);
    }

    #[test]
    fn unknown_frequency_is_kept_verbatim() {
        let frequency = Frequency::from("Fortnightly".to_string());
        let Frequency::Other(custom) = &frequency else {
            panic!("expected a custom frequency, got {frequency:?}");
        };
        assert_eq!(custom.as_str(), "Fortnightly");
        assert_eq!(frequency.to_string(), "Fortnightly");
    }

    #[test]
    fn unknown_frequency_survives_serialization() {
        let frequency = Frequency::from("Fortnightly".to_string());
        let json = serde_json::to_string(&frequency).unwrap();
        assert_eq!(json, "\"Fortnightly\"");
        let back: Frequency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frequency);
    }

    #[test_case("Weekly", Frequency::Weekly; "canonical")]
    #[test_case(" weekly ", Frequency::Weekly; "padded lower case")]
    #[test_case("yearly", Frequency::Annually; "alias")]
    fn known_names_never_become_custom(input: &str, expected: Frequency) {
        let frequency = Frequency::from(input.to_string());
        assert_eq!(frequency, expected);

        let json = serde_json::to_string(&frequency).unwrap();
        let back: Frequency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frequency);
    }

    #[test]
    fn indicator_uses_camel_case_keys() {
        let value = serde_json::to_value(Indicator::new(NodeId::from("i"))).unwrap();
        assert!(value.get("baselineUnit").is_some());
        assert!(value.get("dataCollection").is_some());
        assert!(value["dataCollection"].get("disaggregation").is_some());
    }
}
