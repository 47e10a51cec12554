//! Target matrix derivation.
//!
//! The columns of an indicator's target matrix are the year labels
//! `"Year 1"..="Year N"` for the current project duration. Stored targets
//! are sparse; reconciling fills the gaps with placeholders for display
//! without writing anything back.

use crate::domain::{framework::ProjectDuration, indicator::Indicator};

const LABEL_PREFIX: &str = "Year ";

/// The ordered year labels for a project of the given duration.
#[must_use]
pub fn labels_for(duration: ProjectDuration) -> Vec<String> {
    (1..=duration.get()).map(label).collect()
}

/// The label for a one-based year number.
#[must_use]
pub fn label(year: u8) -> String {
    format!("{LABEL_PREFIX}{year}")
}

/// Parses a `"Year N"` label into `N`.
///
/// Returns `None` for anything else, including `"Year 0"`.
#[must_use]
pub fn year_number(label: &str) -> Option<u8> {
    let n: u8 = label.strip_prefix(LABEL_PREFIX)?.parse().ok()?;
    (n > 0).then_some(n)
}

/// One column of a reconciled target matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetCell<'a> {
    /// The year label.
    pub label: &'a str,
    /// The stored value, or `None` where the cell is a placeholder.
    pub value: Option<&'a str>,
}

impl TargetCell<'_> {
    /// The value to display, with placeholders shown as the empty string.
    #[must_use]
    pub fn display_value(&self) -> &str {
        self.value.unwrap_or_default()
    }
}

/// Lines up an indicator's stored targets against `labels`.
///
/// Every label yields exactly one cell, in order. Stored entries whose label
/// is not in `labels` are left out.
#[must_use]
pub fn reconcile<'a>(indicator: &'a Indicator, labels: &'a [String]) -> Vec<TargetCell<'a>> {
    labels
        .iter()
        .map(|label| TargetCell {
            label,
            value: indicator.target(label),
        })
        .collect()
}

/// Stored target entries that fall outside the active matrix.
#[must_use]
pub fn hidden_targets(indicator: &Indicator, duration: ProjectDuration) -> Vec<(&str, &str)> {
    indicator
        .targets
        .iter()
        .filter(|(label, _)| !is_active(label, duration))
        .map(|(label, value)| (label.as_str(), value.as_str()))
        .collect()
}

/// Whether `label` is a column of the matrix for `duration`.
#[must_use]
pub fn is_active(label: &str, duration: ProjectDuration) -> bool {
    year_number(label).is_some_and(|n| n <= duration.get())
}
