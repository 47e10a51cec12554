//! Capacity-limited appends.
//!
//! Objectives, outcomes and outputs share the same cap. Reaching it is not
//! an error at this level: the append is declined and the item handed back.

/// Maximum number of children in any capped collection.
pub const MAX_CHILDREN: usize = 10;

/// Outcome of a [`try_append`].
#[derive(Debug, PartialEq, Eq)]
pub enum Appended<T> {
    /// The item was pushed onto the list.
    Accepted,
    /// The list was already full; the item is returned untouched.
    Full(T),
}

impl<T> Appended<T> {
    /// Whether the item made it into the list.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Append `item` to `list` unless it already holds `cap` or more items.
#[must_use]
pub fn try_append<T>(list: &mut Vec<T>, item: T, cap: usize) -> Appended<T> {
    if list.len() >= cap {
        Appended::Full(item)
    } else {
        list.push(item);
        Appended::Accepted
    }
}
