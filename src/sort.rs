//! Sort orders shared by the directory and favorites screens.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

/// How a podcast list is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    TitleAsc,
    TitleDesc,
    /// Most recently updated first.
    UpdatedRecent,
    /// Least recently updated first.
    UpdatedOldest,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::TitleAsc,
        SortOrder::TitleDesc,
        SortOrder::UpdatedRecent,
        SortOrder::UpdatedOldest,
    ];

    /// The next order in the selector.
    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    /// Stable in-place sort keyed by a title and an optional update time.
    pub fn sort_by_keys<T>(
        self,
        items: &mut [T],
        title: impl Fn(&T) -> &str,
        updated: impl Fn(&T) -> Option<DateTime<Utc>>,
    ) {
        match self {
            SortOrder::TitleAsc => items.sort_by(|a, b| compare_titles(title(a), title(b))),
            SortOrder::TitleDesc => items.sort_by(|a, b| compare_titles(title(b), title(a))),
            SortOrder::UpdatedRecent => {
                items.sort_by(|a, b| compare_dates(updated(b), updated(a), true))
            }
            SortOrder::UpdatedOldest => {
                items.sort_by(|a, b| compare_dates(updated(a), updated(b), false))
            }
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortOrder::TitleAsc => "Title A-Z",
            SortOrder::TitleDesc => "Title Z-A",
            SortOrder::UpdatedRecent => "Most Recently Updated",
            SortOrder::UpdatedOldest => "Oldest Updated",
        };
        f.write_str(label)
    }
}

/// Case-insensitive comparison with a case-sensitive tiebreak.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Compare dates; `None` sorts last whichever direction the caller wants.
///
/// `reversed` is set when the caller has swapped the operands for a
/// descending sort.
fn compare_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, reversed: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) if reversed => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) if reversed => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}
