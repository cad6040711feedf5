//! Parsing of delimiter-joined group columns.

use crate::ids::GroupId;

/// Split a delimited group column into group IDs.
///
/// Fragments are trimmed and blank fragments are dropped, so `""` and
/// `"   "` both produce no groups. Order follows the source string.
/// An empty delimiter means the column holds a single group.
pub fn split_group_ids(raw: &str, delimiter: &str) -> Vec<GroupId> {
    if delimiter.is_empty() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![GroupId::from(trimmed)];
    }

    raw.split(delimiter)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(GroupId::from)
        .collect()
}
