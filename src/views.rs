//! Read-only projections over a collection snapshot
//!
//! Everything a listing UI derives from the collection: the tag index
//! feeding the filter dropdown, search filtering, sort orders, and the
//! stats shown on the options page. None of these touch storage.

use crate::model::PackageFavorite;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Name,
}

/// Collection statistics for the options page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub package_count: usize,
    pub tag_count: usize,
    /// Approximate serialized size of the collection in bytes
    pub approx_bytes: usize,
}

/// Sorted union of all tags across the collection
pub fn tag_index(collection: &[PackageFavorite]) -> BTreeSet<String> {
    collection
        .iter()
        .flat_map(|record| record.tags.iter().cloned())
        .collect()
}

/// Filter by search term and tag.
///
/// A record matches when the term (case-insensitive) occurs in its
/// name, description, or note, AND the tag filter (exact) is among its
/// tags. Empty term or tag matches everything.
pub fn filter(
    collection: &[PackageFavorite],
    search_term: &str,
    tag_filter: &str,
) -> Vec<PackageFavorite> {
    let term = search_term.to_lowercase();

    collection
        .iter()
        .filter(|record| {
            let matches_search = term.is_empty()
                || record.name.to_lowercase().contains(&term)
                || record.description.to_lowercase().contains(&term)
                || record
                    .note
                    .as_deref()
                    .is_some_and(|note| note.to_lowercase().contains(&term));

            let matches_tag =
                tag_filter.is_empty() || record.tags.iter().any(|tag| tag == tag_filter);

            matches_search && matches_tag
        })
        .cloned()
        .collect()
}

/// Sort a collection snapshot. Stable: ties keep their prior relative
/// order. Missing `savedAt` sorts as 0.
pub fn sort(collection: &[PackageFavorite], order: SortOrder) -> Vec<PackageFavorite> {
    let mut sorted = collection.to_vec();
    match order {
        SortOrder::Newest => {
            sorted.sort_by_key(|record| std::cmp::Reverse(record.saved_at.unwrap_or(0)));
        }
        SortOrder::Oldest => {
            sorted.sort_by_key(|record| record.saved_at.unwrap_or(0));
        }
        SortOrder::Name => {
            // Case-folded comparison stands in for locale collation
            sorted.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
    }
    sorted
}

pub fn stats(collection: &[PackageFavorite]) -> CollectionStats {
    let approx_bytes = serde_json::to_vec(collection).map(|b| b.len()).unwrap_or(0);
    CollectionStats {
        package_count: collection.len(),
        tag_count: tag_index(collection).len(),
        approx_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UNTAGGED_TAG;

    fn record(name: &str, tags: &[&str], saved_at: Option<i64>) -> PackageFavorite {
        PackageFavorite {
            name: name.to_string(),
            version: None,
            description: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            note: None,
            url: String::new(),
            saved_at,
            updated_at: None,
        }
    }

    #[test]
    fn test_tag_index_is_sorted_union() {
        let collection = vec![
            record("react", &["ui", "React"], Some(1)),
            record("vue", &["Vue", "ui"], Some(2)),
        ];
        let index: Vec<String> = tag_index(&collection).into_iter().collect();
        assert_eq!(index, vec!["React", "Vue", "ui"]);
    }

    #[test]
    fn test_filter_by_tag_only() {
        let collection = vec![
            record("react", &["React"], Some(1)),
            record("left-pad", &[UNTAGGED_TAG], Some(2)),
        ];
        let matched = filter(&collection, "", "React");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "react");
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let mut rec = record("left-pad", &[], Some(1));
        rec.description = "String padding helper".to_string();
        let collection = vec![rec, record("react", &[], Some(2))];

        let matched = filter(&collection, "PADDING", "");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "left-pad");
    }

    #[test]
    fn test_filter_searches_notes() {
        let mut rec = record("axios", &[], Some(1));
        rec.note = Some("replace with fetch eventually".to_string());
        let matched = filter(&[rec], "fetch", "");
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_sort_by_name() {
        let collection = vec![
            record("zod", &[], Some(3)),
            record("axios", &[], Some(1)),
            record("lodash", &[], Some(2)),
        ];
        let names: Vec<String> = sort(&collection, SortOrder::Name)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["axios", "lodash", "zod"]);
    }

    #[test]
    fn test_sort_newest_missing_saved_at_last() {
        let collection = vec![
            record("no-timestamp", &[], None),
            record("old", &[], Some(100)),
            record("new", &[], Some(200)),
        ];
        let names: Vec<String> = sort(&collection, SortOrder::Newest)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["new", "old", "no-timestamp"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let collection = vec![
            record("first", &[], Some(100)),
            record("second", &[], Some(100)),
        ];
        let names: Vec<String> = sort(&collection, SortOrder::Oldest)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_stats_counts() {
        let collection = vec![
            record("react", &["React", "ui"], Some(1)),
            record("vue", &["ui"], Some(2)),
        ];
        let stats = stats(&collection);
        assert_eq!(stats.package_count, 2);
        assert_eq!(stats.tag_count, 2);
        assert!(stats.approx_bytes > 0);
    }
}
