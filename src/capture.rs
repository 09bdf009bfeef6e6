//! Producer-side capture of a package seen on a registry page
//!
//! The page agent scrapes name, version, description, and URL out of
//! the DOM (that part lives outside this crate) and hands the raw
//! fields here to be shaped into a store candidate: description capped
//! at 200 characters, version defaulted to the `"latest"` sentinel, and
//! tags derived from simple keyword heuristics when auto-tagging is on.

use crate::model::{FavoriteCandidate, LATEST_VERSION};

/// Maximum description length kept at capture time, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 200;

struct TagRule {
    keywords: &'static [&'static str],
    tag: &'static str,
    /// Whether the keywords also match against the description
    search_description: bool,
}

const TAG_RULES: &[TagRule] = &[
    TagRule { keywords: &["react"], tag: "React", search_description: true },
    TagRule { keywords: &["vue"], tag: "Vue", search_description: true },
    TagRule { keywords: &["angular"], tag: "Angular", search_description: true },
    TagRule { keywords: &["webpack"], tag: "build-tools", search_description: true },
    TagRule { keywords: &["eslint", "prettier"], tag: "linting", search_description: false },
    TagRule { keywords: &["test", "jest", "mocha"], tag: "testing", search_description: false },
    TagRule { keywords: &["ui", "component"], tag: "ui-components", search_description: false },
    TagRule { keywords: &["cli"], tag: "cli-tools", search_description: false },
    TagRule { keywords: &["util", "helper"], tag: "utilities", search_description: false },
];

/// Raw fields scraped from a registry page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCapture {
    pub name: String,
    /// Concrete version if one was found on the page
    pub version: Option<String>,
    pub description: String,
    pub url: String,
}

/// Derive tags from package name and description by keyword matching.
/// Returns an empty list when nothing matches; the record model turns
/// that into the untagged sentinel.
pub fn derive_tags(name: &str, description: &str) -> Vec<String> {
    let name = name.to_lowercase();
    let description = description.to_lowercase();

    TAG_RULES
        .iter()
        .filter(|rule| {
            rule.keywords.iter().any(|keyword| {
                name.contains(keyword)
                    || (rule.search_description && description.contains(keyword))
            })
        })
        .map(|rule| rule.tag.to_string())
        .collect()
}

/// Truncate a scraped description to the capture limit, on a character
/// boundary.
pub fn truncate_description(description: &str) -> String {
    description.chars().take(MAX_DESCRIPTION_CHARS).collect()
}

/// Shape a page capture into a store candidate.
pub fn build_candidate(capture: &PageCapture, auto_tag: bool, now: i64) -> FavoriteCandidate {
    let tags = if auto_tag {
        let derived = derive_tags(&capture.name, &capture.description);
        if derived.is_empty() { None } else { Some(derived) }
    } else {
        None
    };

    FavoriteCandidate {
        name: capture.name.clone(),
        version: Some(
            capture
                .version
                .clone()
                .unwrap_or_else(|| LATEST_VERSION.to_string()),
        ),
        description: Some(truncate_description(&capture.description)),
        tags,
        note: None,
        url: Some(capture.url.clone()),
        saved_at: Some(now),
    }
}
