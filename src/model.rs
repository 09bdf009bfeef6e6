//! Record model for saved package favorites
//!
//! Defines the persisted `PackageFavorite` entity, the partial
//! `FavoriteCandidate` producers hand to the store, and the pure
//! validate/merge rules everything else builds on. Nothing in here
//! touches storage.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag applied when a record has no tags of its own
pub const UNTAGGED_TAG: &str = "uncategorized";

/// Version sentinel used when no concrete version was captured
pub const LATEST_VERSION: &str = "latest";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("package name must not be empty")]
    InvalidName,
}

/// A saved package favorite.
///
/// Field names serialize in camelCase to stay byte-compatible with the
/// export/import payloads the popup and options contexts exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageFavorite {
    /// Unique identifying key, case-sensitive
    pub name: String,
    /// Version string captured at save time, or the `"latest"` sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Capture-time description, at most 200 characters
    #[serde(default)]
    pub description: String,
    /// Ordered tag list; duplicates tolerated, not deduplicated
    #[serde(default)]
    pub tags: Vec<String>,
    /// User note, editable after saving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Source page URL at capture time
    #[serde(default)]
    pub url: String,
    /// Millisecond timestamp of the first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<i64>,
    /// Millisecond timestamp of the last overwrite, absent until re-saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl PackageFavorite {
    /// True when the record carries no tags beyond the untagged sentinel
    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty() || self.tags.iter().all(|t| t == UNTAGGED_TAG)
    }
}

/// Partial record as submitted by a triggering context.
///
/// Every field except `name` is optional so a merge can tell "absent"
/// apart from "present but empty": a `Some("")` description overwrites,
/// a `None` keeps the existing value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCandidate {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<i64>,
}

impl FavoriteCandidate {
    /// Minimal candidate carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Validate a candidate and fill producer-side defaults.
///
/// Fails with `InvalidName` when the name is empty. An empty or absent
/// tag list is normalized to `["uncategorized"]` here, never by the
/// store itself.
pub fn validate(candidate: &FavoriteCandidate) -> Result<PackageFavorite, ValidationError> {
    if candidate.name.is_empty() {
        return Err(ValidationError::InvalidName);
    }

    let tags = match &candidate.tags {
        Some(tags) if !tags.is_empty() => tags.clone(),
        _ => vec![UNTAGGED_TAG.to_string()],
    };

    Ok(PackageFavorite {
        name: candidate.name.clone(),
        version: candidate.version.clone(),
        description: candidate.description.clone().unwrap_or_default(),
        tags,
        note: candidate.note.clone(),
        url: candidate.url.clone().unwrap_or_default(),
        saved_at: candidate.saved_at,
        updated_at: None,
    })
}

/// Merge an incoming partial record over an existing one, field-wise.
///
/// A field present in `incoming` wins, including present-but-empty
/// strings for description and note. `savedAt` is never touched;
/// `updatedAt` is stamped with `now`.
pub fn merge(
    existing: &PackageFavorite,
    incoming: &FavoriteCandidate,
    now: i64,
) -> PackageFavorite {
    PackageFavorite {
        name: existing.name.clone(),
        version: incoming.version.clone().or_else(|| existing.version.clone()),
        description: incoming
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone()),
        tags: incoming.tags.clone().unwrap_or_else(|| existing.tags.clone()),
        note: incoming.note.clone().or_else(|| existing.note.clone()),
        url: incoming.url.clone().unwrap_or_else(|| existing.url.clone()),
        saved_at: existing.saved_at,
        updated_at: Some(now),
    }
}

/// Current time as a millisecond timestamp
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> PackageFavorite {
        PackageFavorite {
            name: "react".to_string(),
            version: Some("18.2.0".to_string()),
            description: "A JavaScript library for building user interfaces".to_string(),
            tags: vec!["React".to_string()],
            note: Some("core dependency".to_string()),
            url: "https://www.npmjs.com/package/react".to_string(),
            saved_at: Some(1_700_000_000_000),
            updated_at: None,
        }
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let candidate = FavoriteCandidate::default();
        assert_eq!(validate(&candidate), Err(ValidationError::InvalidName));
    }

    #[test]
    fn test_validate_defaults_tags_to_untagged() {
        let candidate = FavoriteCandidate::named("lodash");
        let record = validate(&candidate).unwrap();
        assert_eq!(record.tags, vec![UNTAGGED_TAG.to_string()]);
        assert!(record.is_untagged());
    }

    #[test]
    fn test_validate_keeps_explicit_tags() {
        let mut candidate = FavoriteCandidate::named("react");
        candidate.tags = Some(vec!["React".to_string(), "React".to_string()]);
        let record = validate(&candidate).unwrap();
        // Duplicates within one record are tolerated
        assert_eq!(record.tags.len(), 2);
    }

    #[test]
    fn test_merge_absent_fields_keep_existing() {
        let incoming = FavoriteCandidate::named("react");
        let merged = merge(&existing(), &incoming, 1_700_000_100_000);

        assert_eq!(merged.version.as_deref(), Some("18.2.0"));
        assert_eq!(merged.note.as_deref(), Some("core dependency"));
        assert_eq!(merged.saved_at, Some(1_700_000_000_000));
        assert_eq!(merged.updated_at, Some(1_700_000_100_000));
    }

    #[test]
    fn test_merge_empty_string_overwrites() {
        let mut incoming = FavoriteCandidate::named("react");
        incoming.description = Some(String::new());
        incoming.note = Some(String::new());

        let merged = merge(&existing(), &incoming, 1);
        assert_eq!(merged.description, "");
        assert_eq!(merged.note.as_deref(), Some(""));
    }

    #[test]
    fn test_merge_never_touches_saved_at() {
        let mut incoming = FavoriteCandidate::named("react");
        incoming.saved_at = Some(9_999);

        let merged = merge(&existing(), &incoming, 1);
        assert_eq!(merged.saved_at, Some(1_700_000_000_000));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let value = serde_json::to_value(existing()).unwrap();
        assert!(value.get("savedAt").is_some());
        assert!(value.get("saved_at").is_none());
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn test_candidate_roundtrip_preserves_absence() {
        let candidate = FavoriteCandidate::named("left-pad");
        let json = serde_json::to_string(&candidate).unwrap();
        let back: FavoriteCandidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.description, None);
        assert_eq!(back.tags, None);
    }
}
