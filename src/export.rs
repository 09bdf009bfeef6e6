//! Export rendering for the favorites collection
//!
//! Pure functions over an already-obtained collection snapshot; nothing
//! here reads or writes storage. The structured format is the exchange
//! format `merge_import` accepts back; the text format is a grouped
//! Markdown listing for humans.

use crate::model::{PackageFavorite, UNTAGGED_TAG};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format version tag written into structured exports
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

const REGISTRY_PACKAGE_URL: &str = "https://www.npmjs.com/package";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON envelope with version tag and export timestamp
    #[default]
    Structured,
    /// Markdown listing grouped by tag
    Text,
}

/// Envelope wrapping a structured export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: String,
    pub export_date: String,
    pub packages: Vec<PackageFavorite>,
}

/// Rendered export: the file content plus a suggested download name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportRendering {
    pub content: String,
    pub suggested_filename: String,
}

/// Render the collection in the requested format.
///
/// `exported_at` is supplied by the caller so rendering stays a pure
/// function of its inputs.
pub fn render_export(
    format: ExportFormat,
    collection: &[PackageFavorite],
    exported_at: DateTime<Utc>,
) -> ExportRendering {
    match format {
        ExportFormat::Structured => render_structured(collection, exported_at),
        ExportFormat::Text => render_text(collection, exported_at),
    }
}

fn export_filename(exported_at: DateTime<Utc>, extension: &str) -> String {
    format!("npm-favorites-{}.{}", exported_at.format("%Y-%m-%d"), extension)
}

fn render_structured(
    collection: &[PackageFavorite],
    exported_at: DateTime<Utc>,
) -> ExportRendering {
    let envelope = ExportEnvelope {
        version: EXPORT_FORMAT_VERSION.to_string(),
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        packages: collection.to_vec(),
    };
    // Field order in the struct fixes the output order, so identical
    // collections always serialize identically
    let content = serde_json::to_string_pretty(&envelope).unwrap_or_default();

    ExportRendering {
        content,
        suggested_filename: export_filename(exported_at, "json"),
    }
}

fn render_text(collection: &[PackageFavorite], exported_at: DateTime<Utc>) -> ExportRendering {
    let mut grouped: BTreeMap<&str, Vec<&PackageFavorite>> = BTreeMap::new();
    for record in collection {
        if record.tags.is_empty() {
            grouped.entry(UNTAGGED_TAG).or_default().push(record);
        } else {
            for tag in &record.tags {
                grouped.entry(tag.as_str()).or_default().push(record);
            }
        }
    }

    let mut output = String::new();
    output.push_str("# Package Favorites\n\n");
    output.push_str(&format!(
        "Exported: {}\n\n",
        exported_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    output.push_str(&format!("Total: {} packages\n\n", collection.len()));

    for (tag, records) in &grouped {
        output.push_str(&format!("## {}\n\n", tag));
        for record in records {
            output.push_str(&format!(
                "### [{}]({}/{})\n",
                record.name, REGISTRY_PACKAGE_URL, record.name
            ));
            if let Some(version) = &record.version {
                output.push_str(&format!("Version: {}\n\n", version));
            }
            if !record.description.is_empty() {
                output.push_str(&format!("{}\n\n", record.description));
            }
            if let Some(note) = record.note.as_deref().filter(|n| !n.is_empty()) {
                output.push_str(&format!("> Note: {}\n\n", note));
            }
            output.push_str(&format!("```bash\nnpm install {}\n```\n\n", record.name));
            output.push_str("---\n\n");
        }
    }

    ExportRendering {
        content: output,
        suggested_filename: export_filename(exported_at, "md"),
    }
}
