//! User settings persisted alongside the collection

use crate::export::ExportFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Settings record stored under the `settings` key.
///
/// Every field has a default so a partially-written settings object
/// from an older install still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub export_format: ExportFormat,
    pub theme: Theme,
    pub notifications: bool,
    pub auto_tag: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_format: ExportFormat::Structured,
            theme: Theme::Light,
            notifications: true,
            auto_tag: true,
        }
    }
}
