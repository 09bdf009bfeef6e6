//! Message protocol between triggering contexts and the coordinator
//!
//! Requests are tagged on an `action` field and responses keep the
//! plain shapes the popup and options contexts already consume, so the
//! serialized forms match the original wire traffic.

use crate::error::AppError;
use crate::export::ExportFormat;
use crate::model::{FavoriteCandidate, PackageFavorite};
use crate::settings::Settings;
use crate::store::ImportResult;
use crate::views::CollectionStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ListFavorites,
    SaveFavorite { package: FavoriteCandidate },
    RemoveFavorite { name: String },
    CheckFavorite { name: String },
    ImportFavorites { payload: String },
    ExportFavorites { format: ExportFormat },
    ClearFavorites,
    GetSettings,
    SaveSettings { settings: Settings },
    GetStats,
}

/// Responses, one shape per request kind.
///
/// Serialized untagged; variant order matters for deserialization, most
/// distinctive shapes first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Error {
        success: bool,
        error: AppError,
    },
    #[serde(rename_all = "camelCase")]
    Export {
        success: bool,
        content: String,
        suggested_filename: String,
    },
    #[serde(rename_all = "camelCase")]
    Import {
        success: bool,
        imported_count: usize,
        total_count: usize,
    },
    Check {
        favorited: bool,
    },
    Stats(CollectionStats),
    Favorites {
        success: bool,
        packages: Vec<PackageFavorite>,
    },
    Ack {
        success: bool,
    },
    Settings(Settings),
    Collection(Vec<PackageFavorite>),
}

impl Response {
    pub fn failure(error: impl Into<AppError>) -> Self {
        Self::Error {
            success: false,
            error: error.into(),
        }
    }

    pub fn favorites(packages: Vec<PackageFavorite>) -> Self {
        Self::Favorites {
            success: true,
            packages,
        }
    }

    pub fn imported(result: ImportResult) -> Self {
        Self::Import {
            success: true,
            imported_count: result.imported_count,
            total_count: result.total_count,
        }
    }

    pub fn exported(rendering: crate::export::ExportRendering) -> Self {
        Self::Export {
            success: true,
            content: rendering.content,
            suggested_filename: rendering.suggested_filename,
        }
    }
}
