//! Favorites store: the single source of truth for the collection
//!
//! Every operation is a full read-modify-write cycle against the
//! persistence collaborator; no partial or indexed writes are assumed.
//! The store itself is context-agnostic — serialization of concurrent
//! mutations is the coordinator's contract, and every mutating code
//! path is expected to go through it.

use crate::model::{self, FavoriteCandidate, PackageFavorite, ValidationError};
use crate::settings::Settings;
use crate::storage::{StorageBackend, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key holding the collection
pub const PACKAGES_KEY: &str = "packages";
/// Storage key holding the settings record
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("malformed import payload: {0}")]
    MalformedImport(String),
    #[error("stored value under '{key}' is not readable: {detail}")]
    Decode { key: String, detail: String },
    #[error(transparent)]
    Persistence(#[from] StorageError),
}

/// Counts returned by a merge-import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// Records appended because their name was not yet present
    pub imported_count: usize,
    /// Collection size after the import
    pub total_count: usize,
}

pub struct FavoritesStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> FavoritesStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Seed missing top-level keys, as first install does.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        if self.backend.get(PACKAGES_KEY).await?.is_none() {
            self.write_collection(&[]).await?;
        }
        if self.backend.get(SETTINGS_KEY).await?.is_none() {
            self.save_settings(&Settings::default()).await?;
        }
        Ok(())
    }

    /// Full current collection. An absent storage key reads as empty.
    pub async fn list(&self) -> Result<Vec<PackageFavorite>, StoreError> {
        match self.backend.get(PACKAGES_KEY).await? {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value).map_err(|e| StoreError::Decode {
                key: PACKAGES_KEY.to_string(),
                detail: e.to_string(),
            }),
        }
    }

    async fn write_collection(&self, collection: &[PackageFavorite]) -> Result<(), StoreError> {
        let value = serde_json::to_value(collection).map_err(|e| StoreError::Decode {
            key: PACKAGES_KEY.to_string(),
            detail: e.to_string(),
        })?;
        self.backend.set(PACKAGES_KEY, value).await?;
        Ok(())
    }

    /// Insert or merge-update a record keyed by name.
    ///
    /// Validation failures leave the stored state untouched. On merge,
    /// fields absent from the candidate keep their existing values and
    /// `updatedAt` is stamped; on insert the record is prepended with
    /// `savedAt` defaulted to now.
    pub async fn upsert(
        &self,
        candidate: &FavoriteCandidate,
    ) -> Result<Vec<PackageFavorite>, StoreError> {
        let validated = model::validate(candidate)?;
        let now = model::now_millis();

        let mut collection = self.list().await?;
        match collection.iter().position(|r| r.name == candidate.name) {
            Some(index) => {
                let merged = model::merge(&collection[index], candidate, now);
                collection[index] = merged;
                tracing::debug!("updated favorite '{}'", candidate.name);
            }
            None => {
                let mut record = validated;
                record.saved_at = record.saved_at.or(Some(now));
                collection.insert(0, record);
                tracing::debug!("saved new favorite '{}'", candidate.name);
            }
        }

        self.write_collection(&collection).await?;
        Ok(collection)
    }

    /// Remove by name. Idempotent: removing an absent name succeeds and
    /// returns the unchanged collection.
    pub async fn remove(&self, name: &str) -> Result<Vec<PackageFavorite>, StoreError> {
        let mut collection = self.list().await?;
        collection.retain(|record| record.name != name);
        self.write_collection(&collection).await?;
        Ok(collection)
    }

    /// Reset the collection to empty.
    pub async fn clear(&self) -> Result<Vec<PackageFavorite>, StoreError> {
        self.write_collection(&[]).await?;
        tracing::info!("cleared all favorites");
        Ok(Vec::new())
    }

    /// Membership probe used by the page agent to pick its button state.
    pub async fn contains(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.list().await?.iter().any(|record| record.name == name))
    }

    /// Additive-only import of a structured export payload.
    ///
    /// Unlike upsert, import never overwrites: only records whose name
    /// is not already present are appended, keeping their incoming
    /// fields verbatim. Parse failures are reported before any write,
    /// so a bad payload cannot corrupt the collection.
    pub async fn merge_import(&self, payload: &str) -> Result<ImportResult, StoreError> {
        let parsed: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| StoreError::MalformedImport(e.to_string()))?;
        let incoming = parsed
            .get(PACKAGES_KEY)
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                StoreError::MalformedImport("missing 'packages' array".to_string())
            })?;
        let incoming: Vec<PackageFavorite> =
            serde_json::from_value(serde_json::Value::Array(incoming.clone()))
                .map_err(|e| StoreError::MalformedImport(e.to_string()))?;

        let mut collection = self.list().await?;
        let existing_names: std::collections::HashSet<&str> =
            collection.iter().map(|r| r.name.as_str()).collect();

        let mut appended: Vec<PackageFavorite> = Vec::new();
        for record in incoming {
            if record.name.is_empty() || existing_names.contains(record.name.as_str()) {
                continue;
            }
            if appended.iter().any(|r| r.name == record.name) {
                continue;
            }
            appended.push(record);
        }

        let imported_count = appended.len();
        collection.extend(appended);
        self.write_collection(&collection).await?;
        tracing::info!("imported {} new favorites", imported_count);

        Ok(ImportResult {
            imported_count,
            total_count: collection.len(),
        })
    }

    /// Stored settings, or the first-install defaults when absent.
    pub async fn load_settings(&self) -> Result<Settings, StoreError> {
        match self.backend.get(SETTINGS_KEY).await? {
            None => Ok(Settings::default()),
            Some(value) => serde_json::from_value(value).map_err(|e| StoreError::Decode {
                key: SETTINGS_KEY.to_string(),
                detail: e.to_string(),
            }),
        }
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let value = serde_json::to_value(settings).map_err(|e| StoreError::Decode {
            key: SETTINGS_KEY.to_string(),
            detail: e.to_string(),
        })?;
        self.backend.set(SETTINGS_KEY, value).await?;
        Ok(())
    }
}
