//! Common test utilities for pkgshelf integration tests
//!
//! Helpers for spinning up a coordinator over a temp data file and for
//! building candidate records.

use pkgshelf_lib::coordinator::{self, CoordinatorHandle};
use pkgshelf_lib::model::FavoriteCandidate;
use pkgshelf_lib::storage::JsonFileBackend;
use pkgshelf_lib::store::FavoritesStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test context holding temporary resources
#[allow(dead_code)]
pub struct TestContext {
    pub temp_dir: TempDir,
    pub handle: CoordinatorHandle,
    pub data_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    /// Spin up a coordinator backed by a temp data file
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let data_path = temp_dir.path().join("favorites.json");
        let backend = JsonFileBackend::new(&data_path);
        let handle = coordinator::spawn(FavoritesStore::new(backend)).await?;

        Ok(Self {
            temp_dir,
            handle,
            data_path,
        })
    }

    /// A second coordinator over the same data file, standing in for
    /// another execution context
    pub async fn second_handle(&self) -> Result<CoordinatorHandle, Box<dyn std::error::Error>> {
        let backend = JsonFileBackend::new(&self.data_path);
        Ok(coordinator::spawn(FavoritesStore::new(backend)).await?)
    }
}

/// Candidate with version, description, and tags filled in
#[allow(dead_code)]
pub fn candidate(name: &str, version: &str, tags: &[&str]) -> FavoriteCandidate {
    FavoriteCandidate {
        name: name.to_string(),
        version: Some(version.to_string()),
        description: Some(format!("{} description", name)),
        tags: if tags.is_empty() {
            None
        } else {
            Some(tags.iter().map(|t| t.to_string()).collect())
        },
        note: None,
        url: Some(format!("https://www.npmjs.com/package/{}", name)),
        saved_at: None,
    }
}
