//! Mutation coordinator: the single owner of the favorites collection
//!
//! The persistence collaborator offers atomic single-key get/set but no
//! compare-and-swap, so two contexts running their own read-modify-write
//! cycles can silently clobber each other. The coordinator closes that
//! race: it owns the store on a dedicated task, requests arrive over a
//! channel carrying a oneshot reply slot, and the loop finishes one
//! operation completely before receiving the next. FIFO, never
//! interleaved mid-cycle.
//!
//! Mutation responses carry the post-mutation collection, so the
//! requesting context reads its own write. Plain reads are served from
//! the latest completed snapshot without queuing.

use crate::error::AppError;
use crate::export::{render_export, ExportFormat, ExportRendering};
use crate::model::{FavoriteCandidate, PackageFavorite};
use crate::protocol::{Request, Response};
use crate::settings::Settings;
use crate::storage::StorageBackend;
use crate::store::{FavoritesStore, ImportResult, StoreError};
use crate::views;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

struct Envelope {
    request: Request,
    respond: oneshot::Sender<Response>,
}

/// Cloneable handle held by each triggering context.
///
/// All mutating paths go through [`CoordinatorHandle::request`]; no
/// context performs its own read-modify-write against storage.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    snapshot: Arc<RwLock<Vec<PackageFavorite>>>,
}

/// Spawn the owner task for a store and return the handle contexts use
/// to reach it.
///
/// Seeds missing storage keys first, as the background context does on
/// install.
pub async fn spawn<B>(store: FavoritesStore<B>) -> Result<CoordinatorHandle, StoreError>
where
    B: StorageBackend + 'static,
{
    store.initialize().await?;
    let snapshot = Arc::new(RwLock::new(store.list().await?));

    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
    let task_snapshot = Arc::clone(&snapshot);

    tokio::spawn(async move {
        // Receiving the next envelope only after the previous operation
        // finished is what serializes the read-modify-write cycles.
        while let Some(Envelope { request, respond }) = rx.recv().await {
            let response = handle_request(&store, &task_snapshot, request).await;
            let _ = respond.send(response);
        }
        tracing::debug!("favorites coordinator stopped");
    });

    Ok(CoordinatorHandle { tx, snapshot })
}

async fn handle_request<B: StorageBackend>(
    store: &FavoritesStore<B>,
    snapshot: &Arc<RwLock<Vec<PackageFavorite>>>,
    request: Request,
) -> Response {
    match request {
        Request::ListFavorites => match store.list().await {
            Ok(collection) => {
                *snapshot.write() = collection.clone();
                Response::Collection(collection)
            }
            Err(e) => Response::failure(e),
        },
        Request::SaveFavorite { package } => match store.upsert(&package).await {
            Ok(collection) => {
                *snapshot.write() = collection.clone();
                Response::favorites(collection)
            }
            Err(e) => Response::failure(e),
        },
        Request::RemoveFavorite { name } => match store.remove(&name).await {
            Ok(collection) => {
                *snapshot.write() = collection.clone();
                Response::favorites(collection)
            }
            Err(e) => Response::failure(e),
        },
        Request::CheckFavorite { name } => match store.contains(&name).await {
            Ok(favorited) => Response::Check { favorited },
            Err(e) => Response::failure(e),
        },
        Request::ImportFavorites { payload } => match store.merge_import(&payload).await {
            Ok(result) => {
                match store.list().await {
                    Ok(collection) => *snapshot.write() = collection,
                    Err(e) => tracing::warn!("snapshot refresh after import failed: {e}"),
                }
                Response::imported(result)
            }
            Err(e) => Response::failure(e),
        },
        Request::ExportFavorites { format } => match store.list().await {
            Ok(collection) => {
                Response::exported(render_export(format, &collection, Utc::now()))
            }
            Err(e) => Response::failure(e),
        },
        Request::ClearFavorites => match store.clear().await {
            Ok(collection) => {
                *snapshot.write() = collection.clone();
                Response::favorites(collection)
            }
            Err(e) => Response::failure(e),
        },
        Request::GetSettings => match store.load_settings().await {
            Ok(settings) => Response::Settings(settings),
            Err(e) => Response::failure(e),
        },
        Request::SaveSettings { settings } => match store.save_settings(&settings).await {
            Ok(()) => Response::Ack { success: true },
            Err(e) => Response::failure(e),
        },
        Request::GetStats => match store.list().await {
            Ok(collection) => Response::Stats(views::stats(&collection)),
            Err(e) => Response::failure(e),
        },
    }
}

impl CoordinatorHandle {
    /// Queue a raw protocol request and wait for its response.
    pub async fn request(&self, request: Request) -> Result<Response, AppError> {
        let (respond, rx) = oneshot::channel();
        self.tx
            .send(Envelope { request, respond })
            .map_err(|_| AppError::channel_closed())?;
        rx.await.map_err(|_| AppError::channel_closed())
    }

    async fn expect_favorites(&self, request: Request) -> Result<Vec<PackageFavorite>, AppError> {
        match self.request(request).await? {
            Response::Favorites { packages, .. } | Response::Collection(packages) => Ok(packages),
            Response::Error { error, .. } => Err(error),
            other => Err(AppError::internal(format!(
                "unexpected response: {other:?}"
            ))),
        }
    }

    /// Latest completed collection state, served without queuing.
    pub fn list(&self) -> Vec<PackageFavorite> {
        self.snapshot.read().clone()
    }

    /// Queued read of the full collection through the owner.
    pub async fn list_fresh(&self) -> Result<Vec<PackageFavorite>, AppError> {
        self.expect_favorites(Request::ListFavorites).await
    }

    pub async fn save(
        &self,
        package: FavoriteCandidate,
    ) -> Result<Vec<PackageFavorite>, AppError> {
        self.expect_favorites(Request::SaveFavorite { package }).await
    }

    pub async fn remove(&self, name: &str) -> Result<Vec<PackageFavorite>, AppError> {
        self.expect_favorites(Request::RemoveFavorite {
            name: name.to_string(),
        })
        .await
    }

    pub async fn check(&self, name: &str) -> Result<bool, AppError> {
        match self
            .request(Request::CheckFavorite {
                name: name.to_string(),
            })
            .await?
        {
            Response::Check { favorited } => Ok(favorited),
            Response::Error { error, .. } => Err(error),
            other => Err(AppError::internal(format!(
                "unexpected response: {other:?}"
            ))),
        }
    }

    pub async fn import(&self, payload: &str) -> Result<ImportResult, AppError> {
        match self
            .request(Request::ImportFavorites {
                payload: payload.to_string(),
            })
            .await?
        {
            Response::Import {
                imported_count,
                total_count,
                ..
            } => Ok(ImportResult {
                imported_count,
                total_count,
            }),
            Response::Error { error, .. } => Err(error),
            other => Err(AppError::internal(format!(
                "unexpected response: {other:?}"
            ))),
        }
    }

    pub async fn export(&self, format: ExportFormat) -> Result<ExportRendering, AppError> {
        match self.request(Request::ExportFavorites { format }).await? {
            Response::Export {
                content,
                suggested_filename,
                ..
            } => Ok(ExportRendering {
                content,
                suggested_filename,
            }),
            Response::Error { error, .. } => Err(error),
            other => Err(AppError::internal(format!(
                "unexpected response: {other:?}"
            ))),
        }
    }

    pub async fn clear(&self) -> Result<Vec<PackageFavorite>, AppError> {
        self.expect_favorites(Request::ClearFavorites).await
    }

    pub async fn settings(&self) -> Result<Settings, AppError> {
        match self.request(Request::GetSettings).await? {
            Response::Settings(settings) => Ok(settings),
            Response::Error { error, .. } => Err(error),
            other => Err(AppError::internal(format!(
                "unexpected response: {other:?}"
            ))),
        }
    }

    pub async fn save_settings(&self, settings: Settings) -> Result<(), AppError> {
        match self.request(Request::SaveSettings { settings }).await? {
            Response::Ack { .. } => Ok(()),
            Response::Error { error, .. } => Err(error),
            other => Err(AppError::internal(format!(
                "unexpected response: {other:?}"
            ))),
        }
    }

    pub async fn stats(&self) -> Result<views::CollectionStats, AppError> {
        match self.request(Request::GetStats).await? {
            Response::Stats(stats) => Ok(stats),
            Response::Error { error, .. } => Err(error),
            other => Err(AppError::internal(format!(
                "unexpected response: {other:?}"
            ))),
        }
    }
}
