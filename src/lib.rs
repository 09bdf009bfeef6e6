//! pkgshelf - a local favorites shelf for registry packages
//!
//! Core pieces: a validated record model, the favorites store doing
//! full read-modify-write cycles against an opaque key-value backend,
//! a single-owner mutation coordinator serializing those cycles across
//! contexts, and read-only view projections for listing UIs.

pub mod capture;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod model;
pub mod protocol;
pub mod settings;
pub mod storage;
pub mod store;
pub mod views;

pub use coordinator::CoordinatorHandle;
pub use model::{FavoriteCandidate, PackageFavorite};
pub use store::FavoritesStore;
