//! Store-level contracts: uniqueness, merge semantics, additive import,
//! and the export round trip.

use pkgshelf_lib::export::{render_export, ExportFormat};
use pkgshelf_lib::model::{FavoriteCandidate, UNTAGGED_TAG};
use pkgshelf_lib::storage::MemoryBackend;
use pkgshelf_lib::store::FavoritesStore;
use pkgshelf_lib::views::{self, SortOrder};

mod common;
use common::candidate;

fn store() -> FavoritesStore<MemoryBackend> {
    FavoritesStore::new(MemoryBackend::new())
}

#[tokio::test]
async fn upsert_sequences_never_duplicate_names() {
    let store = store();
    let names = ["react", "vue", "react", "lodash", "vue", "react"];
    for name in names {
        store.upsert(&FavoriteCandidate::named(name)).await.unwrap();
    }

    let collection = store.list().await.unwrap();
    assert_eq!(collection.len(), 3);
    let mut seen: Vec<&str> = collection.iter().map(|r| r.name.as_str()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn upsert_twice_is_idempotent_except_updated_at() {
    let store = store();
    let candidate = candidate("react", "18.2.0", &["React"]);

    let first = store.upsert(&candidate).await.unwrap();
    let second = store.upsert(&candidate).await.unwrap();

    assert_eq!(second.len(), 1);
    let (a, b) = (&first[0], &second[0]);
    assert_eq!(a.name, b.name);
    assert_eq!(a.version, b.version);
    assert_eq!(a.description, b.description);
    assert_eq!(a.tags, b.tags);
    assert_eq!(a.url, b.url);
    assert_eq!(a.saved_at, b.saved_at);
    // Only the overwrite timestamp may differ
    assert!(b.updated_at.is_some());
}

#[tokio::test]
async fn merge_keeps_fields_missing_from_partial_resave() {
    let store = store();
    let mut full = candidate("react", "18.2.0", &["React"]);
    full.note = Some("core dependency".to_string());
    store.upsert(&full).await.unwrap();

    // A later partial save carries only the name and a new version
    let mut partial = FavoriteCandidate::named("react");
    partial.version = Some("18.3.0".to_string());
    let collection = store.upsert(&partial).await.unwrap();

    let record = &collection[0];
    assert_eq!(record.version.as_deref(), Some("18.3.0"));
    assert_eq!(record.note.as_deref(), Some("core dependency"));
    assert_eq!(record.description, "react description");
    assert_eq!(record.tags, vec!["React".to_string()]);
}

#[tokio::test]
async fn import_never_overwrites_existing_records() {
    let store = store();
    store.upsert(&candidate("react", "18.2.0", &["React"])).await.unwrap();

    let payload = r#"{
        "packages": [
            {"name": "react", "version": "0.0.1", "description": "bogus"},
            {"name": "new-lib"}
        ]
    }"#;
    let result = store.merge_import(payload).await.unwrap();
    assert_eq!(result.imported_count, 1);
    assert_eq!(result.total_count, 2);

    let collection = store.list().await.unwrap();
    let react = collection.iter().find(|r| r.name == "react").unwrap();
    assert_eq!(react.version.as_deref(), Some("18.2.0"));
    assert_eq!(react.description, "react description");
    assert!(collection.iter().any(|r| r.name == "new-lib"));
}

#[tokio::test]
async fn remove_twice_yields_same_collection() {
    let store = store();
    store.upsert(&candidate("react", "18.2.0", &[])).await.unwrap();
    store.upsert(&candidate("vue", "3.4.0", &[])).await.unwrap();

    let first = store.remove("react").await.unwrap();
    let second = store.remove("react").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[tokio::test]
async fn structured_export_reimports_as_noop() {
    let store = store();
    store.upsert(&candidate("react", "18.2.0", &["React"])).await.unwrap();
    store.upsert(&candidate("lodash", "4.17.21", &[])).await.unwrap();

    let collection = store.list().await.unwrap();
    let rendering = render_export(ExportFormat::Structured, &collection, chrono::Utc::now());

    let result = store.merge_import(&rendering.content).await.unwrap();
    assert_eq!(result.imported_count, 0);
    assert_eq!(result.total_count, 2);
    assert_eq!(store.list().await.unwrap(), collection);
}

#[tokio::test]
async fn first_upsert_defaults_tags_to_uncategorized() {
    let store = store();
    let mut candidate = FavoriteCandidate::named("lodash");
    candidate.version = Some("4.17.21".to_string());

    let collection = store.upsert(&candidate).await.unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection[0].name, "lodash");
    assert_eq!(collection[0].tags, vec![UNTAGGED_TAG.to_string()]);
}

#[tokio::test]
async fn tag_filter_matches_only_tagged_records() {
    let store = store();
    store.upsert(&candidate("react", "18.2.0", &["React"])).await.unwrap();
    store
        .upsert(&candidate("left-pad", "1.3.0", &[UNTAGGED_TAG]))
        .await
        .unwrap();

    let collection = store.list().await.unwrap();
    let matched = views::filter(&collection, "", "React");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "react");
}

#[tokio::test]
async fn name_sort_orders_lexicographically() {
    let store = store();
    for name in ["zod", "axios", "lodash"] {
        store.upsert(&FavoriteCandidate::named(name)).await.unwrap();
    }

    let sorted = views::sort(&store.list().await.unwrap(), SortOrder::Name);
    let names: Vec<String> = sorted.into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["axios", "lodash", "zod"]);
}

#[tokio::test]
async fn import_counts_skip_duplicates_within_payload() {
    let store = store();
    let payload = r#"{"packages": [{"name": "a"}, {"name": "a"}, {"name": "b"}]}"#;
    let result = store.merge_import(payload).await.unwrap();
    assert_eq!(result.imported_count, 2);
    assert_eq!(result.total_count, 2);
}
