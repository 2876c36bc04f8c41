//! Integration tests for loading the course dataset into the vector store

mod common;

use common::{write_dataset, KeywordEmbedder};
use coursebot_core::db::Database;
use coursebot_core::{populate, PopulateOutcome, SqliteVectorStore, VectorStore};
use std::sync::Arc;
use tempfile::TempDir;

fn open_store(path: &std::path::Path) -> SqliteVectorStore {
    let db = Database::open(path).unwrap();
    db.initialize().unwrap();
    SqliteVectorStore::new(Arc::new(db), Arc::new(KeywordEmbedder), "courses").unwrap()
}

#[tokio::test]
async fn test_populate_inserts_every_course_once() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let store = open_store(&dir.path().join("store.sqlite"));

    match populate(&store, &dataset).await.unwrap() {
        PopulateOutcome::Inserted { count, .. } => assert_eq!(count, 3),
        other => panic!("expected insert, got {:?}", other),
    }
    assert_eq!(store.count().unwrap(), 3);

    let matches = store.query("nursing", 1).await.unwrap();
    assert_eq!(matches[0].id, "course-2");
    assert_eq!(matches[0].metadata["campus"], "Bundoora");
    assert_eq!(matches[0].metadata["ATAR"], "unknown");
    assert_eq!(matches[0].metadata["pathways"], "unknown");
}

#[tokio::test]
async fn test_populate_skips_when_store_persisted() {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path());
    let db_path = dir.path().join("store.sqlite");

    {
        let store = open_store(&db_path);
        populate(&store, &dataset).await.unwrap();
    }

    // Dataset removed: a second run must not need it
    std::fs::remove_file(&dataset).unwrap();
    let store = open_store(&db_path);
    assert_eq!(
        populate(&store, &dataset).await.unwrap(),
        PopulateOutcome::Skipped { existing: 3 }
    );
    assert_eq!(store.count().unwrap(), 3);
}

#[tokio::test]
async fn test_populate_missing_dataset_fails_on_empty_store() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir.path().join("store.sqlite"));
    let result = populate(&store, dir.path().join("missing.json")).await;
    assert!(result.is_err());
    assert_eq!(store.count().unwrap(), 0);
}
