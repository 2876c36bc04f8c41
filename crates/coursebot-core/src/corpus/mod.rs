//! Course corpus loading
//!
//! Reads the course dataset once and populates the vector store. Population
//! is skipped entirely when the store already holds documents.

mod record;

pub use record::{CourseRecord, FieldValue, NormalizedCourse, UNKNOWN};

use crate::error::{CourseBotError, Result};
use crate::store::{StoredDocument, VectorStore};
use std::path::Path;
use std::time::{Duration, Instant};

/// What `populate` did
#[derive(Debug, Clone, PartialEq)]
pub enum PopulateOutcome {
    /// Store already had documents; dataset was not read
    Skipped { existing: usize },
    /// Dataset was read and inserted as one batch
    Inserted { count: usize, elapsed: Duration },
}

/// Read the course dataset (a JSON array of course objects)
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<CourseRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        CourseBotError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read course dataset {:?}: {}", path, e),
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        CourseBotError::Dataset(format!("Failed to parse course dataset {:?}: {}", path, e))
    })
}

/// Build the stored document for every record, keyed by position
pub fn build_documents(records: &[CourseRecord]) -> Vec<StoredDocument> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| record.to_document(index))
        .collect()
}

/// Populate the store from the dataset unless it already has entries
pub async fn populate(store: &dyn VectorStore, dataset: impl AsRef<Path>) -> Result<PopulateOutcome> {
    let existing = store.count()?;
    if existing > 0 {
        tracing::debug!("Vector store already holds {} documents, skipping load", existing);
        return Ok(PopulateOutcome::Skipped { existing });
    }

    let start = Instant::now();
    let records = load_dataset(dataset.as_ref())?;
    let documents = build_documents(&records);
    let count = documents.len();

    tracing::info!("Populating vector store with {} courses", count);
    store.add(documents).await?;

    let elapsed = start.elapsed();
    tracing::info!("Vector store population took {:.2} seconds", elapsed.as_secs_f64());
    Ok(PopulateOutcome::Inserted { count, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_dataset_reads_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("courses.json");
        fs::write(
            &path,
            r#"[{"name": "Bachelor of Nursing", "atar": 75}, {"name": null}]"#,
        )
        .unwrap();

        let records = load_dataset(&path).unwrap();
        assert_eq!(records.len(), 2);
        let docs = build_documents(&records);
        assert_eq!(docs[1].id, "course-1");
        assert_eq!(docs[1].metadata["name"], UNKNOWN);
    }

    #[test]
    fn test_load_dataset_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("courses.json");
        fs::write(&path, r#"{"name": "not a list"}"#).unwrap();
        assert!(matches!(
            load_dataset(&path).unwrap_err(),
            CourseBotError::Dataset(_)
        ));
    }

    #[test]
    fn test_load_dataset_missing_file_is_io_error() {
        let err = load_dataset("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CourseBotError::Io(_)));
    }
}
