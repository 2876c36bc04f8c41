//! Document storage operations

use super::vectors::{bytes_to_embedding, embedding_to_bytes};
use super::Database;
use crate::error::{CourseBotError, Result};
use crate::store::StoredDocument;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::collections::BTreeMap;

/// Embedding model recorded for a collection at first insert
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CollectionModel {
    pub model: String,
    pub dimensions: usize,
}

impl Database {
    /// Create the collection if it does not exist yet
    pub fn ensure_collection(&self, name: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn()?.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;
        Ok(())
    }

    /// Number of documents stored in a collection
    pub fn count_documents(&self, collection: &str) -> Result<usize> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Insert a batch of documents with their embeddings in one transaction
    pub fn insert_documents(
        &self,
        collection: &str,
        documents: &[StoredDocument],
        embeddings: &[Vec<f32>],
        model: &str,
    ) -> Result<usize> {
        if documents.len() != embeddings.len() {
            return Err(CourseBotError::InvalidInput(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }

        let now = Utc::now().to_rfc3339();
        let dimensions = embeddings.first().map(|e| e.len()).unwrap_or(0);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![collection, now],
        )?;
        tx.execute(
            "UPDATE collections SET embedding_model = ?2, dimensions = ?3
             WHERE name = ?1 AND embedding_model IS NULL",
            params![collection, model, dimensions as i64],
        )?;

        let offset: i64 = tx.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (collection, id, position, document, metadata, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (i, (doc, embedding)) in documents.iter().zip(embeddings).enumerate() {
                let metadata = serde_json::to_string(&doc.metadata)?;
                stmt.execute(params![
                    collection,
                    doc.id,
                    offset + i as i64,
                    doc.document,
                    metadata,
                    embedding_to_bytes(embedding),
                    now
                ])?;
            }
        }
        tx.commit()?;

        Ok(documents.len())
    }

    /// All documents of a collection with their embeddings, in insertion order
    pub fn get_documents_with_embeddings(
        &self,
        collection: &str,
    ) -> Result<Vec<(StoredDocument, Vec<f32>)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, document, metadata, embedding FROM documents
             WHERE collection = ?1 ORDER BY position",
        )?;

        let rows = stmt
            .query_map(params![collection], |row| {
                let id: String = row.get(0)?;
                let document: String = row.get(1)?;
                let metadata_json: String = row.get(2)?;
                let embedding_bytes: Vec<u8> = row.get(3)?;
                Ok((id, document, metadata_json, embedding_bytes))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, document, metadata_json, bytes)| {
                let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata_json)?;
                Ok((
                    StoredDocument {
                        id,
                        document,
                        metadata,
                    },
                    bytes_to_embedding(&bytes),
                ))
            })
            .collect()
    }

    /// Embedding model that populated the collection, if any
    pub fn collection_model(&self, collection: &str) -> Result<Option<CollectionModel>> {
        let row = self
            .conn()?
            .query_row(
                "SELECT embedding_model, dimensions FROM collections WHERE name = ?1",
                params![collection],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                    ))
                },
            )
            .optional()?;

        Ok(match row {
            Some((Some(model), dims)) => Some(CollectionModel {
                model,
                dimensions: dims.unwrap_or(0) as usize,
            }),
            _ => None,
        })
    }

    /// Remove a collection and all of its documents
    pub fn delete_collection(&self, collection: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let rows = tx.execute(
            "DELETE FROM documents WHERE collection = ?1",
            params![collection],
        )?;
        tx.execute("DELETE FROM collections WHERE name = ?1", params![collection])?;
        tx.commit()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> StoredDocument {
        let mut metadata = BTreeMap::new();
        metadata.insert("name".to_string(), text.to_string());
        StoredDocument {
            id: id.to_string(),
            document: text.to_string(),
            metadata,
        }
    }

    #[test]
    fn test_insert_and_count() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.ensure_collection("courses").unwrap();
        assert_eq!(db.count_documents("courses").unwrap(), 0);

        let docs = vec![doc("course-0", "Biology"), doc("course-1", "Law")];
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        db.insert_documents("courses", &docs, &embeddings, "mini")
            .unwrap();

        assert_eq!(db.count_documents("courses").unwrap(), 2);
        assert_eq!(db.count_documents("other").unwrap(), 0);

        let stored = db.get_documents_with_embeddings("courses").unwrap();
        assert_eq!(stored[0].0.id, "course-0");
        assert_eq!(stored[1].0.metadata["name"], "Law");
        assert_eq!(stored[1].1, vec![0.0, 1.0]);

        assert_eq!(
            db.collection_model("courses").unwrap(),
            Some(CollectionModel {
                model: "mini".to_string(),
                dimensions: 2
            })
        );
    }

    #[test]
    fn test_mismatched_batch_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let err = db
            .insert_documents("courses", &[doc("course-0", "x")], &[], "mini")
            .unwrap_err();
        assert!(matches!(err, CourseBotError::InvalidInput(_)));
        assert_eq!(db.count_documents("courses").unwrap(), 0);
    }

    #[test]
    fn test_duplicate_id_rolls_back_batch() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let docs = vec![doc("course-0", "a"), doc("course-0", "b")];
        let embeddings = vec![vec![1.0], vec![1.0]];
        assert!(db
            .insert_documents("courses", &docs, &embeddings, "mini")
            .is_err());
        assert_eq!(db.count_documents("courses").unwrap(), 0);
    }

    #[test]
    fn test_delete_collection() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.insert_documents("courses", &[doc("course-0", "a")], &[vec![1.0]], "mini")
            .unwrap();
        assert_eq!(db.delete_collection("courses").unwrap(), 1);
        assert_eq!(db.count_documents("courses").unwrap(), 0);
        assert_eq!(db.collection_model("courses").unwrap(), None);
    }
}
