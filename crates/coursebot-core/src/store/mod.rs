//! Vector store
//!
//! Persists course documents with metadata and answers nearest-neighbour
//! text queries with distance scores (lower = more similar).

use crate::db::vectors::{normalize, squared_l2_distance};
use crate::db::Database;
use crate::error::{CourseBotError, Result};
use crate::llm::Embedder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

const EMBED_BATCH_SIZE: usize = 32;

/// Document as persisted: retrieval text plus a flat metadata map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub document: String,
    pub metadata: BTreeMap<String, String>,
}

/// One ranked result of a similarity query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    pub id: String,
    pub document: String,
    pub metadata: BTreeMap<String, String>,
    pub distance: f32,
}

/// Storage collaborator used by the corpus loader and the orchestrator
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Number of stored documents
    fn count(&self) -> Result<usize>;

    /// Insert documents in a single batch
    async fn add(&self, documents: Vec<StoredDocument>) -> Result<()>;

    /// The `k` nearest documents to `text`, closest first
    async fn query(&self, text: &str, k: usize) -> Result<Vec<QueryMatch>>;
}

/// SQLite-backed store for one named collection
pub struct SqliteVectorStore {
    db: Arc<Database>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

impl SqliteVectorStore {
    /// Open (creating if needed) a collection
    pub fn new(
        db: Arc<Database>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let collection = collection.into();
        db.ensure_collection(&collection)?;
        Ok(Self {
            db,
            embedder,
            collection,
        })
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        match self.embedder.dimensions() {
            Some(expected) if embedding.len() != expected => Err(CourseBotError::Embedding(format!(
                "{} returned a {}-dimensional embedding, expected {}",
                self.embedder.model_name(),
                embedding.len(),
                expected
            ))),
            _ => Ok(()),
        }
    }

    fn check_model(&self) -> Result<()> {
        if let Some(stored) = self.db.collection_model(&self.collection)? {
            if stored.model != self.embedder.model_name() {
                tracing::warn!(
                    "Collection '{}' was embedded with {} but queries use {}; distances may be meaningless",
                    self.collection,
                    stored.model,
                    self.embedder.model_name()
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn count(&self) -> Result<usize> {
        self.db.count_documents(&self.collection)
    }

    async fn add(&self, documents: Vec<StoredDocument>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        let texts: Vec<String> = documents.iter().map(|d| d.document.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(EMBED_BATCH_SIZE) {
            let batch = self.embedder.embed_batch(chunk).await?;
            for embedding in &batch {
                self.check_dimensions(embedding)?;
                embeddings.push(normalize(embedding));
            }
            tracing::debug!("Embedded {}/{} documents", embeddings.len(), texts.len());
        }

        let inserted = self.db.insert_documents(
            &self.collection,
            &documents,
            &embeddings,
            self.embedder.model_name(),
        )?;

        tracing::info!(
            "Added {} documents to '{}' in {:.2}s",
            inserted,
            self.collection,
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<QueryMatch>> {
        if k == 0 || self.count()? == 0 {
            return Ok(Vec::new());
        }
        self.check_model()?;

        let raw = self.embedder.embed(text).await?;
        self.check_dimensions(&raw)?;
        let query_embedding = normalize(&raw);
        let stored = self.db.get_documents_with_embeddings(&self.collection)?;

        let mut matches: Vec<QueryMatch> = stored
            .into_iter()
            .map(|(doc, embedding)| QueryMatch {
                distance: squared_l2_distance(&query_embedding, &embedding),
                id: doc.id,
                document: doc.document,
                metadata: doc.metadata,
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);

        tracing::debug!(
            "Query '{}' distances: {:?}",
            text,
            matches.iter().map(|m| m.distance).collect::<Vec<_>>()
        );
        Ok(matches)
    }
}
