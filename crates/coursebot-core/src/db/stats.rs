//! Database statistics

use super::Database;
use crate::error::Result;

/// Per-collection stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct CollectionStats {
    pub name: String,
    pub document_count: usize,
    pub embedding_model: Option<String>,
    pub dimensions: Option<usize>,
}

/// Database stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub collection_count: usize,
    pub document_count: usize,
    pub collections: Vec<CollectionStats>,
}

impl Database {
    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.name, c.embedding_model, c.dimensions,
                    (SELECT COUNT(*) FROM documents d WHERE d.collection = c.name)
             FROM collections c ORDER BY c.name",
        )?;

        let collections = stmt
            .query_map([], |row| {
                Ok(CollectionStats {
                    name: row.get(0)?,
                    embedding_model: row.get(1)?,
                    dimensions: row.get::<_, Option<i64>>(2)?.map(|d| d as usize),
                    document_count: row.get::<_, i64>(3)? as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(DatabaseStats {
            collection_count: collections.len(),
            document_count: collections.iter().map(|c| c.document_count).sum(),
            collections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_on_empty_database() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.collection_count, 0);
        assert_eq!(stats.document_count, 0);
    }

    #[test]
    fn test_stats_counts_collection() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.ensure_collection("courses").unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.collection_count, 1);
        assert_eq!(stats.collections[0].name, "courses");
        assert_eq!(stats.collections[0].embedding_model, None);
    }
}
