use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, params_from_iter, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::VectorRepository;
use crate::domain::{Chunk, DomainError, Embedding, RetrievedPassage};

pub const DEFAULT_COLLECTION: &str = "shariah_texts";
const VECTOR_DIMENSIONS: usize = 384;

/// Persistent collection stored in a DuckDB file. Each collection is a schema
/// holding a `chunks` and an `embeddings` table joined on the chunk id.
pub struct DuckdbVectorRepository {
    conn: Arc<Mutex<Connection>>,
    collection: String,
}

impl DuckdbVectorRepository {
    pub fn new(path: &Path) -> Result<Self, DomainError> {
        Self::new_with_collection(path, DEFAULT_COLLECTION)
    }

    /// Opens the database file, creating it and the collection if absent.
    pub fn new_with_collection(path: &Path, collection: &str) -> Result<Self, DomainError> {
        let collection = validate_collection(collection)?;
        let conn = Connection::open(path)
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB database: {}", e)))?;
        Self::initialize(&conn, &collection)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection,
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::storage(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::initialize(&conn, DEFAULT_COLLECTION)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection: DEFAULT_COLLECTION.to_string(),
        })
    }

    fn initialize(conn: &Connection, collection: &str) -> Result<(), DomainError> {
        debug!("Initializing DuckDB collection: {}", collection);
        let ddl = format!(
            "\
            CREATE SCHEMA IF NOT EXISTS \"{0}\";

            CREATE TABLE IF NOT EXISTS \"{0}\".chunks (
                id TEXT NOT NULL,
                content TEXT NOT NULL,
                source TEXT NOT NULL,
                position BIGINT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS \"{0}\".embeddings (
                chunk_id TEXT NOT NULL,
                vector FLOAT[{1}] NOT NULL,
                model TEXT NOT NULL
            );
            ",
            collection, VECTOR_DIMENSIONS
        );

        conn.execute_batch(&ddl).map_err(|e| {
            DomainError::storage(format!(
                "Failed to initialize collection {}: {}",
                collection, e
            ))
        })
    }

    fn vector_to_array_literal(vector: &[f32]) -> Result<String, DomainError> {
        if vector.len() != VECTOR_DIMENSIONS {
            return Err(DomainError::invalid_input(format!(
                "Expected embedding dimension {}, got {}",
                VECTOR_DIMENSIONS,
                vector.len()
            )));
        }
        let values: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
        Ok(format!("[{}]::FLOAT[{}]", values.join(", "), VECTOR_DIMENSIONS))
    }
}

/// Collection names become schema identifiers, so only ASCII letters, digits
/// and underscores are accepted.
fn validate_collection(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DomainError::invalid_input(format!(
            "Invalid collection name '{}'",
            name
        )));
    }
    Ok(name.to_string())
}

#[async_trait]
impl VectorRepository for DuckdbVectorRepository {
    async fn save_batch(
        &self,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }
        if chunks.len() != embeddings.len() {
            return Err(DomainError::invalid_input(
                "Chunk and embedding count mismatch".to_string(),
            ));
        }
        let literals = embeddings
            .iter()
            .map(|e| Self::vector_to_array_literal(e.vector()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        // Replace by id: drop any rows that share an id with the batch first.
        let placeholders = vec!["?"; chunks.len()].join(", ");
        let ids: Vec<&str> = chunks.iter().map(|c| c.id()).collect();
        tx.execute(
            &format!(
                "DELETE FROM \"{}\".embeddings WHERE chunk_id IN ({})",
                self.collection, placeholders
            ),
            params_from_iter(ids.iter().copied()),
        )
        .map_err(|e| DomainError::storage(format!("Failed to replace embeddings: {}", e)))?;
        tx.execute(
            &format!(
                "DELETE FROM \"{}\".chunks WHERE id IN ({})",
                self.collection, placeholders
            ),
            params_from_iter(ids.iter().copied()),
        )
        .map_err(|e| DomainError::storage(format!("Failed to replace chunks: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO \"{}\".chunks (id, content, source, position) VALUES (?, ?, ?, ?)",
                    self.collection
                ))
                .map_err(|e| DomainError::storage(format!("Failed to prepare chunk insert: {}", e)))?;

            for chunk in chunks {
                stmt.execute(params![
                    chunk.id(),
                    chunk.content(),
                    chunk.source(),
                    chunk.position() as i64,
                ])
                .map_err(|e| {
                    DomainError::storage(format!("Failed to insert chunk {}: {}", chunk.id(), e))
                })?;
            }
        }

        for (embedding, array_lit) in embeddings.iter().zip(&literals) {
            // FLOAT[384] cannot be bound as a parameter; the literal is built
            // from our own f32 values.
            let sql = format!(
                "INSERT INTO \"{}\".embeddings (chunk_id, vector, model) VALUES (?, {}, ?)",
                self.collection, array_lit
            );
            tx.execute(&sql, params![embedding.chunk_id(), embedding.model()])
                .map_err(|e| {
                    DomainError::storage(format!(
                        "Failed to insert embedding for chunk {}: {}",
                        embedding.chunk_id(),
                        e
                    ))
                })?;
        }

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!(
            "Saved {} chunks to DuckDB collection {}",
            chunks.len(),
            self.collection
        );
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedPassage>, DomainError> {
        let array_lit = Self::vector_to_array_literal(query_embedding)?;
        let sql = format!(
            "SELECT c.id, c.content, c.source, c.position, \
                array_cosine_similarity(e.vector, {array_lit}) AS score \
            FROM \"{schema}\".embeddings e \
            JOIN \"{schema}\".chunks c ON c.id = e.chunk_id \
            ORDER BY score DESC, c.position ASC \
            LIMIT ?",
            array_lit = array_lit,
            schema = self.collection
        );

        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::storage(format!("Failed to prepare search: {}", e)))?;
        let mut rows = stmt
            .query(params![limit as i64])
            .map_err(|e| DomainError::storage(format!("Failed to run search: {}", e)))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?
        {
            let read = |e: duckdb::Error| DomainError::storage(format!("Failed to read row: {}", e));
            let chunk = Chunk::reconstitute(
                row.get::<_, String>(0).map_err(read)?,
                row.get::<_, String>(1).map_err(read)?,
                row.get::<_, String>(2).map_err(read)?,
                row.get::<_, i64>(3).map_err(read)? as u64,
            );
            let score: f32 = row.get(4).map_err(read)?;
            results.push(RetrievedPassage::new(chunk, score));
        }
        Ok(results)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;
        tx.execute_batch(&format!(
            "DELETE FROM \"{0}\".embeddings; DELETE FROM \"{0}\".chunks;",
            self.collection
        ))
        .map_err(|e| DomainError::storage(format!("Failed to clear collection: {}", e)))?;
        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM \"{}\".chunks", self.collection),
                [],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to count chunks: {}", e)))?;
        Ok(count as u64)
    }

    async fn models(&self) -> Result<Vec<String>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT DISTINCT model FROM \"{}\".embeddings ORDER BY model",
                self.collection
            ))
            .map_err(|e| DomainError::storage(format!("Failed to prepare model query: {}", e)))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::storage(format!("Failed to list models: {}", e)))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read model row: {}", e)))
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
