use anyhow::{Result, anyhow};
use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, RecordBatchReader, StringArray, TimestampMillisecondArray};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::path::Path;
use std::sync::Arc;

use finrag_core::error::Error;
use finrag_core::traits::{ChunkStore, Embedder};
use finrag_core::types::{ChunkMetadata, QueryHit, StoredChunk};

use crate::schema::{build_collection_schema, vector_dim, DISTANCE_COL, DOCUMENT_COL, ID_COL, SOURCE_COL};
use crate::table::{ensure_table, open_db};

const EMBED_BATCH: usize = 64;

/// A named LanceDB table of (id, document, source, vector) rows.
///
/// The collection embeds its own inputs: `add` embeds documents and `query`
/// embeds the query text with the same [`Embedder`]. Distances are squared L2.
pub struct LanceCollection {
    table: Table,
    name: String,
    embedder: Box<dyn Embedder>,
}

impl LanceCollection {
    /// Open `name` under `db_path`, creating an empty table on first use.
    pub async fn get_or_create(db_path: &Path, name: &str, embedder: Box<dyn Embedder>) -> Result<Self> {
        let conn = open_db(db_path.to_string_lossy().as_ref()).await?;
        let dim = i32::try_from(embedder.dim()).map_err(|_| anyhow!("embedding dim {} too large", embedder.dim()))?;
        if ensure_table(&conn, name, build_collection_schema(dim)).await? {
            tracing::info!(collection = name, path = %db_path.display(), dim, "created collection");
        }
        let table = conn.open_table(name).execute().await?;
        let schema = table.schema().await?;
        let stored_dim = vector_dim(&schema);
        if stored_dim != Some(dim) {
            return Err(Error::DimensionMismatch {
                collection: name.to_string(),
                stored: stored_dim,
                expected: embedder.dim(),
            }.into());
        }
        Ok(Self { table, name: name.to_string(), embedder })
    }

    fn to_record_batch(&self, ids: &[String], documents: &[String], metadatas: &[ChunkMetadata], vectors: Vec<Vec<f32>>) -> Result<RecordBatch> {
        let dim = self.embedder.dim() as i32;
        let now = Utc::now().timestamp_millis();
        let sources: Vec<&str> = metadatas.iter().map(|m| m.source.as_str()).collect();
        let vectors = vectors.into_iter().map(|v| Some(v.into_iter().map(Some).collect::<Vec<_>>()));
        Ok(RecordBatch::try_new(build_collection_schema(dim), vec![
            Arc::new(StringArray::from(ids.to_vec())),
            Arc::new(StringArray::from(documents.to_vec())),
            Arc::new(StringArray::from(sources)),
            Arc::new(TimestampMillisecondArray::from(vec![now; ids.len()])),
            Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, dim)),
        ])?)
    }

    fn embed_with_progress(&self, documents: &[String]) -> Result<Vec<Vec<f32>>> {
        let pb = ProgressBar::new(documents.len() as u64);
        pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?.progress_chars("#>-"));
        let mut vectors = Vec::with_capacity(documents.len());
        for batch in documents.chunks(EMBED_BATCH) {
            vectors.extend(self.embedder.embed_batch(batch)?);
            pb.set_position(vectors.len() as u64);
        }
        pb.finish_and_clear();
        Ok(vectors)
    }
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| anyhow!("missing {} column", name))
}

#[async_trait]
impl ChunkStore for LanceCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, ids: &[String], documents: &[String], metadatas: &[ChunkMetadata]) -> Result<usize> {
        if ids.len() != documents.len() || ids.len() != metadatas.len() {
            return Err(anyhow!("add: {} ids, {} documents, {} metadatas", ids.len(), documents.len(), metadatas.len()));
        }
        if ids.is_empty() {
            return Ok(0);
        }
        let vectors = self.embed_with_progress(documents)?;
        let batch = self.to_record_batch(ids, documents, metadatas, vectors)?;
        let schema = batch.schema();
        let reader: Box<dyn RecordBatchReader + Send> = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        // upsert keyed by id so re-ingesting a folder does not duplicate rows
        let mut mi = self.table.merge_insert(&[ID_COL]);
        mi.when_matched_update_all(None).when_not_matched_insert_all();
        mi.execute(reader).await?;
        tracing::info!(collection = %self.name, rows = ids.len(), "upserted chunks");
        Ok(ids.len())
    }

    async fn query(&self, text: &str, n_results: usize) -> Result<Vec<QueryHit>> {
        if n_results == 0 || self.count().await? == 0 {
            return Ok(Vec::new());
        }
        let query_vec = self.embedder.embed(text)?;
        let mut stream = self.table.query()
            .nearest_to(query_vec)?
            .distance_type(DistanceType::L2)
            .limit(n_results)
            .execute().await?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            let ids = string_col(&batch, ID_COL)?;
            let docs = string_col(&batch, DOCUMENT_COL)?;
            let sources = string_col(&batch, SOURCE_COL)?;
            let distances = batch.column_by_name(DISTANCE_COL)
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| anyhow!("missing {} column", DISTANCE_COL))?;
            for i in 0..batch.num_rows() {
                hits.push(QueryHit {
                    id: ids.value(i).to_string(),
                    content: docs.value(i).to_string(),
                    metadata: ChunkMetadata { source: sources.value(i).to_string() },
                    distance: if distances.is_null(i) { f32::INFINITY } else { distances.value(i) },
                });
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(n_results);
        Ok(hits)
    }

    async fn get(&self, limit: Option<usize>) -> Result<Vec<StoredChunk>> {
        let mut query = self.table.query().select(lancedb::query::Select::columns(&[ID_COL, DOCUMENT_COL, SOURCE_COL]));
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let mut stream = query.execute().await?;
        let mut rows = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            let ids = string_col(&batch, ID_COL)?;
            let docs = string_col(&batch, DOCUMENT_COL)?;
            let sources = string_col(&batch, SOURCE_COL)?;
            for i in 0..batch.num_rows() {
                rows.push(StoredChunk {
                    id: ids.value(i).to_string(),
                    content: docs.value(i).to_string(),
                    metadata: ChunkMetadata { source: sources.value(i).to_string() },
                });
            }
        }
        Ok(rows)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.count_rows(None).await?)
    }
}
