//! Flat vector index over chunk embeddings, persisted and reloaded wholesale.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const INDEX_FILE: &str = "index.json";

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("No vector index found. Please upload documents and rebuild the index first.")]
    NotFound,

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("{chunks} chunks but {vectors} vectors")]
    LengthMismatch { chunks: usize, vectors: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt index file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub embedding_model: String,
    pub dimension: usize,
    pub sources: Vec<String>,
    pub built_at: String,
}

impl IndexManifest {
    #[must_use]
    pub fn new(
        embedding_model: impl Into<String>,
        dimension: usize,
        sources: Vec<String>,
    ) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            dimension,
            sources,
            built_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk_index: usize,
    pub text: String,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk_index: usize,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    pub manifest: IndexManifest,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Pair each chunk with its embedding. Chunk positions become `chunk_index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the counts differ or a vector does not match
    /// `manifest.dimension`.
    pub fn build(
        manifest: IndexManifest,
        chunks: Vec<String>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, IndexError> {
        if chunks.len() != vectors.len() {
            return Err(IndexError::LengthMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != manifest.dimension) {
            return Err(IndexError::Dimension {
                expected: manifest.dimension,
                actual: bad.len(),
            });
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(chunk_index, (text, vector))| IndexEntry {
                chunk_index,
                text,
                vector,
            })
            .collect();

        Ok(Self { manifest, entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Exact cosine-similarity scan, best match first.
    ///
    /// # Errors
    ///
    /// Returns an error if `query` does not match the index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        if query.len() != self.manifest.dimension {
            return Err(IndexError::Dimension {
                expected: self.manifest.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|e| ScoredChunk {
                chunk_index: e.chunk_index,
                text: e.text.clone(),
                score: cosine_similarity(query, &e.vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk_index.cmp(&b.chunk_index))
        });
        scored.truncate(k);
        Ok(scored)
    }

    #[must_use]
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    pub async fn exists(dir: &Path) -> bool {
        tokio::fs::try_exists(Self::file_path(dir))
            .await
            .unwrap_or(false)
    }

    /// Write the whole index to `dir`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file written.
    pub async fn save(&self, dir: &Path) -> Result<(), IndexError> {
        tokio::fs::create_dir_all(dir).await?;
        let bytes = serde_json::to_vec(self)?;
        let path = Self::file_path(dir);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::info!(
            path = %path.display(),
            chunks = self.entries.len(),
            dimension = self.manifest.dimension,
            "vector index saved"
        );
        Ok(())
    }

    /// Read the whole index from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NotFound`] if no index was saved there.
    pub async fn load(dir: &Path) -> Result<Self, IndexError> {
        let bytes = match tokio::fs::read(Self::file_path(dir)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::NotFound);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(dimension: usize) -> IndexManifest {
        IndexManifest::new("test-embed", dimension, vec!["a.pdf".into()])
    }

    fn sample() -> VectorIndex {
        VectorIndex::build(
            manifest(3),
            vec!["alpha".into(), "beta".into(), "gamma".into()],
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.7, 0.7, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn build_assigns_positions() {
        let index = sample();
        assert_eq!(index.len(), 3);
        let positions: Vec<_> = index.entries().iter().map(|e| e.chunk_index).collect();
        assert_eq!(positions, [0, 1, 2]);
    }

    #[test]
    fn build_rejects_length_mismatch() {
        let result = VectorIndex::build(manifest(2), vec!["a".into()], vec![]);
        assert!(matches!(
            result,
            Err(IndexError::LengthMismatch {
                chunks: 1,
                vectors: 0
            })
        ));
    }

    #[test]
    fn build_rejects_wrong_dimension() {
        let result = VectorIndex::build(manifest(2), vec!["a".into()], vec![vec![1.0]]);
        assert!(matches!(
            result,
            Err(IndexError::Dimension {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn search_orders_by_score_and_truncates() {
        let hits = sample().search(&[1.0, 0.1, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "alpha");
        assert_eq!(hits[1].text, "gamma");
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn search_k_larger_than_index() {
        assert_eq!(sample().search(&[0.0, 1.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn search_rejects_wrong_query_dimension() {
        assert!(matches!(
            sample().search(&[1.0], 3),
            Err(IndexError::Dimension { .. })
        ));
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let index_dir = dir.path().join("db").join("vector-index");
        assert!(!VectorIndex::exists(&index_dir).await);

        let index = sample();
        index.save(&index_dir).await.unwrap();
        assert!(VectorIndex::exists(&index_dir).await);
        assert!(!index_dir.join("index.json.tmp").exists());

        let loaded = VectorIndex::load(&index_dir).await.unwrap();
        assert_eq!(loaded.manifest, index.manifest);
        assert_eq!(loaded.entries(), index.entries());
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = VectorIndex::load(dir.path()).await;
        assert!(matches!(result, Err(IndexError::NotFound)));
    }

    #[tokio::test]
    async fn load_corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.json"), "{not json").unwrap();
        assert!(matches!(
            VectorIndex::load(dir.path()).await,
            Err(IndexError::Json(_))
        ));
    }
}
