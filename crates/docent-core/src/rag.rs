//! Index building and question answering over the uploaded documents.

use std::collections::BTreeSet;
use std::sync::Arc;

use docent_llm::{LlmProvider, Message};
use docent_memory::document::{concat_documents, load_folder};
use docent_memory::{
    Document, DocumentLoader, IndexManifest, ScoredChunk, SplitterConfig, TextSplitter,
    VectorIndex,
};
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::prompt::build_prompt;
use crate::session::{ChatEntry, QueryQuota, SessionStore};
use crate::workspace::{DocumentWorkspace, ResetReport};

const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
    pub dimension: usize,
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    /// Retrieved chunks the answer was grounded on, best match first.
    pub sources: Vec<ScoredChunk>,
    /// `None` when the session has no query limit.
    pub queries_remaining: Option<u32>,
}

pub struct RagService<P> {
    provider: P,
    loader: Arc<dyn DocumentLoader>,
    workspace: DocumentWorkspace,
    splitter: TextSplitter,
    sessions: SessionStore,
    quota: QueryQuota,
    top_k: usize,
    embedding_model: String,
    // rebuild and reset both rewrite the index folder
    index_lock: Mutex<()>,
}

impl<P: LlmProvider> RagService<P> {
    /// Service with the default PDF loader, splitter settings, and a 20-question quota.
    #[must_use]
    pub fn new(
        provider: P,
        workspace: DocumentWorkspace,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            loader: default_loader(),
            workspace,
            splitter: TextSplitter::new(SplitterConfig::default()),
            sessions: SessionStore::default(),
            quota: QueryQuota::new(20),
            top_k: DEFAULT_TOP_K,
            embedding_model: embedding_model.into(),
            index_lock: Mutex::new(()),
        }
    }

    /// Replace the document loader. Uploads are limited to its extensions.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.workspace.set_extensions(loader.supported_extensions());
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn with_splitter(mut self, config: SplitterConfig) -> Self {
        self.splitter = TextSplitter::new(config);
        self
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    #[must_use]
    pub fn with_quota(mut self, max_queries: u32) -> Self {
        self.quota = QueryQuota::new(max_queries);
        self
    }

    #[must_use]
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.sessions = SessionStore::new(max_sessions);
        self
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn workspace(&self) -> &DocumentWorkspace {
        &self.workspace
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn quota(&self) -> QueryQuota {
        self.quota
    }

    /// # Errors
    ///
    /// See [`DocumentWorkspace::save_upload`].
    pub async fn upload(&self, name: &str, bytes: &[u8]) -> Result<(), CoreError> {
        self.workspace.save_upload(name, bytes).await.map(|_| ())
    }

    /// # Errors
    ///
    /// See [`DocumentWorkspace::list_files`].
    pub async fn list_files(&self) -> Result<Vec<String>, CoreError> {
        self.workspace.list_files().await
    }

    /// Re-read every uploaded document and replace the persisted index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] when there is nothing to index, and
    /// propagates loader, embedding, and storage failures.
    pub async fn rebuild_index(&self) -> Result<IndexStats, CoreError> {
        let _guard = self.index_lock.lock().await;

        let documents = load_folder(self.workspace.data_dir(), self.loader.as_ref()).await?;
        let sources = source_names(&documents);
        let text = concat_documents(&documents);
        let chunks = self.splitter.split_text(&text);
        if chunks.is_empty() {
            return Err(CoreError::NotFound(
                "No text could be extracted from the uploaded documents.".into(),
            ));
        }
        tracing::info!(
            files = sources.len(),
            chunks = chunks.len(),
            "embedding document chunks"
        );

        let vectors = self.provider.embed_batch(&chunks).await?;
        let dimension = vectors.first().map_or(0, Vec::len);
        let documents = sources.len();
        let manifest = IndexManifest::new(self.embedding_model.clone(), dimension, sources);
        let index = VectorIndex::build(manifest, chunks, vectors)?;
        index.save(&self.workspace.index_path()).await?;

        let stats = IndexStats {
            documents,
            chunks: index.len(),
            dimension,
        };
        tracing::info!(?stats, "index rebuilt");
        Ok(stats)
    }

    /// Answer `question` for `session_id` from the persisted index.
    ///
    /// The quota is checked before any model call and only answered questions count.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyQuestion`], [`CoreError::QuotaExceeded`],
    /// [`CoreError::NotFound`] when no index has been built, or the underlying
    /// embedding/chat failure.
    pub async fn ask(&self, session_id: &str, question: &str) -> Result<Answer, CoreError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(CoreError::EmptyQuestion);
        }

        let quota = self.quota;
        self.sessions
            .with_session(session_id, |s| quota.reserve(s))
            .await?;

        match self.answer(question).await {
            Ok((text, sources)) => {
                let queries_remaining = self
                    .sessions
                    .with_session(session_id, |s| {
                        quota.commit(s, question, &text);
                        quota.remaining(s)
                    })
                    .await;
                Ok(Answer {
                    text,
                    sources,
                    queries_remaining,
                })
            }
            Err(e) => {
                self.sessions
                    .with_session(session_id, |s| quota.release(s))
                    .await;
                Err(e)
            }
        }
    }

    async fn answer(&self, question: &str) -> Result<(String, Vec<ScoredChunk>), CoreError> {
        let index = VectorIndex::load(&self.workspace.index_path()).await?;
        if index.manifest.embedding_model != self.embedding_model {
            tracing::warn!(
                index_model = %index.manifest.embedding_model,
                configured = %self.embedding_model,
                "index was built with a different embedding model; rebuild it"
            );
        }

        let query = self.provider.embed(question).await?;
        let hits = index.search(&query, self.top_k)?;
        for hit in &hits {
            tracing::debug!(chunk = hit.chunk_index, score = hit.score, "retrieved chunk");
        }

        let prompt = build_prompt(&hits, question);
        let text = self.provider.chat(&[Message::user(prompt)]).await?;
        Ok((text, hits))
    }

    /// Delete the index and all uploads. Chat sessions are left untouched.
    ///
    /// # Errors
    ///
    /// See [`DocumentWorkspace::reset`].
    pub async fn reset(&self) -> Result<ResetReport, CoreError> {
        let _guard = self.index_lock.lock().await;
        self.workspace.reset().await
    }

    pub async fn create_session(&self) -> String {
        self.sessions.create().await
    }

    /// History of `session_id`, newest first. Unknown sessions have none.
    pub async fn history(&self, session_id: &str) -> Vec<ChatEntry> {
        self.sessions
            .get(session_id)
            .await
            .map(|s| s.history_newest_first())
            .unwrap_or_default()
    }

    pub async fn clear_history(&self, session_id: &str) {
        if self.sessions.contains(session_id).await {
            self.sessions
                .with_session(session_id, crate::session::Session::clear_history)
                .await;
        }
    }

    /// Questions left for `session_id`, `None` when unlimited.
    pub async fn queries_remaining(&self, session_id: &str) -> Option<u32> {
        let used = self
            .sessions
            .get(session_id)
            .await
            .map_or(0, |s| s.queries_used);
        (!self.quota.is_unlimited()).then(|| self.quota.max_queries.saturating_sub(used))
    }
}

fn source_names(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .map(|d| {
            d.metadata
                .extra
                .get("file_name")
                .cloned()
                .unwrap_or_else(|| d.metadata.source.clone())
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(feature = "pdf")]
fn default_loader() -> Arc<dyn DocumentLoader> {
    Arc::new(docent_memory::PdfLoader::default())
}

#[cfg(not(feature = "pdf"))]
fn default_loader() -> Arc<dyn DocumentLoader> {
    Arc::new(docent_memory::TextLoader::default())
}
