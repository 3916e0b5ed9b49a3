use serde::{Deserialize, Serialize};

use crate::vault::Secret;

pub(crate) fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

pub(crate) fn default_model() -> String {
    "gpt-4o-mini".into()
}

pub(crate) fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_retries() -> u32 {
    3
}

fn default_embed_batch_size() -> usize {
    64
}

fn default_data_dir() -> String {
    "data".into()
}

fn default_index_dir() -> String {
    "db".into()
}

fn default_max_file_size() -> u64 {
    docent_memory::document::DEFAULT_MAX_FILE_SIZE
}

fn default_chunk_size() -> usize {
    2000
}

fn default_chunk_overlap() -> usize {
    300
}

fn default_top_k() -> usize {
    3
}

fn default_max_queries() -> u32 {
    20
}

fn default_max_sessions() -> usize {
    1000
}

fn default_bind() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_size() -> usize {
    50 * 1024 * 1024
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Folder holding uploaded documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Folder holding the persisted vector index.
    #[serde(default = "default_index_dir")]
    pub index_dir: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            index_dir: default_index_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Answered questions allowed per session. `0` disables the limit.
    #[serde(default = "default_max_queries")]
    pub max_queries: u32,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_queries: default_max_queries(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_body_size", &self.max_body_size)
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            auth_token: None,
            max_body_size: default_max_body_size(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
}
