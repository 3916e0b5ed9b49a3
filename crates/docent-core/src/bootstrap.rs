//! Application bootstrap: config resolution, provider and service construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use docent_llm::LlmProvider;
use docent_llm::openai::OpenAiProvider;
use docent_memory::{DocumentLoader, SplitterConfig};

use crate::config::Config;
use crate::rag::RagService;
use crate::vault::{EnvVaultProvider, VaultProvider};
use crate::workspace::DocumentWorkspace;

pub struct AppBuilder {
    config: Config,
    config_path: PathBuf,
}

impl AppBuilder {
    /// Load and validate the config at `config_path`, then resolve secrets from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be parsed, is inconsistent, or the vault fails.
    pub async fn load(config_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Self::load_with_vault(config_path, &EnvVaultProvider).await
    }

    /// # Errors
    ///
    /// See [`AppBuilder::load`].
    pub async fn load_with_vault(
        config_path: impl Into<PathBuf>,
        vault: &dyn VaultProvider,
    ) -> anyhow::Result<Self> {
        let config_path = config_path.into();
        let mut config = Config::load(&config_path)?;
        config.validate()?;
        config.resolve_secrets(vault).await?;
        Ok(Self {
            config,
            config_path,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// # Errors
    ///
    /// See [`create_provider`].
    pub fn build_provider(&self) -> anyhow::Result<OpenAiProvider> {
        create_provider(&self.config)
    }

    #[must_use]
    pub fn build_service<P: LlmProvider>(&self, provider: P) -> RagService<P> {
        create_service(&self.config, provider)
    }
}

/// Build the OpenAI-compatible provider from `[llm]` and the resolved API key.
///
/// # Errors
///
/// Returns an error if no API key was resolved.
pub fn create_provider(config: &Config) -> anyhow::Result<OpenAiProvider> {
    let api_key = config
        .secrets
        .openai_api_key
        .as_ref()
        .context("OPENAI_API_KEY not set (or DOCENT_OPENAI_API_KEY)")?
        .expose()
        .to_owned();

    let llm = &config.llm;
    Ok(OpenAiProvider::new(
        api_key,
        llm.base_url.clone(),
        llm.model.clone(),
        Some(llm.embedding_model.clone()),
    )
    .with_temperature(llm.temperature)
    .with_max_tokens(llm.max_tokens)
    .with_max_retries(llm.max_retries)
    .with_embed_batch_size(llm.embed_batch_size))
}

/// Workspace over the configured folders, accepting what the configured loader reads.
#[must_use]
pub fn create_workspace(config: &Config) -> DocumentWorkspace {
    let loader = create_loader(config);
    DocumentWorkspace::new(&config.storage.data_dir, &config.storage.index_dir)
        .with_extensions(loader.supported_extensions())
}

/// Wire a [`RagService`] from config around an already constructed provider.
#[must_use]
pub fn create_service<P: LlmProvider>(config: &Config, provider: P) -> RagService<P> {
    RagService::new(
        provider,
        create_workspace(config),
        config.llm.embedding_model.clone(),
    )
    .with_loader(create_loader(config))
    .with_splitter(SplitterConfig {
        chunk_size: config.retrieval.chunk_size,
        chunk_overlap: config.retrieval.chunk_overlap,
        ..SplitterConfig::default()
    })
    .with_top_k(config.retrieval.top_k)
    .with_quota(config.session.max_queries)
    .with_max_sessions(config.session.max_sessions)
}

#[cfg(feature = "pdf")]
fn create_loader(config: &Config) -> Arc<dyn DocumentLoader> {
    Arc::new(docent_memory::PdfLoader {
        max_file_size: config.storage.max_file_size,
    })
}

#[cfg(not(feature = "pdf"))]
fn create_loader(config: &Config) -> Arc<dyn DocumentLoader> {
    Arc::new(docent_memory::TextLoader {
        max_file_size: config.storage.max_file_size,
    })
}
