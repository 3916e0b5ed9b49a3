mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

use crate::vault::{Secret, VaultProvider};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error naming the first inconsistent setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        if self.llm.embedding_model.trim().is_empty() {
            bail!("llm.embedding_model must not be empty");
        }
        if self.retrieval.chunk_size == 0 {
            bail!("retrieval.chunk_size must be greater than zero");
        }
        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            bail!(
                "retrieval.chunk_overlap ({}) must be smaller than retrieval.chunk_size ({})",
                self.retrieval.chunk_overlap,
                self.retrieval.chunk_size
            );
        }
        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be greater than zero");
        }
        Ok(())
    }

    /// Resolve sensitive configuration values through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        for key in ["DOCENT_OPENAI_API_KEY", "OPENAI_API_KEY"] {
            if let Some(val) = vault.get_secret(key).await?
                && !val.trim().is_empty()
            {
                self.secrets.openai_api_key = Some(Secret::new(val));
                break;
            }
        }
        Ok(())
    }
}
