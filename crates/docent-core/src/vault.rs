use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Wrapper for sensitive strings with redacted Debug/Display.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Source of secret values such as API keys.
pub trait VaultProvider: Send + Sync {
    fn get_secret(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + '_>>;
}

/// Reads secrets from process environment variables. Empty values count as unset.
pub struct EnvVaultProvider;

impl VaultProvider for EnvVaultProvider {
    fn get_secret(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + '_>> {
        let value = std::env::var(key).ok().filter(|v| !v.is_empty());
        Box::pin(async move { Ok(value) })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn secret_is_redacted() {
        let secret = Secret::new("sk-live-123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    fn secret_deserializes_transparently() {
        let secret: Secret = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(secret.expose(), "abc");
    }

    #[tokio::test]
    #[serial]
    async fn env_vault_reads_variable() {
        unsafe { std::env::set_var("DOCENT_TEST_VAULT_KEY", "value") };
        let got = EnvVaultProvider
            .get_secret("DOCENT_TEST_VAULT_KEY")
            .await
            .unwrap();
        unsafe { std::env::remove_var("DOCENT_TEST_VAULT_KEY") };
        assert_eq!(got.as_deref(), Some("value"));
    }

    #[tokio::test]
    #[serial]
    async fn env_vault_treats_empty_as_missing() {
        unsafe { std::env::set_var("DOCENT_TEST_VAULT_EMPTY", "") };
        let got = EnvVaultProvider
            .get_secret("DOCENT_TEST_VAULT_EMPTY")
            .await
            .unwrap();
        unsafe { std::env::remove_var("DOCENT_TEST_VAULT_EMPTY") };
        assert!(got.is_none());
    }
}
