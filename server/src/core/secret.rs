//! Secret storage for the session signing key
//!
//! Secrets live in a JSON vault (`secrets.json`) inside the data directory.
//! The session signing key can be pinned through an environment variable,
//! which takes precedence over the vault and is never written back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::constants::{ENV_SESSION_SECRET, SECRET_KEY_JWT_SIGNING, SECRETS_FILE_NAME};
use super::storage::AppStorage;
use crate::utils::crypto;

/// Where the signing key was obtained from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretBackend {
    /// Hex key taken from the environment
    Env,
    /// JSON vault on disk
    File(PathBuf),
}

impl SecretBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Env => "environment",
            Self::File(_) => "file",
        }
    }
}

/// Metadata associated with a stored secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SecretMetadata {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for SecretMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A secret with its value and metadata
#[derive(Clone, Serialize, Deserialize)]
pub struct Secret {
    pub value: String,
    pub metadata: SecretMetadata,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("value", &"[REDACTED]")
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            metadata: SecretMetadata::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SecretVault {
    secrets: HashMap<String, Secret>,
}

/// File-backed secret manager
///
/// The vault is cached in memory after the initial load; writes update
/// both the cache and the file.
#[derive(Debug, Clone)]
pub struct SecretManager {
    backend: SecretBackend,
    path: PathBuf,
    vault: Arc<RwLock<SecretVault>>,
    /// Serializes file writes
    save_mutex: Arc<tokio::sync::Mutex<()>>,
}

impl SecretManager {
    /// Initialize the secret manager from the data directory
    pub async fn init(storage: &AppStorage) -> Result<Self> {
        Self::init_at(storage.data_path(SECRETS_FILE_NAME)).await
    }

    async fn init_at(path: PathBuf) -> Result<Self> {
        let backend = if std::env::var(ENV_SESSION_SECRET).is_ok() {
            SecretBackend::Env
        } else {
            SecretBackend::File(path.clone())
        };

        let vault = Self::load_vault_from_file(&path).await?;

        tracing::debug!(backend = backend.name(), "Secret manager initialized");
        Ok(Self {
            backend,
            path,
            vault: Arc::new(RwLock::new(vault)),
            save_mutex: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Get the active backend type
    pub fn backend(&self) -> &SecretBackend {
        &self.backend
    }

    /// Store a secret
    pub async fn set(&self, name: &str, mut secret: Secret) -> Result<()> {
        {
            let mut vault = self.vault.write().await;
            if let Some(existing) = vault.secrets.get(name) {
                secret.metadata.created_at = existing.metadata.created_at;
            }
            secret.metadata.updated_at = Utc::now();
            vault.secrets.insert(name.to_string(), secret);
        }
        self.save_vault_to_file().await?;
        tracing::debug!(name, "Stored secret");
        Ok(())
    }

    /// Get just the secret value
    pub async fn get_value(&self, name: &str) -> Option<String> {
        let vault = self.vault.read().await;
        vault.secrets.get(name).map(|s| s.value.clone())
    }

    /// Ensure all required secrets exist, creating them if needed
    pub async fn ensure_secrets(&self) -> Result<()> {
        if self.backend == SecretBackend::Env {
            return Ok(());
        }
        self.get_jwt_signing_key().await.map(|_| ())
    }

    /// Get the JWT signing key, creating it if it doesn't exist
    pub async fn get_jwt_signing_key(&self) -> Result<Vec<u8>> {
        if self.backend == SecretBackend::Env {
            let key_hex = std::env::var(ENV_SESSION_SECRET)
                .with_context(|| format!("{} is not set", ENV_SESSION_SECRET))?;
            return decode_signing_key(&key_hex)
                .ok_or_else(|| anyhow!("{} must be 64 hex characters", ENV_SESSION_SECRET));
        }

        match self.get_value(SECRET_KEY_JWT_SIGNING).await {
            Some(key_hex) => match decode_signing_key(&key_hex) {
                Some(key) => Ok(key),
                None => {
                    tracing::warn!("Stored JWT signing key has invalid format, regenerating");
                    self.create_jwt_signing_key().await
                }
            },
            None => self.create_jwt_signing_key().await,
        }
    }

    async fn create_jwt_signing_key(&self) -> Result<Vec<u8>> {
        let key = crypto::generate_signing_key();
        self.set(SECRET_KEY_JWT_SIGNING, Secret::new(crypto::encode_hex(&key)))
            .await?;
        tracing::debug!("Created new JWT signing key");
        Ok(key)
    }

    async fn load_vault_from_file(path: &Path) -> Result<SecretVault> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => {
                let vault: SecretVault =
                    serde_json::from_str(&json).context("Failed to parse secrets file")?;
                tracing::debug!(count = vault.secrets.len(), "Loaded secrets from file");
                Ok(vault)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No existing secrets file, creating new vault");
                Ok(SecretVault::default())
            }
            Err(e) => Err(anyhow!("Failed to load secrets file: {}", e)),
        }
    }

    async fn save_vault_to_file(&self) -> Result<()> {
        let _guard = self.save_mutex.lock().await;
        let json = {
            let vault = self.vault.read().await;
            serde_json::to_string_pretty(&*vault).context("Failed to serialize vault")?
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create secrets directory")?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .context("Failed to write secrets file")?;
        Ok(())
    }
}

fn decode_signing_key(key_hex: &str) -> Option<Vec<u8>> {
    crypto::decode_hex(key_hex.trim())
        .ok()
        .filter(|key| key.len() == 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_redacts_value() {
        let secret = Secret::new("super-secret-key");
        let debug = format!("{:?}", secret);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-key"));
    }

    #[test]
    fn test_vault_serialization() {
        let mut vault = SecretVault::default();
        vault
            .secrets
            .insert("key1".to_string(), Secret::new("value1"));

        let json = serde_json::to_string(&vault).unwrap();
        let deserialized: SecretVault = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.secrets.len(), 1);
        assert_eq!(deserialized.secrets.get("key1").unwrap().value, "value1");
    }

    #[test]
    fn test_decode_signing_key() {
        assert_eq!(decode_signing_key(&"ab".repeat(32)), Some(vec![0xab; 32]));
        assert!(decode_signing_key("abcd").is_none());
        assert!(decode_signing_key("not hex").is_none());
    }

    #[tokio::test]
    async fn test_signing_key_persists_across_loads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(SECRETS_FILE_NAME);

        let first = SecretManager::init_at(path.clone()).await.unwrap();
        if first.backend() == &SecretBackend::Env {
            return;
        }
        let key = first.get_jwt_signing_key().await.unwrap();
        assert_eq!(key.len(), 32);
        assert!(path.exists());

        let second = SecretManager::init_at(path).await.unwrap();
        assert_eq!(second.get_jwt_signing_key().await.unwrap(), key);
    }
}
