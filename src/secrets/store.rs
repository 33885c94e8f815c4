//! 密钥存储：trait、JSON 文件实现、进程内缓存
//!
//! 文件格式：`{ "<secret name>": { "<region>": <secret> } }`，secret 可以是 JSON 对象，
//! 也可以是已序列化的 JSON 字符串（与 SecretString 一致）。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SecretError {
    #[error("secret '{name}' not found in region '{region}'")]
    NotFound { name: String, region: String },

    #[error("secret store unreadable: {0}")]
    Io(String),

    #[error("secret is malformed: {0}")]
    Malformed(String),
}

/// 远端 / 本地密钥存储
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// 返回密钥的 JSON 对象字符串
    async fn get_secret(&self, name: &str, region: &str) -> Result<String, SecretError>;
}

/// JSON 文件密钥存储
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, name: &str, region: &str) -> Result<String, SecretError> {
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SecretError::Io(format!("{}: {}", self.path.display(), e)))?;
        let root: serde_json::Value =
            serde_json::from_str(&data).map_err(|e| SecretError::Malformed(e.to_string()))?;

        let not_found = || SecretError::NotFound {
            name: name.to_string(),
            region: region.to_string(),
        };
        match root.get(name).and_then(|by_region| by_region.get(region)) {
            Some(serde_json::Value::String(s)) => Ok(s.clone()),
            Some(v @ serde_json::Value::Object(_)) => Ok(v.to_string()),
            Some(_) => Err(SecretError::Malformed(format!(
                "secret '{}' must be an object or a JSON string",
                name
            ))),
            None => Err(not_found()),
        }
    }
}

/// 缓存包装：同一 (name, region) 只查询一次
pub struct CachedSecretStore<S> {
    inner: S,
    cache: RwLock<HashMap<(String, String), String>>,
}

impl<S: SecretStore> CachedSecretStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &(String, String)) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl<S: SecretStore> SecretStore for CachedSecretStore<S> {
    async fn get_secret(&self, name: &str, region: &str) -> Result<String, SecretError> {
        let key = (name.to_string(), region.to_string());
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }
        let secret = self.inner.get_secret(name, region).await?;
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, secret.clone());
        Ok(secret)
    }
}
