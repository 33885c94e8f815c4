//! 凭证来源：环境变量或远端密钥存储
//!
//! 密钥存储按 `get_secret(name, region)` 返回 JSON 对象字符串
//! （如 `{"OPENAI_API_KEY": "sk-..."}`），结果在进程内缓存，并在构建 LLM 客户端前逐项注入环境变量。
//! 任何一步失败都是启动期致命错误，不存在降级模式。

pub mod store;

use std::collections::BTreeMap;

use crate::config::{SecretSourceKind, SecretsSection};
use crate::core::AppError;

pub use store::{CachedSecretStore, FileSecretStore, SecretError, SecretStore};

/// 解析 API Key 的入口
pub struct CredentialSource<S: SecretStore> {
    settings: SecretsSection,
    store: Option<CachedSecretStore<S>>,
}

impl CredentialSource<FileSecretStore> {
    /// 根据配置选择来源；file 来源使用 FileSecretStore
    pub fn from_config(settings: &SecretsSection) -> Self {
        let store = match settings.source {
            SecretSourceKind::Env => None,
            SecretSourceKind::File => {
                Some(CachedSecretStore::new(FileSecretStore::new(&settings.file)))
            }
        };
        Self {
            settings: settings.clone(),
            store,
        }
    }
}

impl<S: SecretStore> CredentialSource<S> {
    /// 使用任意密钥存储（测试或其它后端）
    pub fn with_store(settings: &SecretsSection, store: S) -> Self {
        Self {
            settings: settings.clone(),
            store: Some(CachedSecretStore::new(store)),
        }
    }

    /// 解析 API Key：密钥存储模式下先注入环境变量，再统一从 `env_var` 读取
    pub async fn resolve_api_key(&self) -> Result<String, AppError> {
        if let Some(store) = &self.store {
            let secret = store
                .get_secret(&self.settings.secret_name, &self.settings.region)
                .await
                .map_err(|e| AppError::CredentialUnavailable(e.to_string()))?;
            let pairs = parse_secret_pairs(&secret)
                .map_err(|e| AppError::CredentialUnavailable(e.to_string()))?;
            inject_env(&pairs);
            tracing::info!(
                secret = %self.settings.secret_name,
                keys = pairs.len(),
                "secret loaded into environment"
            );
        }

        match std::env::var(&self.settings.env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::CredentialUnavailable(format!(
                "{} is not set",
                self.settings.env_var
            ))),
        }
    }
}

/// 解析密钥 JSON；值必须是字符串
pub fn parse_secret_pairs(secret: &str) -> Result<BTreeMap<String, String>, SecretError> {
    serde_json::from_str(secret).map_err(|e| SecretError::Malformed(e.to_string()))
}

/// 把密钥逐项写入进程环境（只在启动期单线程阶段调用）
pub fn inject_env(pairs: &BTreeMap<String, String>) {
    for (key, value) in pairs {
        std::env::set_var(key, value);
    }
}
