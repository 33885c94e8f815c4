//! 进程级错误类型
//!
//! 提供方调用失败不在这里出现（适配器内部已折叠为兜底值）；这里只有启动期与外部协作方的错误。

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// 凭证获取失败：启动期致命
    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Export to {path:?} failed: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
