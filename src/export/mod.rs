//! 对话导出：退出时把 (用户消息, 回复, 情绪) 三元组写入外部存储
//!
//! 默认实现为 CSV 文件，文件名 `<prefix>_<YYYYMMDD_HHMMSS>.csv`。

pub mod csv;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::AppError;
use crate::emotion::EmotionLabel;
use crate::memory::TurnPair;

pub use self::csv::{export_filename, CsvExportSink, CSV_HEADER};

/// 导出的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub user_msg: String,
    pub bot_msg: String,
    pub emotion: EmotionLabel,
}

impl From<TurnPair> for ExportRow {
    fn from(pair: TurnPair) -> Self {
        Self {
            user_msg: pair.user,
            bot_msg: pair.assistant,
            emotion: pair.emotion,
        }
    }
}

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    /// 写入的位置；零行时为 None
    pub path: Option<PathBuf>,
    pub rows: usize,
}

/// 导出目标
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn export(&self, rows: &[ExportRow]) -> Result<ExportReceipt, AppError>;
}
