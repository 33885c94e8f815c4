//! CSV 导出（RFC 4180 引号规则）

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::core::AppError;
use crate::export::{ExportReceipt, ExportRow, ExportSink};

pub const CSV_HEADER: &str = "User_msg,Bot_msg,emotion";

/// 同名文件已存在时最多尝试的序号
const MAX_NAME_ATTEMPTS: usize = 1000;

/// `<prefix>_<YYYYMMDD_HHMMSS>.csv`
pub fn export_filename(prefix: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.csv", prefix, at.format("%Y%m%d_%H%M%S"))
}

/// 第 n 次尝试的文件名：n = 0 为原名，之后为 `<prefix>_<时间戳>_<n>.csv`
fn numbered_filename(prefix: &str, at: DateTime<Local>, attempt: usize) -> String {
    if attempt == 0 {
        export_filename(prefix, at)
    } else {
        format!("{}_{}_{}.csv", prefix, at.format("%Y%m%d_%H%M%S"), attempt)
    }
}

/// 含逗号、引号或换行的字段加双引号，内部引号加倍
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn render(rows: &[ExportRow]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");
    for row in rows {
        out.push_str(&quote_field(&row.user_msg));
        out.push(',');
        out.push_str(&quote_field(&row.bot_msg));
        out.push(',');
        out.push_str(row.emotion.as_str());
        out.push_str("\r\n");
    }
    out
}

/// 写入 `<dir>/<prefix>_<时间戳>.csv`；不覆盖已有文件
#[derive(Debug, Clone)]
pub struct CsvExportSink {
    dir: PathBuf,
    prefix: String,
}

impl CsvExportSink {
    pub fn new(dir: impl AsRef<Path>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.into(),
        }
    }

    /// create_new 打开第一个不存在的文件名
    async fn create_unique(&self, at: DateTime<Local>) -> std::io::Result<(PathBuf, File)> {
        tokio::fs::create_dir_all(&self.dir).await?;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(numbered_filename(&self.prefix, at, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "no free export filename",
        ))
    }
}

#[async_trait]
impl ExportSink for CsvExportSink {
    async fn export(&self, rows: &[ExportRow]) -> Result<ExportReceipt, AppError> {
        if rows.is_empty() {
            return Ok(ExportReceipt { path: None, rows: 0 });
        }

        let at = Local::now();
        let (path, mut file) = self.create_unique(at).await.map_err(|source| AppError::Export {
            path: self.dir.join(export_filename(&self.prefix, at)),
            source,
        })?;
        let write = async {
            file.write_all(render(rows).as_bytes()).await?;
            file.flush().await
        };
        write.await.map_err(|source| AppError::Export {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), rows = rows.len(), "conversation exported");
        Ok(ExportReceipt {
            path: Some(path),
            rows: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionLabel;
    use chrono::TimeZone;

    fn row(user: &str, bot: &str, emotion: EmotionLabel) -> ExportRow {
        ExportRow {
            user_msg: user.to_string(),
            bot_msg: bot.to_string(),
            emotion,
        }
    }

    #[test]
    fn test_filename_pattern() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(export_filename("emogenie_chat", at), "emogenie_chat_20240309_070501.csv");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote_field("plain"), "plain");
        assert_eq!(quote_field("a, b"), "\"a, b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("two\nlines"), "\"two\nlines\"");
    }

    #[tokio::test]
    async fn test_export_writes_header_and_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let sink = CsvExportSink::new(dir.path().join("out"), "chat");
        let rows = vec![
            row("I got promoted", "Congrats!", EmotionLabel::Happiness),
            row("but, honestly, tired", "Rest up.", EmotionLabel::Sadness),
        ];
        let receipt = sink.export(&rows).await.unwrap();
        assert_eq!(receipt.rows, 2);

        let path = receipt.path.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("chat_") && name.ends_with(".csv"));

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "I got promoted,Congrats!,happiness");
        assert_eq!(lines[2], "\"but, honestly, tired\",Rest up.,sadness");
    }

    #[tokio::test]
    async fn test_exports_in_same_second_do_not_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let sink = CsvExportSink::new(dir.path(), "chat");
        let first = sink
            .export(&[row("first", "one", EmotionLabel::Joy)])
            .await
            .unwrap();
        let second = sink
            .export(&[row("second", "two", EmotionLabel::Anger)])
            .await
            .unwrap();

        let (first, second) = (first.path.unwrap(), second.path.unwrap());
        assert_ne!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        assert!(std::fs::read_to_string(&first).unwrap().contains("first,one,joy"));
        assert!(std::fs::read_to_string(&second).unwrap().contains("second,two,anger"));
    }

    #[test]
    fn test_numbered_filename_suffix() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(numbered_filename("chat", at, 0), "chat_20240309_070501.csv");
        assert_eq!(numbered_filename("chat", at, 2), "chat_20240309_070501_2.csv");
    }

    #[tokio::test]
    async fn test_zero_rows_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let sink = CsvExportSink::new(dir.path(), "chat");
        let receipt = sink.export(&[]).await.unwrap();
        assert_eq!(receipt, ExportReceipt { path: None, rows: 0 });
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
