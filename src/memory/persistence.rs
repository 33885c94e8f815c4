//! 会话持久化（可选）
//!
//! 将整个 Session（轮次、事实、分数、频次）写入 / 从 JSON 文件加载，用于跨进程恢复。
//! 未配置 `app.persist_path` 时不启用。

use std::path::{Path, PathBuf};

use crate::core::Session;

/// 单文件 JSON 持久化
#[derive(Debug, Clone)]
pub struct SessionPersistence {
    path: PathBuf,
}

impl SessionPersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从 JSON 文件加载；文件不存在时返回 None
    pub fn load(&self) -> anyhow::Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&data)?;
        Ok(Some(session))
    }

    /// 写入 JSON 文件；父目录不存在时自动创建
    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{EmotionLabel, ScoreTracker};
    use crate::memory::Turn;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let p = SessionPersistence::new(dir.path().join("nope.json"));
        assert!(p.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_restores_state() {
        let dir = TempDir::new().unwrap();
        let p = SessionPersistence::new(dir.path().join("nested/session.json"));

        let mut session = Session::default();
        session.apply_emotion(&ScoreTracker::default(), EmotionLabel::Sadness);
        session.append_turn(Turn::user("I failed my exam", EmotionLabel::Sadness));
        session.append_turn(Turn::assistant("That sounds hard."));
        session.remember_fact("failed an exam");
        p.save(&session).unwrap();

        let restored = p.load().unwrap().unwrap();
        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.turns().len(), 2);
        assert_eq!(restored.facts().facts(), &["failed an exam".to_string()]);
        assert_eq!(restored.score().value(), 49);
        assert_eq!(restored.tally().count(EmotionLabel::Sadness), 1);
    }
}
