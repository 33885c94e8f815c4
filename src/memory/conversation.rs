//! 对话记录：Prompt 片段（Message）与会话轮次日志（TurnLog）
//!
//! TurnLog 只追加、不去重、不截断；喂给回复生成器的是 `recent_turns(n)` 的有界视图，
//! 存储本身永远完整。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::emotion::EmotionLabel;

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// 首字母大写形式，用于拼接历史（"User: ..."）
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }
}

/// 发往 LLM 的单条 Prompt 片段
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 会话中的一轮发言；追加后不可变
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// 仅用户发言带情绪
    pub emotion: Option<EmotionLabel>,
    pub timestamp: DateTime<Local>,
}

impl Turn {
    pub fn user(content: impl Into<String>, emotion: EmotionLabel) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            emotion: Some(emotion),
            timestamp: Local::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            emotion: None,
            timestamp: Local::now(),
        }
    }

    /// "HH:MM - User: content"，回复生成器的历史格式
    pub fn to_history_line(&self) -> String {
        format!(
            "{} - {}: {}",
            self.timestamp.format("%H:%M"),
            self.role.label(),
            self.content
        )
    }
}

/// 一对「用户发言 + 助手回复」，导出用
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnPair {
    pub user: String,
    pub assistant: String,
    pub emotion: EmotionLabel,
}

/// 有序轮次日志，按到达顺序保存全部发言
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnLog {
    turns: Vec<Turn>,
}

impl TurnLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// 最近 n 条（按到达顺序）；每次调用都反映当前状态
    pub fn recent_turns(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// 用户情绪时间线（每条用户发言一项）
    pub fn emotions(&self) -> impl Iterator<Item = EmotionLabel> + '_ {
        self.turns.iter().filter_map(|t| t.emotion)
    }

    /// 相邻的 user -> assistant 配对；末尾未回复的用户发言（如 quit）不计入
    pub fn export_pairs(&self) -> Vec<TurnPair> {
        self.turns
            .windows(2)
            .filter_map(|w| match (&w[0], &w[1]) {
                (u, a) if u.role == Role::User && a.role == Role::Assistant => Some(TurnPair {
                    user: u.content.clone(),
                    assistant: a.content.clone(),
                    emotion: u.emotion.unwrap_or(EmotionLabel::Neutral),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(n_pairs: usize) -> TurnLog {
        let mut log = TurnLog::new();
        for i in 0..n_pairs {
            log.append_turn(Turn::user(format!("u{}", i), EmotionLabel::Sadness));
            log.append_turn(Turn::assistant(format!("a{}", i)));
        }
        log
    }

    #[test]
    fn test_append_keeps_arrival_order_without_limit() {
        let log = log_with(30);
        assert_eq!(log.len(), 60);
        assert_eq!(log.turns()[0].content, "u0");
        assert_eq!(log.turns()[59].content, "a29");
    }

    #[test]
    fn test_recent_turns_is_a_tail_slice() {
        let log = log_with(3);
        let recent: Vec<&str> = log.recent_turns(3).iter().map(|t| t.content.as_str()).collect();
        assert_eq!(recent, vec!["a1", "u2", "a2"]);
        assert_eq!(log.recent_turns(100).len(), 6);
        assert!(log.recent_turns(0).is_empty());
    }

    #[test]
    fn test_recent_turns_reflects_new_appends() {
        let mut log = log_with(1);
        assert_eq!(log.recent_turns(1)[0].content, "a0");
        log.append_turn(Turn::user("later", EmotionLabel::Joy));
        assert_eq!(log.recent_turns(1)[0].content, "later");
    }

    #[test]
    fn test_export_pairs_skips_trailing_user_turn() {
        let mut log = log_with(2);
        log.append_turn(Turn::user("quit", EmotionLabel::Neutral));
        let pairs = log.export_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].user, "u1");
        assert_eq!(pairs[1].assistant, "a1");
        assert_eq!(pairs[1].emotion, EmotionLabel::Sadness);
    }

    #[test]
    fn test_history_line_format() {
        let turn = Turn::assistant("hello");
        let line = turn.to_history_line();
        assert!(line.ends_with(" - Assistant: hello"));
        assert_eq!(line.len(), "HH:MM - Assistant: hello".len());
    }

    #[test]
    fn test_emotion_timeline_only_user_turns() {
        let log = log_with(2);
        let timeline: Vec<EmotionLabel> = log.emotions().collect();
        assert_eq!(timeline, vec![EmotionLabel::Sadness, EmotionLabel::Sadness]);
    }
}
