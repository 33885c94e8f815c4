//! 记忆层：对话轮次日志、事实记忆、会话持久化

pub mod conversation;
pub mod facts;
pub mod persistence;

pub use conversation::{Message, Role, Turn, TurnLog, TurnPair};
pub use facts::{is_known_fact, FactStore};
pub use persistence::SessionPersistence;
