//! EmoGenie - 情绪感知对话助手
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 会话状态、单轮控制器、后台运行时、错误类型
//! - **emotion**: 情绪标签、EQ 权重与心情分数
//! - **export**: 退出时的对话导出（CSV）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 轮次日志、事实集合、会话持久化
//! - **observability**: 日志初始化
//! - **pipeline**: 情绪分类、事实抽取、回复生成三个适配器
//! - **secrets**: API Key 来源（环境变量 / 密钥存储）
//! - **ui**: 控制台渲染

pub mod config;
pub mod core;
pub mod emotion;
pub mod export;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod pipeline;
pub mod secrets;
pub mod ui;

pub use crate::core::{spawn_session, Session, SessionController, SessionSnapshot, TurnOutcome};
pub use emotion::{EmotionLabel, MoodScore};
