//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient：一次请求 = 有序 Prompt 片段 + 温度 + 输出上限。
//! 两种调用形态：低温短输出的分类/抽取调用，高温长输出的回复生成调用。

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::memory::Message;

/// 提供方调用失败（网络、接口、空响应、超时）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error: {0}")]
    Api(String),

    #[error("empty response from provider")]
    EmptyResponse,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// 调用参数：温度与最大输出 token
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CallProfile {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CallProfile {
    /// 情绪分类：确定性、极短输出
    pub const CLASSIFY: CallProfile = CallProfile {
        temperature: 0.1,
        max_tokens: 15,
    };

    /// 事实抽取
    pub const EXTRACT: CallProfile = CallProfile {
        temperature: 0.3,
        max_tokens: 50,
    };

    /// 回复生成
    pub const COMPOSE: CallProfile = CallProfile {
        temperature: 0.7,
        max_tokens: 250,
    };
}

/// 一次补全请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>, profile: CallProfile) -> Self {
        Self {
            messages,
            temperature: profile.temperature,
            max_tokens: profile.max_tokens,
        }
    }

    /// system 片段内容（若有），测试与日志用
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| matches!(m.role, crate::memory::Role::System))
            .map(|m| m.content.as_str())
    }
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成，返回生成文本
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// 模型标识
    fn model(&self) -> &str;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

/// 带超时的单次调用；超时与其它失败一样返回 LlmError，不重试
pub async fn complete_with_timeout(
    client: &dyn LlmClient,
    request: &CompletionRequest,
    limit: Duration,
) -> Result<String, LlmError> {
    match tokio::time::timeout(limit, client.complete(request)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(limit)),
    }
}
