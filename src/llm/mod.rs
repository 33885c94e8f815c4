//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage, DEFAULT_MODEL};
pub use traits::{complete_with_timeout, CallProfile, CompletionRequest, LlmClient, LlmError};

use crate::config::AppConfig;

/// 根据配置与已解析的 API Key 创建共享客户端
pub fn create_llm_from_config(cfg: &AppConfig, api_key: &str) -> Arc<dyn LlmClient> {
    let base = cfg.llm.base_url.as_deref();
    tracing::info!(model = %cfg.llm.model, base_url = ?base, "Using OpenAI-compatible LLM");
    Arc::new(OpenAiClient::new(base, &cfg.llm.model, api_key))
}
