//! 回复生成适配器
//!
//! 输入：本轮消息、已分类情绪、有界历史视图、有界事实视图。失败时返回固定兜底回复，对话不会卡死。

use std::sync::Arc;
use std::time::Duration;

use crate::emotion::EmotionLabel;
use crate::llm::{complete_with_timeout, CallProfile, CompletionRequest, LlmClient};
use crate::memory::{Message, Turn};
use crate::pipeline::{prompts, FallbackReason, ProviderOutcome};

/// 生成回复所需的上下文（全部为借用的视图）
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    pub message: &'a str,
    pub emotion: EmotionLabel,
    pub history: &'a [Turn],
    pub facts: &'a [String],
    /// 事实总数（可能大于 facts 视图长度）
    pub total_facts: usize,
}

pub struct ResponseComposer {
    llm: Arc<dyn LlmClient>,
    profile: CallProfile,
    timeout: Duration,
    fallback: String,
}

impl ResponseComposer {
    pub fn new(llm: Arc<dyn LlmClient>, profile: CallProfile, timeout: Duration) -> Self {
        Self {
            llm,
            profile,
            timeout,
            fallback: prompts::FALLBACK_REPLY.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub async fn compose(&self, ctx: &ComposeContext<'_>) -> ProviderOutcome<String> {
        let system = prompts::composition(ctx.emotion, ctx.history, ctx.facts, ctx.total_facts);
        let request = CompletionRequest::new(
            vec![Message::system(system), Message::user(ctx.message)],
            self.profile,
        );

        match complete_with_timeout(self.llm.as_ref(), &request, self.timeout).await {
            Ok(reply) => ProviderOutcome::Resolved(reply.trim().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "response generation failed, using fallback reply");
                ProviderOutcome::fallback(self.fallback.clone(), FallbackReason::Provider(e))
            }
        }
    }
}
