//! 事实抽取适配器
//!
//! 模型可返回单条事实、要点列表或 "None"；"None" 与空结果是两种不同的结果。
//! 失败时视为零候选，不向上抛。

use std::sync::Arc;
use std::time::Duration;

use crate::llm::{complete_with_timeout, CallProfile, CompletionRequest, LlmClient};
use crate::memory::Message;
use crate::pipeline::prompts::{self, FactView};
use crate::pipeline::{FallbackReason, ProviderOutcome};

/// 抽取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactCandidates {
    /// 模型明确表示没有值得记住的内容
    NoneReported,
    /// 零或多条候选
    Found(Vec<String>),
}

impl FactCandidates {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            FactCandidates::NoneReported => Vec::new(),
            FactCandidates::Found(v) => v,
        }
    }

    pub fn is_none_reported(&self) -> bool {
        matches!(self, FactCandidates::NoneReported)
    }
}

fn is_none_sentinel(s: &str) -> bool {
    s.trim()
        .trim_end_matches('.')
        .eq_ignore_ascii_case("none")
}

/// 去掉行首的要点符号（"-", "*", "•", "1.", "2)"）
fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix(['-', '*', '•'])
        .unwrap_or(line)
        .trim_start();
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    line
}

/// 解析模型输出为候选事实
pub fn parse_candidates(raw: &str) -> FactCandidates {
    if is_none_sentinel(raw) {
        return FactCandidates::NoneReported;
    }
    let facts = raw
        .lines()
        .map(strip_bullet)
        .filter(|l| !l.is_empty() && !is_none_sentinel(l))
        .map(str::to_string)
        .collect();
    FactCandidates::Found(facts)
}

pub struct FactExtractor {
    llm: Arc<dyn LlmClient>,
    profile: CallProfile,
    timeout: Duration,
    /// Prompt 中列出已有事实，只要新的
    only_new: bool,
}

impl FactExtractor {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        profile: CallProfile,
        timeout: Duration,
        only_new: bool,
    ) -> Self {
        Self {
            llm,
            profile,
            timeout,
            only_new,
        }
    }

    /// existing：已知事实的有界视图，仅在只要新信息模式下写入 Prompt
    pub async fn extract(
        &self,
        text: &str,
        existing: FactView<'_>,
    ) -> ProviderOutcome<FactCandidates> {
        let system = prompts::extraction(self.only_new.then_some(existing));
        let request = CompletionRequest::new(
            vec![Message::system(system), Message::user(text)],
            self.profile,
        );

        match complete_with_timeout(self.llm.as_ref(), &request, self.timeout).await {
            Ok(raw) => {
                let candidates = parse_candidates(&raw);
                tracing::debug!(?candidates, "fact extraction");
                ProviderOutcome::Resolved(candidates)
            }
            Err(e) => {
                tracing::warn!(error = %e, "fact extraction failed, no candidates");
                ProviderOutcome::fallback(
                    FactCandidates::Found(Vec::new()),
                    FallbackReason::Provider(e),
                )
            }
        }
    }
}
