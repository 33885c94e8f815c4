//! Prompt 模板：分类 / 抽取 / 回复生成

use crate::emotion::EmotionLabel;
use crate::memory::Turn;

pub const NO_CONTEXT: &str = "No context yet";
pub const FALLBACK_REPLY: &str = "I appreciate you sharing. Could you tell me more?";

/// 情绪分类 system prompt；context 为空时不附带上下文段
pub fn classification(context: &[String]) -> String {
    let mut prompt = format!(
        "Classify the dominant emotion from: {}.",
        EmotionLabel::prompt_list()
    );
    if !context.is_empty() {
        prompt.push_str(&format!("\nConsider this context: {}", context.join("; ")));
    }
    prompt.push_str("\nReturn ONLY the emotion name.");
    prompt
}

/// 有界事实视图：最近若干条 + 总条数
#[derive(Debug, Clone, Copy)]
pub struct FactView<'a> {
    pub recent: &'a [String],
    pub total: usize,
}

impl<'a> FactView<'a> {
    pub fn new(recent: &'a [String], total: usize) -> Self {
        Self { recent, total }
    }

    /// "- fact" 各一行；总数超出视图时追加 "- ...plus N more facts"
    fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.recent.iter().map(|f| format!("- {}", f)).collect();
        if self.total > self.recent.len() {
            lines.push(format!("- ...plus {} more facts", self.total - self.recent.len()));
        }
        lines
    }
}

/// 事实抽取 system prompt；existing 为 Some 时只要求新信息
pub fn extraction(existing: Option<FactView<'_>>) -> String {
    match existing {
        Some(view) => {
            let lines = view.lines();
            let known = if lines.is_empty() {
                NO_CONTEXT.to_string()
            } else {
                lines.join("\n")
            };
            format!(
                "Extract NEW important information about the user not already in:\n{}\n\
                 Return each fact as a bullet point, or None.",
                known
            )
        }
        None => "Extract key factual information to remember about the user \
                 (personal details, important events, emotional triggers, key preferences). \
                 Return as bullet points or None."
            .to_string(),
    }
}

/// 回复生成 system prompt
///
/// history 与 facts 都是调用方截好的有界视图；total_facts 超出视图时追加 "...plus N more facts"。
pub fn composition(
    emotion: EmotionLabel,
    history: &[Turn],
    facts: &[String],
    total_facts: usize,
) -> String {
    let history_block = if history.is_empty() {
        "No previous messages".to_string()
    } else {
        history
            .iter()
            .map(Turn::to_history_line)
            .collect::<Vec<_>>()
            .join("\n")
    };

    let fact_lines = FactView::new(facts, total_facts).lines();
    let facts_block = if fact_lines.is_empty() {
        "None yet".to_string()
    } else {
        fact_lines.join("\n")
    };

    format!(
        "You're an empathetic therapist with perfect memory. Act like a personal friend or guide \
         to help people in different mental phases of life. Rules:\n\
         1. Always reference relevant facts when appropriate\n\
         2. Current emotion: {emotion}\n\
         3. Conversation history:\n{history_block}\n\
         4. KNOWS THESE FACTS:\n{facts_block}\n\
         5. Respond in 2-3 sentences"
    )
}
