//! 控制台渲染
//!
//! 把 SessionSnapshot 画成纯文本：最新回复、情绪标注、心情进度条、情绪频次与事实列表。

use crate::core::{SessionSnapshot, TurnPhase};
use crate::emotion::{EmotionLabel, MoodScore, MOOD_MAX};
use crate::memory::Role;

/// 进度条宽度（字符）
const GAUGE_WIDTH: usize = 20;
/// 单条消息显示的最大字符数
const MAX_DISPLAY_CHARS: usize = 600;

/// 过长内容截断，按字符计数避免截断在 UTF-8 中间
fn truncate_for_display(content: &str) -> String {
    let count = content.chars().count();
    if count <= MAX_DISPLAY_CHARS {
        return content.to_string();
    }
    let head: String = content.chars().take(MAX_DISPLAY_CHARS).collect();
    format!("{}... [{} chars]", head, count)
}

/// `[########------------] 42/100 (-8 from neutral)`
pub fn render_gauge(score: MoodScore, delta: i32) -> String {
    let filled = ((score.ratio() * GAUGE_WIDTH as f32).round() as usize).min(GAUGE_WIDTH);
    format!(
        "[{}{}] {}/{} ({:+} from neutral)",
        "#".repeat(filled),
        "-".repeat(GAUGE_WIDTH - filled),
        score.value(),
        MOOD_MAX,
        delta
    )
}

pub fn emotion_caption(emotion: EmotionLabel) -> String {
    format!("{} Detected: {}", emotion.emoji(), emotion)
}

pub fn phase_indicator(phase: TurnPhase) -> Option<&'static str> {
    match phase {
        TurnPhase::Idle => None,
        TurnPhase::AwaitingClassification => Some("Analyzing emotion..."),
        TurnPhase::AwaitingResponse => Some("Thinking..."),
    }
}

/// 最近一轮对话（用户发言 + 情绪 + 回复）
pub fn render_last_exchange(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let tail = &snapshot.turns[snapshot.turns.len().saturating_sub(2)..];
    for turn in tail {
        match turn.role {
            Role::User => {
                out.push_str(&format!("You: {}\n", truncate_for_display(&turn.content)));
                if let Some(emotion) = turn.emotion {
                    out.push_str(&format!("  {}\n", emotion_caption(emotion)));
                }
            }
            Role::Assistant => {
                out.push_str(&format!("Bot: {}\n", truncate_for_display(&turn.content)));
            }
            Role::System => {}
        }
    }
    out
}

/// 侧栏：分数、频次（附图表配色）、时间线、事实
pub fn render_dashboard(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let gauge = render_gauge(MoodScore::new(snapshot.score), snapshot.delta);
    out.push_str(&format!("Emotional Quotient {}\n", gauge));

    if !snapshot.tally.is_empty() {
        let parts: Vec<String> = snapshot
            .tally
            .iter()
            .map(|(e, n)| format!("{} {} x{} ({})", e.emoji(), e, n, e.color()))
            .collect();
        out.push_str(&format!("Emotions: {}\n", parts.join(", ")));
    }

    if !snapshot.timeline.is_empty() {
        let line: Vec<&str> = snapshot.timeline.iter().map(|e| e.as_str()).collect();
        out.push_str(&format!("Timeline: {}\n", line.join(" > ")));
    }

    if snapshot.facts.is_empty() {
        out.push_str("Remembered facts: none yet\n");
    } else {
        out.push_str("Remembered facts:\n");
        for fact in &snapshot.facts {
            out.push_str(&format!("  - {}\n", fact));
        }
    }
    out
}
