//! 状态投影：SessionSnapshot
//!
//! 展示层只持有轻量的快照（阶段、对话、事实、分数、频次、时间线）；完整 Session 由控制器独占。

use serde::Serialize;
use uuid::Uuid;

use crate::core::Session;
use crate::emotion::EmotionLabel;
use crate::memory::Turn;

/// 单轮处理阶段
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TurnPhase {
    #[default]
    Idle,
    AwaitingClassification,
    AwaitingResponse,
}

impl TurnPhase {
    /// 是否显示「处理中」
    pub fn is_busy(&self) -> bool {
        !matches!(self, TurnPhase::Idle)
    }
}

/// 展示层看到的投影状态
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: TurnPhase,
    pub turns: Vec<Turn>,
    pub facts: Vec<String>,
    pub score: i32,
    /// score - 50
    pub delta: i32,
    /// 按次数降序
    pub tally: Vec<(EmotionLabel, u32)>,
    pub timeline: Vec<EmotionLabel>,
    /// 最近一次提示（导出路径、重置等）
    pub notice: Option<String>,
}

impl SessionSnapshot {
    /// 将 Session 投影为快照；timeline_len 限制时间线长度
    pub fn project(session: &Session, phase: TurnPhase, timeline_len: usize) -> Self {
        Self {
            session_id: session.id(),
            phase,
            turns: session.turns().turns().to_vec(),
            facts: session.facts().facts().to_vec(),
            score: session.score().value(),
            delta: session.score().delta_from_neutral(),
            tally: session.tally().ranked(),
            timeline: session.emotion_timeline(timeline_len),
            notice: None,
        }
    }

    /// 最近一条助手回复
    pub fn last_reply(&self) -> Option<&Turn> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == crate::memory::Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::ScoreTracker;

    #[test]
    fn test_project_reports_delta_and_ranked_tally() {
        let tracker = ScoreTracker::default();
        let mut session = Session::default();
        for e in [EmotionLabel::Joy, EmotionLabel::Joy, EmotionLabel::Fear] {
            session.apply_emotion(&tracker, e);
            session.append_turn(Turn::user("m", e));
            session.append_turn(Turn::assistant("r"));
        }

        let snap = SessionSnapshot::project(&session, TurnPhase::Idle, 2);
        assert_eq!(snap.score, 52);
        assert_eq!(snap.delta, 2);
        assert_eq!(snap.tally[0], (EmotionLabel::Joy, 2));
        assert_eq!(snap.timeline, vec![EmotionLabel::Joy, EmotionLabel::Fear]);
        assert_eq!(snap.last_reply().map(|t| t.content.as_str()), Some("r"));
        assert!(!snap.phase.is_busy());
    }
}
