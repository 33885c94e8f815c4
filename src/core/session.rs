//! 会话状态：轮次日志、事实集合、心情分数、情绪频次
//!
//! Session 是一个被控制器独占的普通值，没有全局可变状态；多会话时各自持有一份。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::emotion::{EmotionLabel, EmotionTally, MoodScore, ScoreTracker};
use crate::memory::{FactStore, Turn, TurnLog};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    turns: TurnLog,
    facts: FactStore,
    score: MoodScore,
    tally: EmotionTally,
    /// reset 时恢复到的初始分数
    initial_score: MoodScore,
}

impl Session {
    pub fn new(initial_score: MoodScore, fact_capacity: Option<usize>) -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: TurnLog::new(),
            facts: FactStore::with_capacity_limit(fact_capacity),
            score: initial_score,
            tally: EmotionTally::new(),
            initial_score,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &TurnLog {
        &self.turns
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn score(&self) -> MoodScore {
        self.score
    }

    pub fn tally(&self) -> &EmotionTally {
        &self.tally
    }

    pub fn initial_score(&self) -> MoodScore {
        self.initial_score
    }

    /// 恢复的会话改用当前配置的初始分数与事实上限；当前分数、轮次与频次保留
    pub fn rebind(&mut self, initial_score: MoodScore, fact_capacity: Option<usize>) {
        self.initial_score = initial_score;
        self.facts.set_capacity_limit(fact_capacity);
    }

    /// 逐字记忆：原样记录用户消息
    pub fn record_verbatim(&mut self, entry: &str) -> bool {
        self.facts.record_verbatim(entry)
    }

    pub fn append_turn(&mut self, turn: Turn) {
        self.turns.append_turn(turn);
    }

    pub fn remember_fact(&mut self, candidate: &str) -> bool {
        self.facts.remember_fact(candidate)
    }

    /// 分数只能经由 ScoreTracker 改变
    pub fn apply_emotion(&mut self, tracker: &ScoreTracker, emotion: EmotionLabel) -> MoodScore {
        self.score = tracker.apply(self.score, emotion, &mut self.tally);
        self.score
    }

    /// 最近 n 个用户情绪（时间线图）
    pub fn emotion_timeline(&self, n: usize) -> Vec<EmotionLabel> {
        let all: Vec<EmotionLabel> = self.turns.emotions().collect();
        let start = all.len().saturating_sub(n);
        all[start..].to_vec()
    }

    /// 恢复初始状态：清空轮次、事实、频次，分数回到初始值；会话 id 不变
    pub fn reset(&mut self) {
        self.turns.clear();
        self.facts.clear();
        self.tally.clear();
        self.score = self.initial_score;
    }

    pub fn is_pristine(&self) -> bool {
        self.turns.is_empty()
            && self.facts.is_empty()
            && self.tally.is_empty()
            && self.score == self.initial_score
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(MoodScore::default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = Session::default();
        assert_eq!(session.score().value(), 50);
        assert!(session.is_pristine());
    }

    #[test]
    fn test_reset_restores_initial_defaults() {
        let tracker = ScoreTracker::default();
        let mut session = Session::new(MoodScore::new(60), Some(5));
        session.apply_emotion(&tracker, EmotionLabel::Love);
        session.append_turn(Turn::user("hi", EmotionLabel::Love));
        session.remember_fact("has a dog");
        assert!(!session.is_pristine());

        let id = session.id();
        session.reset();
        assert!(session.is_pristine());
        assert_eq!(session.score().value(), 60);
        assert_eq!(session.id(), id);
        assert_eq!(session.facts().capacity(), Some(5));
    }

    #[test]
    fn test_emotion_timeline_tail() {
        let mut session = Session::default();
        for e in [EmotionLabel::Joy, EmotionLabel::Fear, EmotionLabel::Anger] {
            session.append_turn(Turn::user("x", e));
            session.append_turn(Turn::assistant("y"));
        }
        assert_eq!(
            session.emotion_timeline(2),
            vec![EmotionLabel::Fear, EmotionLabel::Anger]
        );
    }

    #[test]
    fn test_sessions_are_isolated() {
        let tracker = ScoreTracker::default();
        let mut a = Session::default();
        let b = Session::default();
        a.apply_emotion(&tracker, EmotionLabel::Anger);
        a.remember_fact("only in a");
        assert_eq!(b.score().value(), 50);
        assert!(b.facts().is_empty());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_rebind_applies_new_defaults_on_reset() {
        let tracker = ScoreTracker::default();
        let mut session = Session::default();
        session.apply_emotion(&tracker, EmotionLabel::Fear);
        session.remember_fact("has a dog");
        session.remember_fact("works nights");

        session.rebind(MoodScore::new(80), Some(1));
        assert_eq!(session.score().value(), 48);
        assert_eq!(session.facts().facts(), ["works nights"]);

        session.reset();
        assert_eq!(session.score().value(), 80);
        assert_eq!(session.facts().capacity(), Some(1));
    }
}
