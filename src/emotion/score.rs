//! EQ 评分：带钳位的累加器 + 情绪频次统计
//!
//! 每次分类得到新情绪时 `score' = clamp(score + weight(emotion), 0, 100)`，
//! 钳位在每一步执行（不是事后统一钳位），因此顺序敏感。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::EmotionLabel;

pub const MOOD_MIN: i32 = 0;
pub const MOOD_MAX: i32 = 100;
pub const MOOD_NEUTRAL: i32 = 50;

/// 心情分数，始终位于 [0, 100]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct MoodScore(i32);

impl MoodScore {
    /// 构造时即钳位
    pub fn new(value: i32) -> Self {
        Self(value.clamp(MOOD_MIN, MOOD_MAX))
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// 相对中性值 50 的偏移（展示用）
    pub fn delta_from_neutral(&self) -> i32 {
        self.0 - MOOD_NEUTRAL
    }

    /// 0.0 ~ 1.0，进度条用
    pub fn ratio(&self) -> f32 {
        self.0 as f32 / MOOD_MAX as f32
    }

    fn shifted(self, weight: i32) -> Self {
        Self::new(self.0 + weight)
    }
}

impl From<i32> for MoodScore {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<MoodScore> for i32 {
    fn from(score: MoodScore) -> Self {
        score.0
    }
}

impl Default for MoodScore {
    fn default() -> Self {
        Self(MOOD_NEUTRAL)
    }
}

/// 情绪权重表；frustration 在不同版本中为 -1 或 -2，可配置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EqWeights {
    pub frustration: i32,
}

impl EqWeights {
    pub fn weight(&self, emotion: EmotionLabel) -> i32 {
        match emotion {
            EmotionLabel::Happiness => 2,
            EmotionLabel::Joy => 2,
            EmotionLabel::Love => 3,
            EmotionLabel::Surprise => 1,
            EmotionLabel::Sadness => -1,
            EmotionLabel::Fear => -2,
            EmotionLabel::Anger => -3,
            EmotionLabel::Disgust => -2,
            EmotionLabel::Guilt => -1,
            EmotionLabel::Shame => -2,
            EmotionLabel::Anxiety => -2,
            EmotionLabel::Envy => -1,
            EmotionLabel::Frustration => self.frustration,
            EmotionLabel::Neutral => 0,
        }
    }
}

impl Default for EqWeights {
    fn default() -> Self {
        Self { frustration: -2 }
    }
}

/// 情绪 -> 次数（饼图数据源）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionTally(BTreeMap<EmotionLabel, u32>);

impl EmotionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, emotion: EmotionLabel) {
        *self.0.entry(emotion).or_insert(0) += 1;
    }

    pub fn count(&self, emotion: EmotionLabel) -> u32 {
        self.0.get(&emotion).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// 按次数降序（同次数按标签顺序），与 value_counts 展示一致
    pub fn ranked(&self) -> Vec<(EmotionLabel, u32)> {
        let mut entries: Vec<(EmotionLabel, u32)> =
            self.0.iter().map(|(e, c)| (*e, *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EmotionLabel, &u32)> {
        self.0.iter()
    }
}

/// 评分器：唯一可以修改 MoodScore 的组件
#[derive(Clone, Debug, Default)]
pub struct ScoreTracker {
    weights: EqWeights,
}

impl ScoreTracker {
    pub fn new(weights: EqWeights) -> Self {
        Self { weights }
    }

    /// 应用一次情绪：返回新分数，并在 tally 中计数
    pub fn apply(
        &self,
        score: MoodScore,
        emotion: EmotionLabel,
        tally: &mut EmotionTally,
    ) -> MoodScore {
        tally.increment(emotion);
        score.shifted(self.weights.weight(emotion))
    }

    /// 依序重放一串情绪（每步钳位）
    pub fn replay<I>(&self, start: MoodScore, emotions: I, tally: &mut EmotionTally) -> MoodScore
    where
        I: IntoIterator<Item = EmotionLabel>,
    {
        emotions
            .into_iter()
            .fold(start, |score, emotion| self.apply(score, emotion, tally))
    }
}
