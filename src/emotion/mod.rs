//! 情绪层：标签集合、EQ 权重与评分器

pub mod label;
pub mod score;

pub use label::{EmotionLabel, UnknownEmotion};
pub use score::{EmotionTally, EqWeights, MoodScore, ScoreTracker, MOOD_MAX, MOOD_MIN, MOOD_NEUTRAL};
