//! 情绪标签：固定封闭集合
//!
//! 分类器输出经 `EmotionLabel::coerce` 归一化，集合外的任何文本都落到 `Neutral`，
//! 因此 ScoreTracker 只会见到合法标签。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 十四种情绪标签（顺序即展示顺序）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happiness,
    Sadness,
    Fear,
    Anger,
    Disgust,
    Surprise,
    Love,
    Joy,
    Guilt,
    Shame,
    Anxiety,
    Envy,
    Frustration,
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 14] = [
        EmotionLabel::Happiness,
        EmotionLabel::Sadness,
        EmotionLabel::Fear,
        EmotionLabel::Anger,
        EmotionLabel::Disgust,
        EmotionLabel::Surprise,
        EmotionLabel::Love,
        EmotionLabel::Joy,
        EmotionLabel::Guilt,
        EmotionLabel::Shame,
        EmotionLabel::Anxiety,
        EmotionLabel::Envy,
        EmotionLabel::Frustration,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happiness => "happiness",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Love => "love",
            EmotionLabel::Joy => "joy",
            EmotionLabel::Guilt => "guilt",
            EmotionLabel::Shame => "shame",
            EmotionLabel::Anxiety => "anxiety",
            EmotionLabel::Envy => "envy",
            EmotionLabel::Frustration => "frustration",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// 解析模型原始输出：去空白、去引号与句末标点、小写后严格匹配
    pub fn parse_model_output(raw: &str) -> Result<Self, UnknownEmotion> {
        raw.trim()
            .trim_matches(|c: char| c == '.' || c == '"' || c == '\'' || c == '!')
            .to_lowercase()
            .parse()
    }

    /// 同上，但集合外的输出一律归为 Neutral
    pub fn coerce(raw: &str) -> Self {
        Self::parse_model_output(raw).unwrap_or(EmotionLabel::Neutral)
    }

    /// 逗号分隔的全部标签名，用于分类 Prompt
    pub fn prompt_list() -> String {
        Self::ALL
            .iter()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            EmotionLabel::Happiness => "😊",
            EmotionLabel::Sadness => "😢",
            EmotionLabel::Fear => "😨",
            EmotionLabel::Anger => "😠",
            EmotionLabel::Disgust => "🤢",
            EmotionLabel::Surprise => "😲",
            EmotionLabel::Love => "❤️",
            EmotionLabel::Joy => "😂",
            EmotionLabel::Guilt => "😳",
            EmotionLabel::Shame => "😞",
            EmotionLabel::Anxiety => "😰",
            EmotionLabel::Envy => "😒",
            EmotionLabel::Frustration => "😤",
            EmotionLabel::Neutral => "😐",
        }
    }

    /// 图表配色（饼图 / 时间线）
    pub fn color(&self) -> &'static str {
        match self {
            EmotionLabel::Happiness | EmotionLabel::Joy => "#FFD700",
            EmotionLabel::Sadness => "#1E90FF",
            EmotionLabel::Fear => "#9370DB",
            EmotionLabel::Anger => "#FF4500",
            EmotionLabel::Disgust => "#32CD32",
            EmotionLabel::Surprise => "#FFA500",
            EmotionLabel::Love => "#FF69B4",
            EmotionLabel::Guilt => "#A9A9A9",
            EmotionLabel::Shame => "#8B0000",
            EmotionLabel::Anxiety => "#FF8C00",
            EmotionLabel::Envy => "#2E8B57",
            EmotionLabel::Frustration => "#CD5C5C",
            EmotionLabel::Neutral => "#D3D3D3",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 严格解析：仅接受集合内的小写名
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion label: {0}")]
pub struct UnknownEmotion(pub String);

impl FromStr for EmotionLabel {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_labels() {
        for label in EmotionLabel::ALL {
            assert_eq!(label.as_str().parse::<EmotionLabel>(), Ok(label));
        }
    }

    #[test]
    fn test_coerce_normalizes_model_output() {
        assert_eq!(EmotionLabel::coerce("  Happiness.\n"), EmotionLabel::Happiness);
        assert_eq!(EmotionLabel::coerce("ANGER"), EmotionLabel::Anger);
        assert_eq!(EmotionLabel::coerce("\"love\""), EmotionLabel::Love);
    }

    #[test]
    fn test_coerce_out_of_set_is_neutral() {
        assert_eq!(EmotionLabel::coerce("melancholy"), EmotionLabel::Neutral);
        assert_eq!(EmotionLabel::coerce(""), EmotionLabel::Neutral);
        assert_eq!(
            EmotionLabel::coerce("The emotion is joy"),
            EmotionLabel::Neutral
        );
    }

    #[test]
    fn test_prompt_list_contains_every_label() {
        let list = EmotionLabel::prompt_list();
        assert!(list.starts_with("happiness, sadness"));
        assert!(list.ends_with("frustration, neutral"));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&EmotionLabel::Frustration).unwrap();
        assert_eq!(json, "\"frustration\"");
    }
}
