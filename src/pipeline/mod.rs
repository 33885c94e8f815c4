//! 对话流水线：情绪分类、事实抽取、回复生成三个提供方适配器
//!
//! 每个适配器返回 ProviderOutcome，失败折叠为固定兜底值，从不向控制器传播错误，也从不重试。

pub mod classifier;
pub mod composer;
pub mod extractor;
pub mod outcome;
pub mod prompts;

pub use classifier::EmotionClassifier;
pub use composer::{ComposeContext, ResponseComposer};
pub use extractor::{parse_candidates, FactCandidates, FactExtractor};
pub use outcome::{FallbackReason, ProviderOutcome};
pub use prompts::{FactView, FALLBACK_REPLY};
