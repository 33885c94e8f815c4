//! 情绪分类适配器
//!
//! 一次低温短输出调用；任何失败（传输、解析、集合外标签）都落到 Neutral，绝不中断本轮。

use std::sync::Arc;
use std::time::Duration;

use crate::emotion::EmotionLabel;
use crate::llm::{complete_with_timeout, CallProfile, CompletionRequest, LlmClient};
use crate::memory::Message;
use crate::pipeline::{prompts, FallbackReason, ProviderOutcome};

pub struct EmotionClassifier {
    llm: Arc<dyn LlmClient>,
    profile: CallProfile,
    timeout: Duration,
}

impl EmotionClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, profile: CallProfile, timeout: Duration) -> Self {
        Self {
            llm,
            profile,
            timeout,
        }
    }

    /// context：最近若干条事实（可为空）
    pub async fn classify(&self, text: &str, context: &[String]) -> ProviderOutcome<EmotionLabel> {
        let request = CompletionRequest::new(
            vec![
                Message::system(prompts::classification(context)),
                Message::user(text),
            ],
            self.profile,
        );

        let raw = match complete_with_timeout(self.llm.as_ref(), &request, self.timeout).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "emotion classification failed, using neutral");
                return ProviderOutcome::fallback(
                    EmotionLabel::Neutral,
                    FallbackReason::Provider(e),
                );
            }
        };

        match EmotionLabel::parse_model_output(&raw) {
            Ok(label) => {
                tracing::debug!(emotion = %label, "classified");
                ProviderOutcome::Resolved(label)
            }
            Err(_) => {
                tracing::warn!(
                    raw = %raw,
                    "classifier returned label outside the set, using neutral"
                );
                ProviderOutcome::fallback(EmotionLabel::Neutral, FallbackReason::OutOfDomain(raw))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlmClient};

    fn classifier(mock: Arc<MockLlmClient>) -> EmotionClassifier {
        EmotionClassifier::new(mock, CallProfile::CLASSIFY, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_classify_resolves_label() {
        let mock = Arc::new(MockLlmClient::with_script([Ok("Happiness".to_string())]));
        let outcome = classifier(mock.clone()).classify("I got promoted!", &[]).await;
        assert_eq!(outcome, ProviderOutcome::Resolved(EmotionLabel::Happiness));

        let req = &mock.requests()[0];
        assert_eq!(req.temperature, 0.1);
        assert_eq!(req.max_tokens, 15);
        assert_eq!(req.messages[1].content, "I got promoted!");
    }

    #[tokio::test]
    async fn test_transport_error_is_neutral() {
        let mock = Arc::new(MockLlmClient::with_script([Err(LlmError::Api(
            "connection reset".into(),
        ))]));
        let outcome = classifier(mock).classify("hello", &[]).await;
        assert!(outcome.is_fallback());
        assert_eq!(*outcome.value(), EmotionLabel::Neutral);
    }

    #[tokio::test]
    async fn test_out_of_set_label_is_neutral() {
        let mock = Arc::new(MockLlmClient::with_script([Ok("nostalgia".to_string())]));
        let outcome = classifier(mock).classify("old photos", &[]).await;
        assert_eq!(
            outcome,
            ProviderOutcome::fallback(
                EmotionLabel::Neutral,
                FallbackReason::OutOfDomain("nostalgia".into())
            )
        );
    }

    #[tokio::test]
    async fn test_timeout_is_neutral() {
        let mock = Arc::new(
            MockLlmClient::with_script([Ok("anger".to_string())])
                .with_delay(Duration::from_millis(300)),
        );
        let c = EmotionClassifier::new(mock, CallProfile::CLASSIFY, Duration::from_millis(20));
        let outcome = c.classify("slow", &[]).await;
        assert!(matches!(
            outcome.reason(),
            Some(FallbackReason::Provider(LlmError::Timeout(_)))
        ));
        assert_eq!(outcome.into_value(), EmotionLabel::Neutral);
    }

    #[tokio::test]
    async fn test_context_is_included_in_prompt() {
        let mock = Arc::new(MockLlmClient::with_script([Ok("fear".to_string())]));
        classifier(mock.clone())
            .classify("it's tomorrow", &["has an exam on Friday".to_string()])
            .await;
        let system = mock.requests()[0].system_prompt().unwrap().to_string();
        assert!(system.contains("has an exam on Friday"));
    }
}
