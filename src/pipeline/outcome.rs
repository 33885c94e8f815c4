//! 提供方调用结果：成功值或唯一的兜底分支
//!
//! 适配器从不向控制器传播错误；失败被折叠进 `Fallback`，同时保留原因供日志与测试使用。

use crate::llm::LlmError;

/// 为什么走了兜底
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// 网络 / 接口 / 超时 / 空响应
    Provider(LlmError),
    /// 模型输出不在允许的取值范围内
    OutOfDomain(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Provider(e) => write!(f, "provider failure: {}", e),
            FallbackReason::OutOfDomain(raw) => write!(f, "out-of-domain output: {:?}", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome<T> {
    Resolved(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> ProviderOutcome<T> {
    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        ProviderOutcome::Fallback { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            ProviderOutcome::Resolved(v) => v,
            ProviderOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            ProviderOutcome::Resolved(v) => v,
            ProviderOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ProviderOutcome::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            ProviderOutcome::Resolved(_) => None,
            ProviderOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}
