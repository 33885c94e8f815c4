//! 事实记忆：关于用户的简短、可复用的细节
//!
//! 去重是近似的：忽略大小写的子串包含（任一方向）即视为已知，不做语义相似度。
//! 插入顺序即展示顺序。

use serde::{Deserialize, Serialize};

/// candidate 是否已被 existing 中某条事实覆盖（忽略大小写，双向子串包含）
pub fn is_known_fact(candidate: &str, existing: &[String]) -> bool {
    let needle = candidate.trim().to_lowercase();
    existing.iter().any(|fact| {
        let fact = fact.to_lowercase();
        fact.contains(&needle) || needle.contains(&fact)
    })
}

/// 有序事实集合；capacity 为 None 时无上限，否则淘汰最旧的一条
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactStore {
    facts: Vec<String>,
    #[serde(default)]
    capacity: Option<usize>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: Option<usize>) -> Self {
        Self {
            facts: Vec::new(),
            capacity,
        }
    }

    /// 尝试记住一条事实，返回是否为新增
    ///
    /// 空白串、以及与已有事实存在子串包含关系的候选都会被拒绝。
    pub fn remember_fact(&mut self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        if candidate.is_empty() || is_known_fact(candidate, &self.facts) {
            return false;
        }
        self.push_bounded(candidate)
    }

    /// 原样记录（逐字记忆模式），不去重；只拒绝空白串
    pub fn record_verbatim(&mut self, entry: &str) -> bool {
        let entry = entry.trim();
        if entry.is_empty() {
            return false;
        }
        self.push_bounded(entry)
    }

    /// 追加并按 capacity 淘汰最旧的条目；容量为 0 时什么也存不下，返回 false
    fn push_bounded(&mut self, entry: &str) -> bool {
        if self.capacity == Some(0) {
            return false;
        }
        self.facts.push(entry.to_string());
        if let Some(cap) = self.capacity {
            if self.facts.len() > cap {
                let overflow = self.facts.len() - cap;
                self.facts.drain(..overflow);
            }
        }
        true
    }

    /// 最近 n 条（插入顺序）
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.facts.len().saturating_sub(n);
        &self.facts[start..]
    }

    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// 更换上限；已有条目超出时淘汰最旧的
    pub fn set_capacity_limit(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
        if let Some(cap) = capacity {
            let overflow = self.facts.len().saturating_sub(cap);
            self.facts.drain(..overflow);
        }
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment_dedup() {
        let mut store = FactStore::new();
        assert!(store.remember_fact("likes coffee"));
        assert!(!store.remember_fact("I really likes coffee a lot"));
        assert!(store.remember_fact("enjoys tea"));
        assert_eq!(store.facts(), &["likes coffee".to_string(), "enjoys tea".to_string()]);
    }

    #[test]
    fn test_candidate_inside_existing_is_rejected() {
        let mut store = FactStore::new();
        assert!(store.remember_fact("Has an exam on Friday with Prof. Lee"));
        assert!(!store.remember_fact("exam on friday"));
    }

    #[test]
    fn test_case_insensitive() {
        let mut store = FactStore::new();
        assert!(store.remember_fact("Sister is called Maya"));
        assert!(!store.remember_fact("SISTER IS CALLED MAYA"));
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        let mut store = FactStore::new();
        assert!(!store.remember_fact(""));
        assert!(!store.remember_fact("   \n\t"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_candidate_is_trimmed() {
        let mut store = FactStore::new();
        assert!(store.remember_fact("  got promoted  "));
        assert_eq!(store.facts()[0], "got promoted");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = FactStore::with_capacity_limit(Some(2));
        assert!(store.remember_fact("alpha"));
        assert!(store.remember_fact("bravo"));
        assert!(store.remember_fact("charlie"));
        assert_eq!(store.facts(), &["bravo".to_string(), "charlie".to_string()]);
    }

    #[test]
    fn test_recent_view() {
        let mut store = FactStore::new();
        for f in ["one fact", "two fact", "three fact"] {
            store.remember_fact(f);
        }
        assert_eq!(store.recent(2), &["two fact".to_string(), "three fact".to_string()]);
        assert_eq!(store.recent(10).len(), 3);
    }

    #[test]
    fn test_is_known_fact_free_function() {
        let existing = vec!["likes coffee".to_string()];
        assert!(is_known_fact("Likes Coffee", &existing));
        assert!(!is_known_fact("enjoys tea", &existing));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut store = FactStore::with_capacity_limit(Some(0));
        assert!(!store.remember_fact("has a dog"));
        assert!(!store.record_verbatim("I have a dog"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_verbatim_keeps_repeats() {
        let mut store = FactStore::with_capacity_limit(Some(3));
        assert!(store.record_verbatim("I miss home"));
        assert!(store.record_verbatim("I miss home"));
        assert!(!store.record_verbatim("  "));
        assert_eq!(store.facts(), &["I miss home".to_string(), "I miss home".to_string()]);
    }

    #[test]
    fn test_shrinking_capacity_drops_oldest() {
        let mut store = FactStore::new();
        for f in ["alpha", "bravo", "charlie"] {
            store.remember_fact(f);
        }
        store.set_capacity_limit(Some(1));
        assert_eq!(store.facts(), &["charlie".to_string()]);
        assert_eq!(store.capacity(), Some(1));
    }
}
