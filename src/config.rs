//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `EMOGENIE__*` 覆盖
//! （双下划线表示嵌套，如 `EMOGENIE__LLM__MODEL=gpt-4o-mini`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::emotion::{EqWeights, MoodScore};
use crate::llm::{CallProfile, DEFAULT_MODEL};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub session: SessionSection,
    pub secrets: SecretsSection,
}

/// [app] 段：应用名、导出与持久化路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    /// 导出文件名前缀：`<prefix>_<YYYYMMDD_HHMMSS>.csv`
    pub export_prefix: String,
    pub export_dir: PathBuf,
    /// 设置后每轮结束把会话写入该 JSON 文件，启动时自动恢复
    pub persist_path: Option<PathBuf>,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "EmoGenie".to_string(),
            export_prefix: "emogenie_chat".to_string(),
            export_dir: PathBuf::from("."),
            persist_path: None,
        }
    }
}

/// [llm] 段：模型、端点、超时与三种调用参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    pub base_url: Option<String>,
    /// 单次提供方调用超时（秒）
    pub timeout_secs: u64,
    pub classify: CallProfile,
    pub extract: CallProfile,
    pub compose: CallProfile,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            timeout_secs: 30,
            classify: CallProfile::CLASSIFY,
            extract: CallProfile::EXTRACT,
            compose: CallProfile::COMPOSE,
        }
    }
}

/// [session] 段：评分初值、上下文窗口、事实记忆策略
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub initial_score: i32,
    /// 分类时附带的最近事实条数，0 表示不带上下文
    pub classifier_context: usize,
    /// 回复生成时附带的最近轮次数
    pub history_window: usize,
    /// 回复生成时附带的最近事实条数
    pub fact_window: usize,
    /// 事实上限，None 为不限
    pub max_facts: Option<usize>,
    pub facts_enabled: bool,
    /// facts：模型抽取事实；verbatim：逐字记下每条用户消息，不调用抽取
    pub memory: MemoryMode,
    /// 抽取 Prompt 中列出已有事实，只要求新信息
    pub extract_only_new: bool,
    pub frustration_weight: i32,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            initial_score: 50,
            classifier_context: 3,
            history_window: 10,
            fact_window: 10,
            max_facts: None,
            facts_enabled: true,
            memory: MemoryMode::Facts,
            extract_only_new: false,
            frustration_weight: -2,
        }
    }
}

impl SessionSection {
    pub fn initial_score(&self) -> MoodScore {
        MoodScore::new(self.initial_score)
    }

    pub fn weights(&self) -> EqWeights {
        EqWeights {
            frustration: self.frustration_weight,
        }
    }
}

/// 记忆方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryMode {
    #[default]
    Facts,
    Verbatim,
}

/// 凭证来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSourceKind {
    /// 直接读环境变量
    Env,
    /// 从密钥存储读取 JSON，注入环境变量后再读
    File,
}

/// [secrets] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecretsSection {
    pub source: SecretSourceKind,
    pub env_var: String,
    pub secret_name: String,
    pub region: String,
    pub file: PathBuf,
}

impl Default for SecretsSection {
    fn default() -> Self {
        Self {
            source: SecretSourceKind::Env,
            env_var: "OPENAI_API_KEY".to_string(),
            secret_name: "openai-api-key".to_string(),
            region: "us-east-1".to_string(),
            file: PathBuf::from("secret.json"),
        }
    }
}

/// 从 config 目录加载配置，环境变量 EMOGENIE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 EMOGENIE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("EMOGENIE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_behaviour() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.session.initial_score().value(), 50);
        assert_eq!(cfg.llm.classify, CallProfile::CLASSIFY);
        assert_eq!(cfg.llm.compose.max_tokens, 250);
        assert_eq!(cfg.app.export_prefix, "emogenie_chat");
        assert_eq!(cfg.secrets.source, SecretSourceKind::Env);
        assert!(cfg.session.facts_enabled);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"[session]
history_window = 4
memory = "verbatim"
max_facts = 20

[llm]
model = "gpt-4o-mini"

[llm.compose]
temperature = 0.5
max_tokens = 300
"#
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.session.history_window, 4);
        assert_eq!(cfg.session.memory, MemoryMode::Verbatim);
        assert_eq!(cfg.session.max_facts, Some(20));
        assert_eq!(cfg.session.fact_window, 10);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.compose.max_tokens, 300);
        assert_eq!(cfg.llm.classify, CallProfile::CLASSIFY);
    }
}
