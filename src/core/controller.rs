//! 会话控制器：单轮状态机
//!
//! `Idle → AwaitingClassification → AwaitingResponse → Idle`，一次只处理一条消息。
//! 分类失败落到 neutral，抽取失败视为零候选，生成失败使用兜底回复；本轮一定会走完。
//! 输入 `quit`（忽略大小写、去首尾空白后完全相等）时不生成回复，导出已配对的轮次并重置会话。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::config::{AppConfig, MemoryMode, SessionSection};
use crate::core::{Session, SessionSnapshot, TurnPhase};
use crate::emotion::{EmotionLabel, MoodScore, ScoreTracker};
use crate::export::{CsvExportSink, ExportReceipt, ExportRow, ExportSink};
use crate::llm::LlmClient;
use crate::memory::{SessionPersistence, Turn};
use crate::pipeline::{
    ComposeContext, EmotionClassifier, FactExtractor, FactView, ResponseComposer,
};

pub const QUIT_COMMAND: &str = "quit";

/// 时间线默认展示的条数
const TIMELINE_LEN: usize = 10;

pub fn is_quit_command(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(QUIT_COMMAND)
}

/// 上下文窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub classifier_context: usize,
    pub history_window: usize,
    pub fact_window: usize,
    pub timeline_len: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&SessionSection::default())
    }
}

impl From<&SessionSection> for ControllerSettings {
    fn from(s: &SessionSection) -> Self {
        Self {
            classifier_context: s.classifier_context,
            history_window: s.history_window,
            fact_window: s.fact_window,
            timeline_len: TIMELINE_LEN,
        }
    }
}

/// 一次 submit 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Replied {
        reply: String,
        emotion: EmotionLabel,
        score: MoodScore,
        new_facts: Vec<String>,
    },
    /// quit：已导出并重置；零行时不调用导出
    Ended {
        rows: usize,
        receipt: Option<ExportReceipt>,
    },
    /// 空输入
    Ignored,
}

pub struct SessionController {
    session: Session,
    tracker: ScoreTracker,
    classifier: EmotionClassifier,
    extractor: Option<FactExtractor>,
    composer: ResponseComposer,
    settings: ControllerSettings,
    memory: MemoryMode,
    sink: Option<Arc<dyn ExportSink>>,
    persistence: Option<SessionPersistence>,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    pub fn new(
        session: Session,
        tracker: ScoreTracker,
        classifier: EmotionClassifier,
        extractor: Option<FactExtractor>,
        composer: ResponseComposer,
        settings: ControllerSettings,
    ) -> Self {
        let snapshot = SessionSnapshot::project(&session, TurnPhase::Idle, settings.timeline_len);
        let (state_tx, _) = watch::channel(snapshot);
        Self {
            session,
            tracker,
            classifier,
            extractor,
            composer,
            settings,
            memory: MemoryMode::Facts,
            sink: None,
            persistence: None,
            state_tx,
        }
    }

    /// 按配置装配：三个适配器共享同一个客户端，CSV 导出，持久化可选
    pub fn from_config(cfg: &AppConfig, llm: Arc<dyn LlmClient>) -> Self {
        let timeout = Duration::from_secs(cfg.llm.timeout_secs);
        let classifier = EmotionClassifier::new(llm.clone(), cfg.llm.classify, timeout);
        let verbatim = cfg.session.memory == MemoryMode::Verbatim;
        let extractor = (cfg.session.facts_enabled && !verbatim).then(|| {
            FactExtractor::new(
                llm.clone(),
                cfg.llm.extract,
                timeout,
                cfg.session.extract_only_new,
            )
        });
        let composer = ResponseComposer::new(llm, cfg.llm.compose, timeout);

        let session = Session::new(cfg.session.initial_score(), cfg.session.max_facts);
        let controller = Self::new(
            session,
            ScoreTracker::new(cfg.session.weights()),
            classifier,
            extractor,
            composer,
            ControllerSettings::from(&cfg.session),
        )
        .with_export_sink(Arc::new(CsvExportSink::new(
            &cfg.app.export_dir,
            cfg.app.export_prefix.clone(),
        )))
        .with_memory_mode(cfg.session.memory);

        match &cfg.app.persist_path {
            Some(path) => controller.with_persistence(SessionPersistence::new(path)),
            None => controller,
        }
    }

    pub fn with_export_sink(mut self, sink: Arc<dyn ExportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// verbatim：每条用户发言原样记入事实列表，不去重、不调用抽取
    pub fn with_memory_mode(mut self, memory: MemoryMode) -> Self {
        self.memory = memory;
        self
    }

    /// 启用持久化；文件存在时恢复其中的会话，初始分数与事实上限沿用当前配置
    pub fn with_persistence(mut self, persistence: SessionPersistence) -> Self {
        match persistence.load() {
            Ok(Some(mut session)) => {
                session.rebind(self.session.initial_score(), self.session.facts().capacity());
                tracing::info!(
                    path = %persistence.path().display(),
                    turns = session.turns().len(),
                    "session restored"
                );
                self.session = session;
                self.publish(TurnPhase::Idle, None);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    path = %persistence.path().display(),
                    error = %e,
                    "session restore failed, starting fresh"
                );
            }
        }
        self.persistence = Some(persistence);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 订阅状态快照
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::project(&self.session, TurnPhase::Idle, self.settings.timeline_len)
    }

    /// 处理一条用户消息（单轮完整走完才返回）
    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }

        // 1. 分类、计分、记录用户发言
        self.publish(TurnPhase::AwaitingClassification, None);
        let context = self
            .session
            .facts()
            .recent(self.settings.classifier_context)
            .to_vec();
        let emotion = self.classifier.classify(text, &context).await.into_value();
        let score = self.session.apply_emotion(&self.tracker, emotion);
        self.session.append_turn(Turn::user(text, emotion));
        tracing::info!(emotion = %emotion, score = score.value(), "user turn recorded");

        if is_quit_command(text) {
            return self.end_session().await;
        }

        // 2. 事实抽取与回复生成
        self.publish(TurnPhase::AwaitingResponse, None);
        let new_facts = match self.memory {
            MemoryMode::Facts => self.extract_facts(text).await,
            MemoryMode::Verbatim => self.record_verbatim(text),
        };

        let total_facts = self.session.facts().len();
        let ctx = ComposeContext {
            message: text,
            emotion,
            history: self.session.turns().recent_turns(self.settings.history_window),
            facts: self.session.facts().recent(self.settings.fact_window),
            total_facts,
        };
        let reply = self.composer.compose(&ctx).await.into_value();

        // 3. 记录回复并发布
        self.session.append_turn(Turn::assistant(reply.clone()));
        self.publish(TurnPhase::Idle, None);
        self.persist();

        TurnOutcome::Replied {
            reply,
            emotion,
            score,
            new_facts,
        }
    }

    /// 重置会话（不导出）
    pub fn reset(&mut self) {
        self.session.reset();
        tracing::info!(session = %self.session.id(), "session reset");
        self.publish(TurnPhase::Idle, Some("Session reset".to_string()));
        self.persist();
    }

    async fn extract_facts(&mut self, text: &str) -> Vec<String> {
        let Some(extractor) = &self.extractor else {
            return Vec::new();
        };
        let facts = self.session.facts();
        let view = FactView::new(facts.recent(self.settings.fact_window), facts.len());
        let candidates = extractor
            .extract(text, view)
            .await
            .into_value()
            .into_vec();

        let mut accepted = Vec::new();
        for candidate in candidates {
            if self.session.remember_fact(&candidate) {
                tracing::info!(fact = %candidate.trim(), "fact remembered");
                accepted.push(candidate.trim().to_string());
            } else {
                tracing::debug!(fact = %candidate, "fact rejected as duplicate");
            }
        }
        accepted
    }

    fn record_verbatim(&mut self, text: &str) -> Vec<String> {
        if self.session.record_verbatim(text) {
            tracing::info!(entry = %text, "message recorded verbatim");
            vec![text.to_string()]
        } else {
            Vec::new()
        }
    }

    async fn end_session(&mut self) -> TurnOutcome {
        let rows: Vec<ExportRow> = self
            .session
            .turns()
            .export_pairs()
            .into_iter()
            .map(ExportRow::from)
            .collect();

        let receipt = match (&self.sink, rows.is_empty()) {
            (Some(sink), false) => match sink.export(&rows).await {
                Ok(receipt) => Some(receipt),
                Err(e) => {
                    tracing::error!(error = %e, rows = rows.len(), "conversation export failed");
                    None
                }
            },
            _ => None,
        };

        self.session.reset();
        let notice = match receipt.as_ref().and_then(|r| r.path.as_ref()) {
            Some(path) => format!("Chat exported to {}", path.display()),
            None => "Session ended".to_string(),
        };
        tracing::info!(rows = rows.len(), "session ended");
        self.publish(TurnPhase::Idle, Some(notice));
        self.persist();

        TurnOutcome::Ended {
            rows: rows.len(),
            receipt,
        }
    }

    fn publish(&self, phase: TurnPhase, notice: Option<String>) {
        let mut snapshot =
            SessionSnapshot::project(&self.session, phase, self.settings.timeline_len);
        snapshot.notice = notice;
        self.state_tx.send_replace(snapshot);
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(&self.session) {
                tracing::warn!(
                    path = %persistence.path().display(),
                    error = %e,
                    "session save failed"
                );
            }
        }
    }
}
