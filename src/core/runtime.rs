//! 会话运行时：后台任务消费命令，驱动 SessionController
//!
//! 两条通道：展示层 -> 控制器的命令（mpsc）；控制器 -> 展示层的状态快照（watch）。
//! 命令按到达顺序逐条处理，上一条消息走完整轮之前不会读取下一条。

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::core::{SessionController, SessionSnapshot, TurnOutcome};

/// 展示层发往会话的命令
#[derive(Debug)]
pub enum Command {
    /// 提交用户输入；可选回执通道接收本轮结果
    Submit(String, Option<oneshot::Sender<TurnOutcome>>),
    /// 清空会话（不导出）
    Reset,
    /// 结束后台任务
    Shutdown,
}

impl Command {
    pub fn submit(text: impl Into<String>) -> Self {
        Command::Submit(text.into(), None)
    }
}

/// 会话句柄
pub struct SessionHandle {
    pub commands: mpsc::UnboundedSender<Command>,
    pub state: watch::Receiver<SessionSnapshot>,
    pub task: JoinHandle<()>,
}

impl SessionHandle {
    /// 提交并等待本轮结果；任务已结束时返回 None
    pub async fn submit(&self, text: impl Into<String>) -> Option<TurnOutcome> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Submit(text.into(), Some(tx))).ok()?;
        rx.await.ok()
    }
}

/// 在后台任务中运行控制器
pub fn spawn_session(mut controller: SessionController) -> SessionHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let state_rx = controller.subscribe();

    let task = tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Submit(text, reply_to) => {
                    let outcome = controller.submit(&text).await;
                    if let Some(reply_to) = reply_to {
                        let _ = reply_to.send(outcome);
                    }
                }
                Command::Reset => controller.reset(),
                Command::Shutdown => break,
            }
        }
        tracing::debug!(session = %controller.session().id(), "session task stopped");
    });

    SessionHandle {
        commands: cmd_tx,
        state: state_rx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::llm::MockLlmClient;
    use std::sync::Arc;

    fn config_without_facts() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.session.facts_enabled = false;
        cfg
    }

    #[tokio::test]
    async fn test_commands_processed_in_order() {
        let mock = Arc::new(MockLlmClient::with_script([
            Ok("joy".to_string()),
            Ok("first reply".to_string()),
            Ok("sadness".to_string()),
            Ok("second reply".to_string()),
        ]));
        let handle = spawn_session(SessionController::from_config(&config_without_facts(), mock));

        handle.commands.send(Command::submit("one")).unwrap();
        let second = handle.submit("two").await.unwrap();
        match second {
            TurnOutcome::Replied { reply, .. } => assert_eq!(reply, "second reply"),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let snap = handle.state.borrow().clone();
        assert_eq!(snap.turns.len(), 4);
        assert_eq!(snap.turns[1].content, "first reply");
        assert_eq!(snap.score, 51);
    }

    #[tokio::test]
    async fn test_reset_and_shutdown() {
        let mock = Arc::new(MockLlmClient::with_script([
            Ok("love".to_string()),
            Ok("aww".to_string()),
        ]));
        let mut handle =
            spawn_session(SessionController::from_config(&config_without_facts(), mock));
        handle.submit("my dog").await.unwrap();
        assert_eq!(handle.state.borrow_and_update().score, 53);

        handle.commands.send(Command::Reset).unwrap();
        handle.state.changed().await.unwrap();
        assert_eq!(handle.state.borrow().score, 50);

        handle.commands.send(Command::Shutdown).unwrap();
        let SessionHandle { commands, task, .. } = handle;
        task.await.unwrap();
        assert!(commands.send(Command::submit("after shutdown")).is_err());
    }
}
