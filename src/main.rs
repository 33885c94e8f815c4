//! EmoGenie 入口
//!
//! 初始化日志与配置、解析 API Key（失败即退出）、启动会话任务，然后逐行读取 stdin 并渲染结果。

use std::path::PathBuf;

use anyhow::Context;
use emogenie::config::{load_config, AppConfig};
use emogenie::core::{spawn_session, Command, SessionController, TurnOutcome};
use emogenie::llm::{create_llm_from_config, LlmClient};
use emogenie::secrets::CredentialSource;
use emogenie::ui;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    emogenie::observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    // 凭证失败是致命错误：打印原因并以非零码退出
    let api_key = match CredentialSource::from_config(&cfg.secrets).resolve_api_key().await {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{}: {}", cfg.app.name, e);
            std::process::exit(1);
        }
    };

    let llm = create_llm_from_config(&cfg, &api_key);
    let handle = spawn_session(SessionController::from_config(&cfg, llm.clone()));

    println!("{} - type a message, 'reset' to start over, 'quit' to export and end.", cfg.app.name);
    print!("{}", ui::render_dashboard(&handle.state.borrow()));

    // 处理中提示
    let mut watcher = handle.state.clone();
    tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let phase = watcher.borrow_and_update().phase;
            if let Some(text) = ui::phase_indicator(phase) {
                println!("{}", text);
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        if line.trim().eq_ignore_ascii_case("reset") {
            handle.commands.send(Command::Reset).ok();
            println!("Session reset.");
            continue;
        }

        match handle.submit(line).await {
            Some(TurnOutcome::Replied { .. }) => {
                let snapshot = handle.state.borrow().clone();
                print!("{}", ui::render_last_exchange(&snapshot));
                print!("{}", ui::render_dashboard(&snapshot));
            }
            Some(TurnOutcome::Ended { .. }) => {
                if let Some(notice) = &handle.state.borrow().notice {
                    println!("{}", notice);
                }
                break;
            }
            Some(TurnOutcome::Ignored) => {}
            None => break,
        }
    }

    handle.commands.send(Command::Shutdown).ok();
    handle.task.await.context("Session task failed")?;

    let (prompt, completion, total) = llm.token_usage();
    tracing::info!(prompt, completion, total, model = %llm.model(), "token usage");
    Ok(())
}
