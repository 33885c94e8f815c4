//! 核心层：错误类型、会话状态、状态投影、单轮控制器、后台运行时

pub mod controller;
pub mod error;
pub mod runtime;
pub mod session;
pub mod state;

pub use controller::{
    is_quit_command, ControllerSettings, SessionController, TurnOutcome, QUIT_COMMAND,
};
pub use error::AppError;
pub use runtime::{spawn_session, Command, SessionHandle};
pub use session::Session;
pub use state::{SessionSnapshot, TurnPhase};
