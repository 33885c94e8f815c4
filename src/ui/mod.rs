//! 展示层：控制台纯文本渲染

pub mod console;

pub use console::{
    emotion_caption, phase_indicator, render_dashboard, render_gauge, render_last_exchange,
};
