// API处理器模块

pub mod browse;
pub mod health;

pub use browse::{browse, index};
pub use health::health_check;
