// Remote Explorer Library
// 通过 HTTP 浏览本地目录

// 配置管理模块
pub mod config;

// 日志模块
pub mod logging;

// 目录浏览核心模块
pub mod explorer;

// Web服务器模块
pub mod server;

// 导出常用类型
pub use config::AppConfig;
pub use explorer::{BrowseError, PathTranslator};
pub use server::{build_router, AppState};
