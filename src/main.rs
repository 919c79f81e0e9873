use anyhow::Context;
use remote_explorer::{
    build_router,
    config::{LogConfig, DEFAULT_CONFIG_PATH},
    logging, AppConfig, AppState,
};
use tracing::info;

/// 加载日志配置
///
/// 日志系统需要在完整配置加载前初始化，失败时返回默认配置
async fn load_log_config() -> LogConfig {
    if let Ok(content) = tokio::fs::read_to_string(DEFAULT_CONFIG_PATH).await {
        if let Ok(config) = toml::from_str::<toml::Value>(&content) {
            if let Some(log_table) = config.get("log") {
                if let Ok(log_config) = log_table.clone().try_into::<LogConfig>() {
                    return log_config;
                }
            }
        }
    }

    LogConfig::default()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 必须保持 _log_guard 存活
    let log_config = load_log_config().await;
    let _log_guard = logging::init_logging(&log_config);

    info!("Remote Explorer v{} 启动中...", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_or_default(DEFAULT_CONFIG_PATH).await;
    let app_state = AppState::from_config(&config);
    let landing = app_state.translator.landing_url();

    let app = build_router(app_state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法监听地址 {}", addr))?;

    info!("服务器启动在: http://{}", addr);
    info!("浏览入口: http://{}{}", addr, landing);
    info!("健康检查: http://{}/health", addr);

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("服务器错误: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("收到 Ctrl+C，正在退出...");
        }
    }

    info!("应用已安全退出");
    Ok(())
}
