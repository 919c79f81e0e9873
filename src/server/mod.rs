// Web服务器模块

pub mod handlers;
pub mod state;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// 构建路由
///
/// `/browse/*path` 不匹配空路径，`/browse` 与 `/browse/` 需单独注册
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/browse", get(handlers::browse))
        .route("/browse/", get(handlers::browse))
        .route("/browse/*path", get(handlers::browse))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
