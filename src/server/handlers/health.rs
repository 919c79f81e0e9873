// 健康检查处理器

use axum::Json;
use serde::Serialize;

/// 健康检查响应结构
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
    })
}
