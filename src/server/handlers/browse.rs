// 目录浏览处理器

use axum::{
    extract::{OriginalUri, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{error, info, warn};

use crate::explorer::{build_page_model, render_page, BrowseError};
use crate::server::state::AppState;

impl IntoResponse for BrowseError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::InvalidPath { path, reason } => warn!("无效路径: {}, 原因: {}", path, reason),
            Self::NotFound { path, source } => warn!("目录不存在或无法读取: {}, 错误: {}", path, source),
            Self::RenderFailure(e) => error!("页面渲染失败: {}", e),
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// GET /
/// 跳转到浏览入口
pub async fn index(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.translator.landing_url())
}

/// GET /browse/<encoded-path>
/// 列出目录内容并渲染为 HTML
pub async fn browse(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, BrowseError> {
    let request_path = uri.path();

    if state.translator.is_landing(request_path) {
        return Ok(Redirect::to(&state.translator.landing_url()).into_response());
    }

    let fs_path = state.translator.request_to_filesystem(request_path)?;

    let entries = state
        .lister
        .list(&fs_path)
        .await
        .map_err(|e| BrowseError::not_found(fs_path.display().to_string(), e))?;

    let page = build_page_model(&state.translator, request_path, &fs_path, &entries);
    let html = render_page(&page)?;

    info!("浏览目录: {} ({} 个条目)", fs_path.display(), entries.len());
    Ok(Html(html).into_response())
}
