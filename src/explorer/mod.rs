// 远程目录浏览模块
//
// 将请求路径映射为本地目录，列举内容并渲染为可导航的 HTML 页面

mod convention;
mod listing;
mod page;
mod render;
mod translator;
mod types;

pub use convention::{DriveLetterConvention, PathConvention, PathStyle, PosixConvention};
pub use listing::{DirectoryLister, LocalDirectoryLister};
pub use page::{build_page_model, GO_UP_LABEL};
pub use render::{render_html, render_page};
pub use translator::{
    query_escape, query_escape_bytes, query_unescape, query_unescape_bytes, PathTranslator,
    ROUTE_PREFIX,
};
pub use types::*;
