// 目录浏览模块数据类型定义

use std::ffi::OsString;
use std::fmt;
use std::io;

use axum::http::StatusCode;

/// 浏览请求错误
///
/// 每种错误在请求边界被记录日志并以纯文本写回客户端，不会导致进程退出
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    /// 请求路径无法转换为合法的文件系统路径
    #[error("Invalid Path : {path}")]
    InvalidPath { path: String, reason: &'static str },

    /// 目录不存在、不是目录或没有权限（统一归为未找到）
    #[error("Not Found : {path}")]
    NotFound {
        path: String,
        #[source]
        source: io::Error,
    },

    /// 页面渲染失败
    #[error("Internal Error")]
    RenderFailure(#[from] fmt::Error),
}

impl BrowseError {
    pub fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    pub fn not_found(path: impl Into<String>, source: io::Error) -> Self {
        Self::NotFound {
            path: path.into(),
            source,
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::RenderFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 目录条目（由目录列举能力产生，核心逻辑只读）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// 条目名称（不含路径分隔符），保留原始字节
    pub name: OsString,
    /// 是否为目录
    pub is_dir: bool,
}

impl DirectoryEntry {
    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// 用于页面展示的名称，非 UTF-8 部分以替换字符显示
    pub fn display_name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }
}

/// 页面中的单个条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub name: String,
    pub target_url: String,
    pub is_dir: bool,
}

/// 页面视图模型
///
/// 若存在"返回上级"条目则必定位于首位，其余条目保持列举顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageModel {
    pub items: Vec<ListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let invalid = BrowseError::invalid_path("/browse/x", "traversal");
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let missing = BrowseError::not_found("/nope", io::ErrorKind::NotFound.into());
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let render = BrowseError::RenderFailure(fmt::Error);
        assert_eq!(render.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_messages() {
        let missing = BrowseError::not_found("/the/requested/path", io::ErrorKind::NotFound.into());
        assert_eq!(missing.to_string(), "Not Found : /the/requested/path");
        assert_eq!(
            BrowseError::RenderFailure(fmt::Error).to_string(),
            "Internal Error"
        );
    }
}
