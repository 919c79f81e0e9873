// 路径转换器
//
// 负责请求路径与本地文件系统路径之间的双向映射

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::BrowseConfig;

use super::convention::{os_bytes, os_from_bytes, PathConvention};
use super::types::BrowseError;

/// 浏览路由前缀
pub const ROUTE_PREFIX: &str = "/browse";

/// 路径转换器
#[derive(Debug, Clone)]
pub struct PathTranslator {
    convention: Arc<dyn PathConvention>,
    /// 允许浏览的根目录（None 表示不限制）
    root: Option<PathBuf>,
    /// 解码失败时是否直接拒绝请求
    strict_decoding: bool,
}

impl PathTranslator {
    pub fn new(convention: Arc<dyn PathConvention>) -> Self {
        Self {
            convention,
            root: None,
            strict_decoding: false,
        }
    }

    /// 根据浏览配置创建（启动时调用一次）
    pub fn from_config(config: &BrowseConfig) -> Self {
        let convention = config.path_style.build(&config.drive_letters);
        let mut translator = Self::new(convention).with_strict_decoding(config.strict_decoding);
        if let Some(root) = config.resolved_root() {
            translator = translator.with_root(root);
        }
        translator
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = strict;
        self
    }

    pub fn convention(&self) -> &dyn PathConvention {
        self.convention.as_ref()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// 去掉路由前缀后的剩余部分（不含开头的 /）
    ///
    /// 前缀缺失，或前缀后紧跟的不是 `/`（如 `/browsex`），返回 None
    fn route_remainder<'a>(&self, request_path: &'a str) -> Option<&'a str> {
        let rest = request_path.strip_prefix(ROUTE_PREFIX)?;
        if rest.is_empty() {
            return Some(rest);
        }
        rest.strip_prefix('/')
    }

    /// 请求未指定路径（`/browse` 或 `/browse/`），应跳转到入口页
    pub fn is_landing(&self, request_path: &str) -> bool {
        matches!(self.route_remainder(request_path), Some(""))
    }

    /// 入口页 URL：配置的根目录，未配置时为文件系统根
    pub fn landing_url(&self) -> String {
        match &self.root {
            Some(root) => self.browse_url(root),
            None => self.browse_url(Path::new(self.convention.default_root())),
        }
    }

    fn within_root(&self, native: &[u8]) -> bool {
        match &self.root {
            Some(root) => self
                .convention
                .is_within(native, &os_bytes(root.as_os_str())),
            None => true,
        }
    }

    /// 请求路径 -> 本地路径
    ///
    /// 只做路径转换，不访问文件系统；目录是否存在由后续列举操作决定
    pub fn request_to_filesystem(&self, request_path: &str) -> Result<PathBuf, BrowseError> {
        let remainder = self
            .route_remainder(request_path)
            .ok_or_else(|| BrowseError::invalid_path(request_path, "missing route prefix"))?;

        let decoded = match query_unescape_bytes(remainder) {
            Ok(decoded) => decoded,
            Err(reason) if self.strict_decoding => {
                return Err(BrowseError::invalid_path(request_path, reason));
            }
            Err(reason) => {
                // 解码失败时沿用原始字符串
                tracing::warn!("请求路径解码失败，使用原始路径: {}, 原因: {}", remainder, reason);
                remainder.as_bytes().to_vec()
            }
        };

        // 合并连续的 /（如 `/browse/%2F/home` 中根目录与条目名之间）
        let collapsed = collapse_slashes(&decoded);
        let trimmed = match collapsed.strip_suffix(b"/") {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => collapsed.as_slice(),
        };

        let native = self.convention.to_native(trimmed);
        let shown = String::from_utf8_lossy(&native).into_owned();

        if self.convention.has_traversal(&native) {
            return Err(BrowseError::invalid_path(shown, "path traversal detected"));
        }

        if !self.within_root(&native) {
            return Err(BrowseError::invalid_path(shown, "outside served root"));
        }

        let path = os_from_bytes(native)
            .map(PathBuf::from)
            .ok_or_else(|| BrowseError::invalid_path(shown, "path is not valid UTF-8"))?;

        tracing::debug!("请求路径 {} -> 本地路径 {}", request_path, path.display());
        Ok(path)
    }

    /// 本地路径 -> 已编码的 URL 片段
    pub fn filesystem_to_url(&self, fs_path: &Path) -> String {
        let url_path = self.convention.to_url_path(&os_bytes(fs_path.as_os_str()));
        query_escape_bytes(&url_path)
    }

    /// 浏览指定本地路径的完整 URL
    pub fn browse_url(&self, fs_path: &Path) -> String {
        format!("{}/{}", ROUTE_PREFIX, self.filesystem_to_url(fs_path))
    }

    /// 目录条目链接：基于原始请求路径拼接，而非由本地路径反推
    pub fn entry_url(&self, request_path: &str, name: &OsStr) -> String {
        let base = request_path.strip_suffix('/').unwrap_or(request_path);
        format!("{}/{}", base, query_escape_bytes(&os_bytes(name)))
    }

    /// 可导航的父目录
    ///
    /// 位于文件系统根或配置的根目录时返回 None
    pub fn parent_of(&self, fs_path: &Path) -> Option<PathBuf> {
        let native = os_bytes(fs_path.as_os_str());
        let parent = self.convention.parent(&native)?;
        if parent.as_slice() == &*native || !self.within_root(&parent) {
            return None;
        }
        os_from_bytes(parent).map(PathBuf::from)
    }
}

/// 查询串编码：仅保留非保留字符，空格编码为 `+`
pub fn query_escape(s: &str) -> String {
    query_escape_bytes(s.as_bytes())
}

/// 按字节进行查询串编码，非 UTF-8 字节同样编码为 `%XX`
pub fn query_escape_bytes(bytes: &[u8]) -> String {
    urlencoding::encode_binary(bytes).replace("%20", "+")
}

/// 查询串解码：`+` 视为空格
///
/// 非法的百分号序列或解码结果不是合法 UTF-8 时返回错误
pub fn query_unescape(s: &str) -> Result<String, &'static str> {
    String::from_utf8(query_unescape_bytes(s)?).map_err(|_| "decoded path is not valid UTF-8")
}

/// 按字节进行查询串解码，仅在百分号序列非法时返回错误
pub fn query_unescape_bytes(s: &str) -> Result<Vec<u8>, &'static str> {
    if has_malformed_escape(s) {
        return Err("malformed percent-encoding");
    }
    Ok(urlencoding::decode_binary(s.replace('+', " ").as_bytes()).into_owned())
}

fn collapse_slashes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if b == b'/' && out.last() == Some(&b'/') {
            continue;
        }
        out.push(b);
    }
    out
}

fn has_malformed_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return true;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    false
}
