// 路径风格抽象
//
// 将平台相关的路径语法（盘符、分隔符）集中在此处，启动时选定一次，
// 其余逻辑只依赖 PathConvention trait。
// 路径按原始字节处理，非 UTF-8 的文件名也能往返

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// 路径风格配置项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// 根据编译目标自动选择
    #[default]
    Auto,
    /// 以 / 为根的路径
    Posix,
    /// 盘符 + 冒号 + 反斜杠
    DriveLetter,
}

impl PathStyle {
    /// 构造对应的路径风格实现
    pub fn build(self, drive_letters: &[char]) -> Arc<dyn PathConvention> {
        match self {
            Self::Posix => Arc::new(PosixConvention),
            Self::DriveLetter => Arc::new(DriveLetterConvention::new(drive_letters.to_vec())),
            Self::Auto if cfg!(target_os = "windows") => {
                Arc::new(DriveLetterConvention::new(drive_letters.to_vec()))
            }
            Self::Auto => Arc::new(PosixConvention),
        }
    }
}

/// 本地路径或文件名的原始字节
#[cfg(unix)]
pub fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(s.as_bytes())
}

/// 本地路径或文件名的原始字节
///
/// 非 unix 平台上无法表示为 UTF-8 的部分按有损方式转换
#[cfg(not(unix))]
pub fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    match s.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

/// 原始字节 -> 本地路径
#[cfg(unix)]
pub fn os_from_bytes(bytes: Vec<u8>) -> Option<OsString> {
    use std::os::unix::ffi::OsStringExt;
    Some(OsString::from_vec(bytes))
}

/// 原始字节 -> 本地路径
///
/// 非 unix 平台上只接受合法的 UTF-8
#[cfg(not(unix))]
pub fn os_from_bytes(bytes: Vec<u8>) -> Option<OsString> {
    String::from_utf8(bytes).ok().map(OsString::from)
}

/// 路径风格
///
/// URL 路径一律使用 `/` 分隔，且已完成百分号解码
pub trait PathConvention: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// 本地路径分隔符
    fn separator(&self) -> u8;

    /// 文件系统根目录
    fn default_root(&self) -> &'static str;

    /// URL 路径 -> 本地路径
    fn to_native(&self, url_path: &[u8]) -> Vec<u8>;

    /// 本地路径 -> URL 路径（未编码）
    fn to_url_path(&self, native: &[u8]) -> Vec<u8>;

    /// 父目录，位于根目录时返回 None
    fn parent(&self, native: &[u8]) -> Option<Vec<u8>>;

    fn case_insensitive(&self) -> bool {
        false
    }

    /// 是否包含 `..` 段
    fn has_traversal(&self, native: &[u8]) -> bool {
        let sep = self.separator();
        native
            .split(|&b| b == b'/' || b == sep)
            .any(|segment| segment == b"..")
    }

    /// path 是否等于 root 或位于 root 之下
    fn is_within(&self, path: &[u8], root: &[u8]) -> bool {
        let (path, root) = if self.case_insensitive() {
            (
                String::from_utf8_lossy(path).to_lowercase().into_bytes(),
                String::from_utf8_lossy(root).to_lowercase().into_bytes(),
            )
        } else {
            (path.to_vec(), root.to_vec())
        };

        let sep = self.separator();
        let mut root = root.as_slice();
        if root.len() > 1 && !root.ends_with(b":\\") {
            while root.len() > 1 && root.ends_with(&[sep]) {
                root = &root[..root.len() - 1];
            }
        }

        if path == root {
            return true;
        }
        match path.strip_prefix(root) {
            Some(rest) => root.ends_with(&[sep]) || rest.starts_with(&[sep]),
            None => false,
        }
    }
}

/// 去掉末尾连续的 sep
fn trim_trailing(path: &[u8], sep: u8) -> &[u8] {
    let end = path.iter().rposition(|&b| b != sep).map_or(0, |i| i + 1);
    &path[..end]
}

/// 以 / 为根的路径风格
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixConvention;

impl PathConvention for PosixConvention {
    fn name(&self) -> &'static str {
        "posix"
    }

    fn separator(&self) -> u8 {
        b'/'
    }

    fn default_root(&self) -> &'static str {
        "/"
    }

    fn to_native(&self, url_path: &[u8]) -> Vec<u8> {
        if url_path.starts_with(b"/") {
            url_path.to_vec()
        } else {
            [b"/".as_slice(), url_path].concat()
        }
    }

    fn to_url_path(&self, native: &[u8]) -> Vec<u8> {
        native.to_vec()
    }

    fn parent(&self, native: &[u8]) -> Option<Vec<u8>> {
        let trimmed = trim_trailing(native, b'/');
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.iter().rposition(|&b| b == b'/') {
            Some(0) => Some(b"/".to_vec()),
            Some(idx) => Some(trimmed[..idx].to_vec()),
            None => None,
        }
    }
}

/// 盘符路径风格（如 `C:\Users`）
#[derive(Debug, Clone)]
pub struct DriveLetterConvention {
    drives: Vec<char>,
}

impl DriveLetterConvention {
    pub fn new(drives: Vec<char>) -> Self {
        Self {
            drives: drives.iter().map(|d| d.to_ascii_lowercase()).collect(),
        }
    }

    fn is_known_drive(&self, letter: u8) -> bool {
        letter.is_ascii_alphabetic() && self.drives.contains(&(letter.to_ascii_lowercase() as char))
    }

    /// 若 path 以已知盘符开头（`/c`、`c`，后接 `/` 或结尾），返回盘符与剩余部分
    fn split_drive<'a>(&self, path: &'a [u8]) -> Option<(u8, &'a [u8])> {
        let body = path.strip_prefix(b"/").unwrap_or(path);
        let (&letter, rest) = body.split_first()?;
        if !self.is_known_drive(letter) {
            return None;
        }
        if rest.is_empty() || rest.starts_with(b"/") {
            Some((letter, rest))
        } else {
            None
        }
    }

    fn is_drive_root(native: &[u8]) -> bool {
        matches!(native.len(), 2 | 3)
            && native[0].is_ascii_alphabetic()
            && native[1] == b':'
            && (native.len() == 2 || native[2] == b'\\')
    }
}

impl Default for DriveLetterConvention {
    fn default() -> Self {
        Self::new(vec!['c', 'd', 'e', 'f'])
    }
}

impl PathConvention for DriveLetterConvention {
    fn name(&self) -> &'static str {
        "drive_letter"
    }

    fn separator(&self) -> u8 {
        b'\\'
    }

    fn default_root(&self) -> &'static str {
        "C:\\"
    }

    fn to_native(&self, url_path: &[u8]) -> Vec<u8> {
        let path = match self.split_drive(url_path) {
            Some((letter, rest)) => [&[letter, b':'][..], rest].concat(),
            None => url_path.to_vec(),
        };
        let mut native: Vec<u8> = path
            .into_iter()
            .map(|b| if b == b'/' { b'\\' } else { b })
            .collect();

        // 裸盘符需补上根分隔符
        if native.len() == 2 && Self::is_drive_root(&native) {
            native.push(b'\\');
        }
        native
    }

    fn to_url_path(&self, native: &[u8]) -> Vec<u8> {
        let without_colon = if native.len() >= 2 && native[0].is_ascii_alphabetic() && native[1] == b':'
        {
            [&native[..1], &native[2..]].concat()
        } else {
            native.to_vec()
        };
        without_colon
            .into_iter()
            .map(|b| if b == b'\\' { b'/' } else { b })
            .collect()
    }

    fn parent(&self, native: &[u8]) -> Option<Vec<u8>> {
        if Self::is_drive_root(native) {
            return None;
        }
        let trimmed = trim_trailing(native, b'\\');
        if trimmed.is_empty() || Self::is_drive_root(trimmed) {
            return None;
        }
        match trimmed.iter().rposition(|&b| b == b'\\') {
            Some(0) => Some(b"\\".to_vec()),
            Some(idx) if Self::is_drive_root(&trimmed[..=idx]) => Some(trimmed[..=idx].to_vec()),
            Some(idx) => Some(trimmed[..idx].to_vec()),
            None => None,
        }
    }

    fn case_insensitive(&self) -> bool {
        true
    }
}
