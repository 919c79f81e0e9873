// 配置管理模块

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::explorer::PathStyle;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 目录浏览配置
    #[serde(default)]
    pub browse: BrowseConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 目录浏览配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// 允许浏览的根目录（不设置表示整个文件系统）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// 路径风格
    #[serde(default)]
    pub path_style: PathStyle,
    /// 可识别的盘符（仅盘符风格使用）
    #[serde(default = "default_drive_letters")]
    pub drive_letters: Vec<char>,
    /// 百分号解码失败时是否拒绝请求（默认沿用原始字符串）
    #[serde(default)]
    pub strict_decoding: bool,
}

fn default_drive_letters() -> Vec<char> {
    vec!['c', 'd', 'e', 'f']
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            root: None,
            path_style: PathStyle::default(),
            drive_letters: default_drive_letters(),
            strict_decoding: false,
        }
    }
}

impl BrowseConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.drive_letters.is_empty() {
            anyhow::bail!("drive_letters 不能为空");
        }
        if let Some(bad) = self.drive_letters.iter().find(|c| !c.is_ascii_alphabetic()) {
            anyhow::bail!("无效的盘符: {:?}", bad);
        }
        if let Some(root) = &self.root {
            // 只能对本机路径风格判断绝对路径
            if self.path_style == PathStyle::Auto && !root.is_absolute() {
                anyhow::bail!("根目录必须是绝对路径: {:?}", root);
            }
        }
        Ok(())
    }

    /// 规范化后的根目录
    ///
    /// 规范化失败（如目录不存在）时保留原值
    pub fn resolved_root(&self) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        let resolved = match dunce::canonicalize(root) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::warn!("根目录规范化失败，使用原始路径: {:?}, 错误: {}", root, e);
                root.clone()
            }
        };
        Some(resolved)
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 是否启用日志文件持久化
    #[serde(default = "default_log_enabled")]
    pub enabled: bool,
    /// 日志文件保存目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// 日志保留天数（默认 7 天）
    #[serde(default = "default_log_retention_days")]
    pub retention_days: u32,
    /// 日志级别（默认 info）
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 单个日志文件最大大小（字节，默认 10MB）
    #[serde(default = "default_log_max_file_size")]
    pub max_file_size: u64,
}

fn default_log_enabled() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_max_file_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_log_enabled(),
            log_dir: default_log_dir(),
            retention_days: default_log_retention_days(),
            level: default_log_level(),
            max_file_size: default_log_max_file_size(),
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;

        config
            .browse
            .validate()
            .context("配置文件中的浏览配置验证失败")?;

        Ok(config)
    }

    /// 保存配置到文件
    pub async fn save_to_file(&self, path: &str) -> Result<()> {
        self.browse.validate().context("保存配置失败：浏览配置无效")?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        // 确保父目录存在
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        fs::write(path, content)
            .await
            .context("Failed to write config file")?;

        tracing::info!("配置已保存: {}", path);
        Ok(())
    }

    /// 加载或创建默认配置
    pub async fn load_or_default(path: &str) -> Self {
        match Self::load_from_file(path).await {
            Ok(config) => {
                tracing::info!("配置文件加载成功: {}", path);
                config
            }
            Err(e) => {
                tracing::warn!("配置文件加载失败，使用默认配置: {:#}", e);
                let default_config = Self::default();

                // 仅在文件不存在时写入默认配置，避免覆盖用户写错的配置
                if !std::path::Path::new(path).exists() {
                    if let Err(e) = default_config.save_to_file(path).await {
                        tracing::error!("保存默认配置失败: {}", e);
                    }
                }

                default_config
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.addr(), "0.0.0.0:3000");
        assert!(config.browse.root.is_none());
        assert_eq!(config.browse.path_style, PathStyle::Auto);
        assert_eq!(config.browse.drive_letters, vec!['c', 'd', 'e', 'f']);
        assert!(!config.browse.strict_decoding);
    }

    #[test]
    fn test_default_log_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.level, "info");
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut config = AppConfig::default();
        config.server.port = 8080;
        config.browse.path_style = PathStyle::DriveLetter;
        config.browse.strict_decoding = true;
        config.save_to_file(path).await.unwrap();

        let loaded = AppConfig::load_from_file(path).await.unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.browse.path_style, PathStyle::DriveLetter);
        assert!(loaded.browse.strict_decoding);
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            "[browse]\npath_style = \"posix\"\ndrive_letters = [\"c\", \"z\"]\n",
        )
        .unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(loaded.server.port, 3000);
        assert_eq!(loaded.browse.path_style, PathStyle::Posix);
        assert_eq!(loaded.browse.drive_letters, vec!['c', 'z']);
        assert_eq!(loaded.log.level, "info");
    }

    #[tokio::test]
    async fn test_load_or_default_writes_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("app.toml");
        let path = path.to_str().unwrap();

        let config = AppConfig::load_or_default(path).await;
        assert_eq!(config.server.port, 3000);
        assert!(std::path::Path::new(path).exists());
    }

    #[test]
    fn test_browse_validation() {
        let mut config = BrowseConfig::default();
        assert!(config.validate().is_ok());

        config.drive_letters.clear();
        assert!(config.validate().is_err());

        let config = BrowseConfig {
            drive_letters: vec!['1'],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BrowseConfig {
            root: Some(PathBuf::from("relative/dir")),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolved_root() {
        let dir = TempDir::new().unwrap();
        let config = BrowseConfig {
            root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let expected = dunce::canonicalize(dir.path()).unwrap();
        assert_eq!(config.resolved_root(), Some(expected));
        assert_eq!(BrowseConfig::default().resolved_root(), None);
    }
}
