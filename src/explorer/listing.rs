// 目录列举能力

use std::io;
use std::path::Path;

use async_trait::async_trait;

use super::types::DirectoryEntry;

/// 目录列举能力
///
/// 给定本地路径，返回有序的目录条目；目录不存在、不是目录或无权限时返回 I/O 错误
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    async fn list(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>>;
}

/// 基于本地磁盘的目录列举
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDirectoryLister;

#[async_trait]
impl DirectoryLister for LocalDirectoryLister {
    async fn list(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        let mut read_dir = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            // 不跟随符号链接，指向目录的链接按文件展示
            let is_dir = match entry.file_type().await {
                Ok(file_type) => file_type.is_dir(),
                Err(e) => {
                    tracing::warn!("读取条目类型失败，按文件展示: {:?}, 错误: {}", entry.path(), e);
                    false
                }
            };
            entries.push(DirectoryEntry {
                name: entry.file_name(),
                is_dir,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
