// 页面视图模型构建

use std::path::Path;

use super::translator::PathTranslator;
use super::types::{DirectoryEntry, ListItem, PageModel};

/// "返回上级"条目名称
pub const GO_UP_LABEL: &str = ".. Go Up";

/// 根据目录条目构建页面视图模型
///
/// - 存在可导航的父目录时，首项为"返回上级"
/// - 其余条目保持列举顺序，不过滤、不排序、不去重
pub fn build_page_model(
    translator: &PathTranslator,
    request_path: &str,
    fs_path: &Path,
    entries: &[DirectoryEntry],
) -> PageModel {
    let mut items = Vec::with_capacity(entries.len() + 1);

    if let Some(parent) = translator.parent_of(fs_path) {
        items.push(ListItem {
            name: GO_UP_LABEL.to_string(),
            target_url: translator.browse_url(&parent),
            is_dir: true,
        });
    }

    items.extend(entries.iter().map(|entry| ListItem {
        name: entry.display_name(),
        target_url: translator.entry_url(request_path, &entry.name),
        is_dir: entry.is_dir,
    }));

    PageModel { items }
}
