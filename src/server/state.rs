// 应用状态

use crate::config::AppConfig;
use crate::explorer::{DirectoryLister, LocalDirectoryLister, PathTranslator};
use std::sync::Arc;

/// 应用全局状态
///
/// 启动后只读，各请求之间不共享可变状态
#[derive(Clone)]
pub struct AppState {
    /// 路径转换器
    pub translator: Arc<PathTranslator>,
    /// 目录列举能力
    pub lister: Arc<dyn DirectoryLister>,
}

impl AppState {
    /// 使用指定依赖创建应用状态
    pub fn new(translator: PathTranslator, lister: Arc<dyn DirectoryLister>) -> Self {
        Self {
            translator: Arc::new(translator),
            lister,
        }
    }

    /// 根据配置创建应用状态（使用本地磁盘）
    pub fn from_config(config: &AppConfig) -> Self {
        let translator = PathTranslator::from_config(&config.browse);
        tracing::info!(
            "目录浏览初始化: 路径风格={}, 根目录={}, 严格解码={}",
            translator.convention().name(),
            translator
                .root()
                .map(|root| root.display().to_string())
                .unwrap_or_else(|| "<不限制>".to_string()),
            config.browse.strict_decoding
        );
        Self::new(translator, Arc::new(LocalDirectoryLister))
    }
}
