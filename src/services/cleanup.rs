//! 清理服务
//!
//! 尽力删除工作区内的临时文件，任何失败都只写调试日志

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::config::{require_env, WORKSPACE_ENV};
use crate::error::ConfigError;

/// 清理服务
pub struct Cleanup {
    base_dir: PathBuf,
}

impl Cleanup {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 以 `GITHUB_WORKSPACE` 为基准目录
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(require_env(WORKSPACE_ENV)?))
    }

    /// 删除基准目录下的文件或目录（存在时）
    ///
    /// 目录递归删除；路径不存在时静默返回；从不返回错误
    pub async fn remove_if_present(&self, relative_path: impl AsRef<Path>) {
        let relative_path = relative_path.as_ref();

        if !is_confined(relative_path) {
            debug!(
                "跳过 {}: 路径必须位于工作区内",
                relative_path.display()
            );
            return;
        }

        let path = self.base_dir.join(relative_path);

        let metadata = match fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} 不存在，跳过", path.display());
                return;
            }
            Err(e) => {
                debug!("跳过删除 {}: {}", path.display(), e);
                return;
            }
        };

        debug!("正在删除 {}...", path.display());
        let result = if metadata.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };

        if let Err(e) = result {
            debug!("跳过删除 {}: {}", path.display(), e);
        }
    }
}

/// 只允许普通的相对路径段，拒绝绝对路径和 `..`
fn is_confined(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}
