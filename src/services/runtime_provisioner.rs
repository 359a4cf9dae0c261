//! 浏览器运行时准备服务 - 业务能力层
//!
//! 只负责"确保固定版本的浏览器已安装"，本地开发环境下什么也不做

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{Config, CI_MARKER_ENV};
use crate::error::ProvisionError;
use crate::infrastructure::BrowserCache;
use crate::models::{BrowserKind, CacheEntry};

/// 运行环境
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeContext {
    /// CI 环境，需要准备浏览器
    Ci,
    /// 本地开发环境，跳过准备
    Local,
}

impl RuntimeContext {
    /// 根据 CI 标记变量判断当前环境
    pub fn detect() -> Self {
        Self::from_marker(std::env::var_os(CI_MARKER_ENV).is_some())
    }

    pub fn from_marker(marker_present: bool) -> Self {
        if marker_present {
            RuntimeContext::Ci
        } else {
            RuntimeContext::Local
        }
    }
}

/// 需要的浏览器构建
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedBuild {
    pub browser: BrowserKind,
    pub build_id: String,
}

impl PinnedBuild {
    pub fn chrome(build_id: impl Into<String>) -> Self {
        Self {
            browser: BrowserKind::Chrome,
            build_id: build_id.into(),
        }
    }
}

/// 一次准备调用的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// 本地环境，未做任何事
    Skipped,
    /// 缓存中已有同类浏览器
    AlreadyInstalled(CacheEntry),
    /// 本次新安装
    Installed(CacheEntry),
}

impl ProvisionOutcome {
    /// 可用的浏览器可执行文件路径，跳过时为 `None`
    pub fn executable_path(&self) -> Option<PathBuf> {
        match self {
            ProvisionOutcome::Skipped => None,
            ProvisionOutcome::AlreadyInstalled(entry) | ProvisionOutcome::Installed(entry) => {
                Some(entry.executable_path())
            }
        }
    }
}

/// 浏览器运行时准备服务
///
/// 职责：
/// - 本地环境直接返回
/// - CI 环境下查询缓存，缺少同类浏览器时安装固定版本
/// - 不重试，失败直接向上抛出
pub struct RuntimeProvisioner<C> {
    context: RuntimeContext,
    cache: C,
    pinned: PinnedBuild,
}

impl<C: BrowserCache> RuntimeProvisioner<C> {
    pub fn new(context: RuntimeContext, cache: C, pinned: PinnedBuild) -> Self {
        Self {
            context,
            cache,
            pinned,
        }
    }

    /// 按配置创建
    pub fn from_config(config: &Config, cache: C) -> Self {
        Self::new(
            RuntimeContext::from_marker(config.in_ci),
            cache,
            PinnedBuild::chrome(config.chrome_build_id.clone()),
        )
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// 确保浏览器已安装
    ///
    /// 已安装时只做一次缓存查询，不产生网络或写盘操作
    pub async fn ensure_runtime(&self) -> Result<ProvisionOutcome, ProvisionError> {
        if self.context == RuntimeContext::Local {
            info!("本地运行，跳过浏览器准备 ...");
            return Ok(ProvisionOutcome::Skipped);
        }

        let installed = self.cache.installed().await?;
        debug!("缓存中已有 {} 个浏览器构建", installed.len());

        if let Some(entry) = installed
            .into_iter()
            .find(|entry| entry.browser == self.pinned.browser)
        {
            info!("✓ 浏览器已存在: {}", entry);
            return Ok(ProvisionOutcome::AlreadyInstalled(entry));
        }

        info!(
            "正在安装 {} {} ...",
            self.pinned.browser, self.pinned.build_id
        );
        let entry = self
            .cache
            .install(self.pinned.browser, &self.pinned.build_id)
            .await?;
        Ok(ProvisionOutcome::Installed(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 内存中的缓存，记录调用次数
    #[derive(Default)]
    struct FakeCache {
        entries: Mutex<Vec<CacheEntry>>,
        installed_calls: AtomicUsize,
        install_calls: AtomicUsize,
        fail_install: bool,
    }

    impl BrowserCache for FakeCache {
        async fn installed(&self) -> Result<Vec<CacheEntry>, ProvisionError> {
            self.installed_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn install(
            &self,
            browser: BrowserKind,
            build_id: &str,
        ) -> Result<CacheEntry, ProvisionError> {
            self.install_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_install {
                return Err(ProvisionError::write_failed(
                    "/cache",
                    std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                ));
            }
            let entry = CacheEntry::new(Path::new("/cache"), browser, Platform::Linux, build_id);
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }
    }

    fn provisioner(context: RuntimeContext, cache: FakeCache) -> RuntimeProvisioner<FakeCache> {
        RuntimeProvisioner::new(context, cache, PinnedBuild::chrome("131.0.6778.108"))
    }

    #[tokio::test]
    async fn test_local_context_is_noop() {
        let p = provisioner(RuntimeContext::Local, FakeCache::default());

        let outcome = p.ensure_runtime().await.unwrap();

        assert_eq!(outcome, ProvisionOutcome::Skipped);
        assert_eq!(outcome.executable_path(), None);
        assert_eq!(p.cache().installed_calls.load(Ordering::SeqCst), 0);
        assert_eq!(p.cache().install_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_installs_when_missing_then_idempotent() {
        let p = provisioner(RuntimeContext::Ci, FakeCache::default());

        let first = p.ensure_runtime().await.unwrap();
        assert!(matches!(first, ProvisionOutcome::Installed(_)));
        assert_eq!(p.cache().install_calls.load(Ordering::SeqCst), 1);

        let second = p.ensure_runtime().await.unwrap();
        assert!(matches!(second, ProvisionOutcome::AlreadyInstalled(_)));
        assert_eq!(p.cache().install_calls.load(Ordering::SeqCst), 1);
        assert_eq!(p.cache().installed_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_any_installed_chrome_build_satisfies() {
        let cache = FakeCache::default();
        cache.entries.lock().unwrap().push(CacheEntry::new(
            Path::new("/cache"),
            BrowserKind::Chrome,
            Platform::Linux,
            "120.0.1",
        ));
        let p = provisioner(RuntimeContext::Ci, cache);

        let outcome = p.ensure_runtime().await.unwrap();

        match outcome {
            ProvisionOutcome::AlreadyInstalled(entry) => assert_eq!(entry.build_id, "120.0.1"),
            other => panic!("应当复用已安装的构建，实际: {:?}", other),
        }
        assert_eq!(p.cache().install_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_install_failure_propagates_once() {
        let cache = FakeCache {
            fail_install: true,
            ..Default::default()
        };
        let p = provisioner(RuntimeContext::Ci, cache);

        let result = p.ensure_runtime().await;

        assert!(matches!(result, Err(ProvisionError::WriteFailed { .. })));
        assert_eq!(p.cache().install_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_context_from_marker() {
        assert_eq!(RuntimeContext::from_marker(true), RuntimeContext::Ci);
        assert_eq!(RuntimeContext::from_marker(false), RuntimeContext::Local);
    }
}
