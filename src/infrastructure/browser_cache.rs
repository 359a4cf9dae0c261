//! 浏览器本地缓存 - 基础设施层
//!
//! 目录布局与 Puppeteer 一致：
//!
//! ```text
//! <cache_dir>/chrome/linux-131.0.6778.108/chrome-linux64/chrome
//! ```
//!
//! 下载和解压都在以 `.` 开头的临时路径中进行，完成后再整体重命名，
//! 因此中途失败不会留下被识别为"已安装"的目录

use std::io::Read;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ProvisionError;
use crate::models::{BrowserKind, CacheEntry, Platform};

/// 浏览器安装缓存
///
/// 只提供"查询已安装构建"和"安装指定构建"两种能力
#[allow(async_fn_in_trait)]
pub trait BrowserCache {
    /// 列出缓存中已安装的构建
    async fn installed(&self) -> Result<Vec<CacheEntry>, ProvisionError>;

    /// 安装指定构建
    async fn install(
        &self,
        browser: BrowserKind,
        build_id: &str,
    ) -> Result<CacheEntry, ProvisionError>;
}

/// 基于本地文件系统的浏览器缓存
pub struct LocalBrowserCache {
    cache_dir: PathBuf,
    platform: Option<Platform>,
    download_base_url: String,
    client: reqwest::Client,
}

impl LocalBrowserCache {
    /// 创建缓存，平台取当前机器
    ///
    /// 平台不受支持时仍可查询缓存，只有安装会失败
    pub fn new(cache_dir: impl Into<PathBuf>, download_base_url: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            platform: Platform::current(),
            download_base_url: download_base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.browser_cache_dir.clone(),
            config.browser_download_base_url.clone(),
        )
    }

    /// 指定平台（主要用于测试）
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    fn platform(&self) -> Result<Platform, ProvisionError> {
        self.platform
            .ok_or_else(|| ProvisionError::UnsupportedPlatform {
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
            })
    }

    /// 指定构建的下载地址
    pub fn download_url(&self, build_id: &str) -> Result<String, ProvisionError> {
        let platform = self.platform()?.download_name();
        Ok(format!(
            "{}/{}/{}/chrome-{}.zip",
            self.download_base_url.trim_end_matches('/'),
            build_id,
            platform,
            platform
        ))
    }

    /// 流式下载到本地文件
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ProvisionError> {
        let mut response = self.client.get(url).send().await.map_err(|source| {
            ProvisionError::DownloadFailed {
                url: url.to_string(),
                source,
            }
        })?;

        if !response.status().is_success() {
            return Err(ProvisionError::BadStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let mut file = fs::File::create(destination)
            .await
            .map_err(|e| ProvisionError::write_failed(destination, e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|source| {
            ProvisionError::DownloadFailed {
                url: url.to_string(),
                source,
            }
        })? {
            file.write_all(&chunk)
                .await
                .map_err(|e| ProvisionError::write_failed(destination, e))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ProvisionError::write_failed(destination, e))?;

        debug!("下载完成: {} 字节 -> {}", written, destination.display());
        Ok(())
    }
}

impl BrowserCache for LocalBrowserCache {
    async fn installed(&self) -> Result<Vec<CacheEntry>, ProvisionError> {
        let mut entries = Vec::new();

        for browser in [BrowserKind::Chrome] {
            let browser_dir = self.cache_dir.join(browser.as_str());
            let exists = fs::try_exists(&browser_dir).await.map_err(|source| {
                ProvisionError::CacheReadFailed {
                    path: browser_dir.clone(),
                    source,
                }
            })?;
            if !exists {
                continue;
            }

            let mut dir = fs::read_dir(&browser_dir)
                .await
                .map_err(|source| ProvisionError::CacheReadFailed {
                    path: browser_dir.clone(),
                    source,
                })?;

            while let Some(item) = dir.next_entry().await.map_err(|source| {
                ProvisionError::CacheReadFailed {
                    path: browser_dir.clone(),
                    source,
                }
            })? {
                let is_dir = item.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir {
                    continue;
                }

                let name = item.file_name().to_string_lossy().into_owned();
                match CacheEntry::parse_folder_name(&name) {
                    Some((platform, build_id)) => {
                        entries.push(CacheEntry::new(&self.cache_dir, browser, platform, build_id));
                    }
                    None => debug!("忽略无法识别的缓存目录: {}", name),
                }
            }
        }

        Ok(entries)
    }

    async fn install(
        &self,
        browser: BrowserKind,
        build_id: &str,
    ) -> Result<CacheEntry, ProvisionError> {
        let platform = self.platform()?;
        let entry = CacheEntry::new(&self.cache_dir, browser, platform, build_id);
        let browser_dir = self.cache_dir.join(browser.as_str());
        let folder = CacheEntry::folder_name(platform, build_id);
        let archive_path = browser_dir.join(format!(".download-{}.zip", folder));
        let staging_dir = browser_dir.join(format!(".staging-{}", folder));

        fs::create_dir_all(&browser_dir)
            .await
            .map_err(|e| ProvisionError::write_failed(&browser_dir, e))?;

        let url = self.download_url(build_id)?;
        info!("⬇️ 正在下载浏览器 {}: {}", entry, url);

        if let Err(e) = self.download(&url, &archive_path).await {
            let _ = fs::remove_file(&archive_path).await;
            return Err(e);
        }

        if path_exists(&staging_dir).await? {
            warn!("清理上次残留的临时目录: {}", staging_dir.display());
            fs::remove_dir_all(&staging_dir)
                .await
                .map_err(|e| ProvisionError::write_failed(&staging_dir, e))?;
        }

        let extract_result = {
            let archive_path = archive_path.clone();
            let staging_dir = staging_dir.clone();
            tokio::task::spawn_blocking(move || extract_archive(&archive_path, &staging_dir)).await?
        };
        let _ = fs::remove_file(&archive_path).await;

        if let Err(e) = extract_result {
            let _ = fs::remove_dir_all(&staging_dir).await;
            return Err(e);
        }

        if path_exists(&entry.install_dir).await? {
            fs::remove_dir_all(&entry.install_dir)
                .await
                .map_err(|e| ProvisionError::write_failed(&entry.install_dir, e))?;
        }
        fs::rename(&staging_dir, &entry.install_dir)
            .await
            .map_err(|e| ProvisionError::write_failed(&entry.install_dir, e))?;

        info!("✓ 浏览器已安装到: {}", entry.install_dir.display());
        Ok(entry)
    }
}

/// 检查安装路径是否存在，无法判断时视为写入失败
async fn path_exists(path: &Path) -> Result<bool, ProvisionError> {
    fs::try_exists(path)
        .await
        .map_err(|e| ProvisionError::write_failed(path, e))
}

/// unix 文件类型掩码与符号链接类型
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// 解压 zip 到目标目录
///
/// 逐个条目解压：保留 unix 权限位，符号链接条目还原为符号链接
/// （macOS 的 .app 包依赖 `Versions/Current` 这类链接）
fn extract_archive(archive_path: &Path, target: &Path) -> Result<(), ProvisionError> {
    let to_error = |source: zip::result::ZipError| ProvisionError::ExtractFailed {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(archive_path).map_err(|e| to_error(e.into()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(to_error)?;
    debug!("解压 {} 个条目到 {}", archive.len(), target.display());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(to_error)?;
        let relative = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| to_error(zip::result::ZipError::InvalidArchive("条目路径越界")))?;
        let out_path = target.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)
                .map_err(|e| ProvisionError::write_failed(&out_path, e))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProvisionError::write_failed(parent, e))?;
        }

        let mode = entry.unix_mode();
        if mode.map_or(false, |m| m & S_IFMT == S_IFLNK) {
            let mut link_target = String::new();
            entry
                .read_to_string(&mut link_target)
                .map_err(|e| to_error(e.into()))?;
            create_symlink(&link_target, &out_path)
                .map_err(|e| ProvisionError::write_failed(&out_path, e))?;
            continue;
        }

        let mut out = std::fs::File::create(&out_path)
            .map_err(|e| ProvisionError::write_failed(&out_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| to_error(e.into()))?;

        #[cfg(unix)]
        if let Some(mode) = mode {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode & 0o7777))
                .map_err(|e| ProvisionError::write_failed(&out_path, e))?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn create_symlink(link_target: &str, path: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(link_target, path)
}

#[cfg(not(unix))]
fn create_symlink(link_target: &str, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, link_target)
}
