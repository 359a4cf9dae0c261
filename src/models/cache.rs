use std::fmt;
use std::path::{Path, PathBuf};

/// 浏览器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserKind {
    Chrome,
}

impl BrowserKind {
    /// 缓存目录下的子目录名
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 浏览器构建所属平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Mac,
    MacArm,
    Win32,
    Win64,
}

impl Platform {
    /// 当前机器对应的平台，不支持时返回 `None`
    pub fn current() -> Option<Self> {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("linux", "x86_64") => Some(Platform::Linux),
            ("macos", "aarch64") => Some(Platform::MacArm),
            ("macos", _) => Some(Platform::Mac),
            ("windows", "x86") => Some(Platform::Win32),
            ("windows", _) => Some(Platform::Win64),
            _ => None,
        }
    }

    /// 缓存目录名中使用的平台前缀
    pub fn cache_name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Mac => "mac",
            Platform::MacArm => "mac_arm",
            Platform::Win32 => "win32",
            Platform::Win64 => "win64",
        }
    }

    /// 下载地址中使用的平台名
    pub fn download_name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux64",
            Platform::Mac => "mac-x64",
            Platform::MacArm => "mac-arm64",
            Platform::Win32 => "win32",
            Platform::Win64 => "win64",
        }
    }

    pub fn from_cache_name(name: &str) -> Option<Self> {
        match name {
            "linux" => Some(Platform::Linux),
            "mac" => Some(Platform::Mac),
            "mac_arm" => Some(Platform::MacArm),
            "win32" => Some(Platform::Win32),
            "win64" => Some(Platform::Win64),
            _ => None,
        }
    }

    /// 解压目录内可执行文件的相对路径
    fn executable_relative_path(&self) -> PathBuf {
        let root = format!("chrome-{}", self.download_name());
        match self {
            Platform::Linux => Path::new(&root).join("chrome"),
            Platform::Mac | Platform::MacArm => Path::new(&root)
                .join("Google Chrome for Testing.app")
                .join("Contents")
                .join("MacOS")
                .join("Google Chrome for Testing"),
            Platform::Win32 | Platform::Win64 => Path::new(&root).join("chrome.exe"),
        }
    }
}

/// 已安装的浏览器构建
///
/// 由安装步骤创建，之后只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub browser: BrowserKind,
    pub platform: Platform,
    pub build_id: String,
    /// `<cache>/<browser>/<platform>-<build_id>`
    pub install_dir: PathBuf,
}

impl CacheEntry {
    pub fn new(
        cache_dir: &Path,
        browser: BrowserKind,
        platform: Platform,
        build_id: impl Into<String>,
    ) -> Self {
        let build_id = build_id.into();
        let install_dir = cache_dir
            .join(browser.as_str())
            .join(Self::folder_name(platform, &build_id));
        Self {
            browser,
            platform,
            build_id,
            install_dir,
        }
    }

    /// 安装目录名，例如 `linux-131.0.6778.108`
    pub fn folder_name(platform: Platform, build_id: &str) -> String {
        format!("{}-{}", platform.cache_name(), build_id)
    }

    /// 解析安装目录名，格式不对时返回 `None`
    pub fn parse_folder_name(name: &str) -> Option<(Platform, String)> {
        let (platform, build_id) = name.split_once('-')?;
        if build_id.is_empty() {
            return None;
        }
        Some((Platform::from_cache_name(platform)?, build_id.to_string()))
    }

    /// 浏览器可执行文件路径
    pub fn executable_path(&self) -> PathBuf {
        self.install_dir
            .join(self.platform.executable_relative_path())
    }
}

impl fmt::Display for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({})",
            self.browser,
            self.build_id,
            self.platform.cache_name()
        )
    }
}
