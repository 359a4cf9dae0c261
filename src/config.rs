use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// 工作区根目录环境变量
pub const WORKSPACE_ENV: &str = "GITHUB_WORKSPACE";
/// CI 环境标记变量，只要存在即认为运行在 CI 中
pub const CI_MARKER_ENV: &str = "RUNNER_TEMP";

/// 读取必需的环境变量，不存在时直接返回错误
pub fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::EnvVarNotFound {
        var_name: name.to_string(),
    })
}

/// 读取可选的环境变量并解析为指定类型
///
/// 变量不存在时返回 `None`，存在但无法解析时返回错误
pub fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// 发布流水线配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 工作区根目录（打包来源，也是清理的基准目录）
    pub workspace_root: PathBuf,
    /// 资源名称，同时作为压缩包内的根目录名
    pub asset_name: String,
    /// 目录服务的 Cookie 请求头
    pub cookies: String,
    /// 是否运行在 CI 中（由 RUNNER_TEMP 决定）
    pub in_ci: bool,
    /// 浏览器缓存目录
    pub browser_cache_dir: PathBuf,
    /// 固定的浏览器版本
    pub chrome_build_id: String,
    /// 目录服务 API 地址
    pub catalog_api_base_url: String,
    /// 浏览器下载地址
    pub browser_download_base_url: String,
    /// 压缩包输出目录
    pub archive_output_dir: PathBuf,
    /// 打包完成后需要清理的路径（相对工作区）
    pub cleanup_paths: Vec<String>,
    /// 是否启动一次无头浏览器做冒烟检查
    pub verify_browser_runtime: bool,
    /// CI 步骤输出文件
    pub github_output: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::new(),
            asset_name: String::new(),
            cookies: String::new(),
            in_ci: false,
            browser_cache_dir: default_browser_cache_dir(),
            chrome_build_id: "131.0.6778.108".to_string(),
            catalog_api_base_url: "https://portal-api.cfx.re".to_string(),
            browser_download_base_url: "https://storage.googleapis.com/chrome-for-testing-public"
                .to_string(),
            archive_output_dir: PathBuf::from("."),
            cleanup_paths: Vec::new(),
            verify_browser_runtime: false,
            github_output: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 必需变量缺失时在任何 I/O 之前失败
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let workspace_root = PathBuf::from(require_env(WORKSPACE_ENV)?);
        let asset_name = require_env("ASSET_NAME")?;
        if asset_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "ASSET_NAME".to_string(),
                reason: "不能为空".to_string(),
            });
        }
        let cookies = require_env("CATALOG_COOKIES")?;

        let archive_output_dir = match std::env::var("ARCHIVE_OUTPUT_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir().unwrap_or(default.archive_output_dir),
        };

        let verbose_logging = parse_env("VERBOSE_LOGGING")?.unwrap_or(false)
            || std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");

        Ok(Self {
            workspace_root,
            asset_name,
            cookies,
            in_ci: std::env::var_os(CI_MARKER_ENV).is_some(),
            browser_cache_dir: std::env::var("PUPPETEER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.browser_cache_dir),
            chrome_build_id: std::env::var("CHROME_BUILD_ID").unwrap_or(default.chrome_build_id),
            catalog_api_base_url: std::env::var("CATALOG_API_BASE_URL")
                .unwrap_or(default.catalog_api_base_url),
            browser_download_base_url: std::env::var("BROWSER_DOWNLOAD_BASE_URL")
                .unwrap_or(default.browser_download_base_url),
            archive_output_dir,
            cleanup_paths: std::env::var("CLEANUP_PATHS")
                .map(|v| parse_path_list(&v))
                .unwrap_or_default(),
            verify_browser_runtime: parse_env("VERIFY_BROWSER_RUNTIME")?
                .unwrap_or(default.verify_browser_runtime),
            github_output: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
            verbose_logging,
        })
    }
}

/// `$HOME/.cache/puppeteer`，取不到 HOME 时退回当前目录下的 `.cache/puppeteer`
fn default_browser_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".cache")
        .join("puppeteer")
}

/// 解析逗号分隔的路径列表
fn parse_path_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
